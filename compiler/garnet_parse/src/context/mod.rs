//! Parse context flags for context-sensitive checks.
//!
//! Several statements are only valid in some places: `next` needs a loop
//! or block, `retry` a rescue clause, `yield` a method body. A few parse
//! decisions also depend on position: inside `while cond` and inside the
//! unparenthesized arguments of a command, `do` belongs to the outer
//! construct instead of opening a block. The parser threads a
//! [`ParseContext`] through nested bodies and saves/restores it around
//! each one.

/// Context flags for parsing.
///
/// Multiple flags can be combined using bitwise OR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseContext(u16);

impl ParseContext {
    /// No special context (top level of a file).
    pub const NONE: Self = Self(0);

    /// Inside a method body, including blocks nested in it.
    /// Makes `yield` valid and constant assignment dynamic.
    pub const IN_DEF: Self = Self(1 << 0);

    /// Directly inside a class, module or singleton class body.
    pub const IN_CLASS: Self = Self(1 << 1);

    /// Inside a `while`/`until`/`for` body.
    pub const IN_LOOP: Self = Self(1 << 2);

    /// Inside a block or lambda body.
    pub const IN_BLOCK: Self = Self(1 << 3);

    /// Inside a `rescue` clause body. Makes `retry` valid.
    pub const IN_RESCUE: Self = Self(1 << 4);

    /// `do` must not open a block here; it belongs to an enclosing
    /// `while`/`until`/`for` header or command call.
    pub const NO_DO_BLOCK: Self = Self(1 << 5);

    /// Inside the condition of `if`/`while` and friends.
    pub const IN_COND: Self = Self(1 << 6);

    /// Flags cleared when entering a method body.
    pub const DEF_RESET: Self = Self(
        Self::IN_CLASS.0
            | Self::IN_LOOP.0
            | Self::IN_BLOCK.0
            | Self::IN_RESCUE.0
            | Self::NO_DO_BLOCK.0
            | Self::IN_COND.0,
    );

    /// Create a new context with no flags set.
    #[inline]
    pub const fn new() -> Self {
        Self::NONE
    }

    /// Check if a flag is set.
    #[inline]
    pub const fn has(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    /// Add a flag to the context.
    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    /// Remove a flag from the context.
    #[inline]
    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }

    /// Combine two contexts (union of flags).
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn in_def(self) -> bool {
        self.has(Self::IN_DEF)
    }

    #[inline]
    pub const fn in_class_body(self) -> bool {
        self.has(Self::IN_CLASS)
    }

    /// `break`, `next` and `redo` have something to jump out of.
    #[inline]
    pub const fn allows_loop_jump(self) -> bool {
        self.has(Self::IN_LOOP.union(Self::IN_BLOCK))
    }

    #[inline]
    pub const fn allows_retry(self) -> bool {
        self.has(Self::IN_RESCUE)
    }

    #[inline]
    pub const fn allows_yield(self) -> bool {
        self.has(Self::IN_DEF)
    }

    /// `return` directly in a class body, outside any method or block.
    #[inline]
    pub const fn return_in_class_body(self) -> bool {
        self.has(Self::IN_CLASS) && !self.has(Self::IN_DEF.union(Self::IN_BLOCK))
    }

    #[inline]
    pub const fn allows_do_block(self) -> bool {
        !self.has(Self::NO_DO_BLOCK)
    }
}

#[cfg(test)]
mod tests;
