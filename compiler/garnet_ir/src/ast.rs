//! Syntax tree produced by the parser.
//!
//! The tree is owned top-down: every child is held by exactly one parent and
//! there are no back references. `NodeKind` is closed so every checker that
//! inspects node shapes is forced to consider all of them.

use bitflags::bitflags;

use crate::token::{AssignOp, NumberLit};
use crate::{Name, Span};

/// A syntax tree node.
#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub flags: NodeFlags,
}

impl Node {
    #[inline]
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node {
            kind,
            span,
            flags: NodeFlags::empty(),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Boxed copy, for building parent nodes.
    #[inline]
    pub fn boxed(self) -> Box<Node> {
        Box::new(self)
    }

    /// Strip `( )` wrappers and single-statement sequences.
    pub fn unwrap_parens(&self) -> &Node {
        let mut node = self;
        loop {
            match &node.kind {
                NodeKind::Parens(Some(inner)) => node = inner,
                NodeKind::Seq(stmts) if stmts.len() == 1 => node = &stmts[0],
                _ => return node,
            }
        }
    }

    /// Last statement of a sequence, looking through parentheses.
    pub fn last_statement(&self) -> &Node {
        let mut node = self;
        loop {
            match &node.kind {
                NodeKind::Parens(Some(inner)) => node = inner,
                NodeKind::Seq(stmts) => match stmts.last() {
                    Some(last) => node = last,
                    None => return node,
                },
                _ => return node,
            }
        }
    }

    /// Method call payload, if this is a call.
    pub fn as_call(&self) -> Option<&Call> {
        match &self.kind {
            NodeKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Short description used in "possibly useless use of X" warnings.
    pub fn useless_description(&self) -> Option<&'static str> {
        Some(match &self.kind {
            NodeKind::Number(_)
            | NodeKind::Str(_)
            | NodeKind::DStr(_)
            | NodeKind::Sym(_)
            | NodeKind::DSym(_)
            | NodeKind::Regexp { .. } => "a literal",
            NodeKind::LocalVar(_) => "a variable",
            NodeKind::IVar(_) | NodeKind::CVar(_) | NodeKind::GVar(_) => "a variable",
            NodeKind::BackRef(_) | NodeKind::NthRef(_) => "a variable",
            NodeKind::Const(_) | NodeKind::Colon2 { .. } | NodeKind::Colon3(_) => "a constant",
            NodeKind::SelfRef => "self",
            NodeKind::Nil => "nil",
            NodeKind::True => "true",
            NodeKind::False => "false",
            NodeKind::Range { exclusive, .. } => {
                if *exclusive {
                    "..."
                } else {
                    ".."
                }
            }
            NodeKind::Defined(_) => "defined?",
            NodeKind::Call(call) if call.form == CallForm::Operator => {
                return useless_operator(call.method.as_str());
            }
            _ => return None,
        })
    }
}

fn useless_operator(op: &str) -> Option<&'static str> {
    Some(match op {
        "+" => "+",
        "-" => "-",
        "*" => "*",
        "/" => "/",
        "%" => "%",
        "**" => "**",
        "+@" => "+@",
        "-@" => "-@",
        "|" => "|",
        "^" => "^",
        "&" => "&",
        "<=>" => "<=>",
        ">" => ">",
        ">=" => ">=",
        "<" => "<",
        "<=" => "<=",
        "==" => "==",
        "!=" => "!=",
        _ => return None,
    })
}

bitflags! {
    /// Annotations attached to a node after construction.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct NodeFlags: u8 {
        /// Literal array/hash/string the shareability analyzer may deep-freeze or copy.
        const SHAREABLE_ELIGIBLE = 1 << 0;
        /// Non-literal value inside a literal constant that must be checked at runtime.
        const ENSURE_SHAREABLE = 1 << 1;
        /// String literal frozen by `frozen_string_literal: true`.
        const FROZEN = 1 << 2;
        /// Local variable assignment whose variable is never read.
        const UNUSED = 1 << 3;
        /// Statement already reported as a void value expression.
        const VOID_REPORTED = 1 << 4;
    }
}

/// Node variants.
#[derive(Clone, PartialEq, Debug)]
pub enum NodeKind {
    // === Literals ===
    Nil,
    True,
    False,
    SelfRef,
    /// `__FILE__`
    File,
    /// `__LINE__` with its resolved line number.
    Line(i64),
    /// `__ENCODING__`
    Encoding,
    Number(Box<NumberLit>),
    Str(Vec<u8>),
    /// String with interpolation; parts are `Str` and `Interp` nodes.
    DStr(Vec<Node>),
    /// Backquoted command string.
    XStr(Vec<Node>),
    Sym(Name),
    DSym(Vec<Node>),
    Regexp {
        parts: Vec<Node>,
        options: Box<str>,
    },
    /// `#{...}` or `#@var` inside a literal.
    Interp(Option<Box<Node>>),
    Array(Vec<Node>),
    /// Elements are `Pair` or `DoubleSplat` nodes.
    Hash(Vec<Node>),
    Pair {
        key: Box<Node>,
        value: Box<Node>,
    },
    Range {
        low: Option<Box<Node>>,
        high: Option<Box<Node>>,
        exclusive: bool,
    },
    /// Range in condition position, evaluated as a stateful toggle.
    FlipFlop {
        low: Option<Box<Node>>,
        high: Option<Box<Node>>,
        exclusive: bool,
    },

    // === References ===
    LocalVar(Name),
    IVar(Name),
    CVar(Name),
    GVar(Name),
    BackRef(u8),
    NthRef(u32),
    Const(Name),
    /// `scope::Name`
    Colon2 {
        scope: Box<Node>,
        name: Name,
    },
    /// `::Name`
    Colon3(Name),

    // === Calls ===
    Call(Box<Call>),
    Splat(Option<Box<Node>>),
    DoubleSplat(Option<Box<Node>>),
    BlockPass(Option<Box<Node>>),
    /// `super` with `args: None` forwards the current arguments.
    Super {
        args: Option<Vec<Node>>,
        block: Option<Box<Node>>,
    },
    Yield(Vec<Node>),
    Block(Box<BlockLiteral>),
    Lambda(Box<BlockLiteral>),

    // === Assignment ===
    /// `value` is `None` for targets of a multiple assignment or `for`.
    LocalAsgn {
        name: Name,
        value: Option<Box<Node>>,
    },
    IVarAsgn {
        name: Name,
        value: Option<Box<Node>>,
    },
    CVarAsgn {
        name: Name,
        value: Option<Box<Node>>,
    },
    GVarAsgn {
        name: Name,
        value: Option<Box<Node>>,
    },
    /// Target is a `Const`, `Colon2` or `Colon3` node.
    ConstAsgn {
        target: Box<Node>,
        value: Option<Box<Node>>,
        shareable: Option<ShareableTag>,
    },
    OpAsgn {
        target: Box<Node>,
        op: AssignOp,
        value: Box<Node>,
    },
    MultiAsgn {
        targets: Vec<Node>,
        value: Box<Node>,
    },
    /// Parenthesized group of targets inside a multiple assignment.
    MlhsGroup(Vec<Node>),
    /// `/(?<name>..)/ =~ value` binding named captures.
    MatchAsgn {
        regexp: Box<Node>,
        value: Box<Node>,
        names: Vec<Name>,
    },

    // === Control flow ===
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
    Defined(Box<Node>),
    If {
        cond: Box<Node>,
        then_branch: Option<Box<Node>>,
        else_branch: Option<Box<Node>>,
    },
    While {
        cond: Box<Node>,
        body: Option<Box<Node>>,
        until: bool,
        /// `begin ... end while cond` runs the body first.
        do_while: bool,
    },
    For {
        var: Box<Node>,
        iter: Box<Node>,
        body: Option<Box<Node>>,
    },
    Case {
        subject: Option<Box<Node>>,
        whens: Vec<Node>,
        else_branch: Option<Box<Node>>,
    },
    When {
        conds: Vec<Node>,
        body: Option<Box<Node>>,
    },
    Begin(Box<BeginBody>),
    RescueClause {
        exceptions: Vec<Node>,
        var: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    /// `expr rescue fallback`
    RescueMod {
        expr: Box<Node>,
        rescue: Box<Node>,
    },
    /// Statement sequence.
    Seq(Vec<Node>),
    Parens(Option<Box<Node>>),
    Return(Option<Box<Node>>),
    Break(Option<Box<Node>>),
    Next(Option<Box<Node>>),
    Redo,
    Retry,

    // === Definitions ===
    Def(Box<DefNode>),
    Class {
        path: Box<Node>,
        superclass: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    SClass {
        target: Box<Node>,
        body: Option<Box<Node>>,
    },
    Module {
        path: Box<Node>,
        body: Option<Box<Node>>,
    },
    Alias {
        new: AliasTarget,
        old: AliasTarget,
    },
    Undef(Vec<Name>),
    /// `BEGIN { }`
    PreExe(Option<Box<Node>>),
    /// `END { }`
    PostExe(Option<Box<Node>>),
}

/// A method call.
#[derive(Clone, PartialEq, Debug)]
pub struct Call {
    pub receiver: Option<Node>,
    pub method: Name,
    pub args: Vec<Node>,
    /// `Block` node, or `BlockPass` when given as `&blk`.
    pub block: Option<Node>,
    pub op: CallOp,
    pub form: CallForm,
}

/// Operator between receiver and method name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallOp {
    None,
    Dot,
    SafeNav,
    Colon2,
}

/// Surface syntax the call was written in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallForm {
    /// Bare identifier that is not a known local variable.
    Variable,
    /// `foo(...)` or `recv.foo(...)`, also `recv.foo` without arguments.
    Parens,
    /// `foo a, b` without parentheses.
    Command,
    /// Binary or unary operator.
    Operator,
    /// `recv[...]`
    Index,
    /// `recv.attr = v`
    AttrAssign,
    /// `recv[...] = v`
    IndexAssign,
}

/// Body of `begin`/`def`/`class` with its handlers.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct BeginBody {
    pub body: Option<Node>,
    pub rescues: Vec<Node>,
    pub else_branch: Option<Node>,
    pub ensure: Option<Node>,
    /// Written as an explicit `begin ... end`.
    pub explicit: bool,
}

impl BeginBody {
    pub fn has_handlers(&self) -> bool {
        !self.rescues.is_empty() || self.else_branch.is_some() || self.ensure.is_some()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct DefNode {
    /// Receiver of `def recv.name`.
    pub singleton: Option<Node>,
    pub name: Name,
    pub name_span: Span,
    pub params: Params,
    pub body: Option<Node>,
}

/// `{ |params| body }`, `do |params| body end` or `-> (params) { body }`.
#[derive(Clone, PartialEq, Debug)]
pub struct BlockLiteral {
    pub params: Option<Params>,
    pub body: Option<Node>,
    pub brace: bool,
}

/// Formal parameter list.
///
/// For `rest`, `keyword_rest` and `block` the outer `Option` records
/// presence and the inner one the name (`*` alone is anonymous).
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Params {
    pub required: Vec<ParamTarget>,
    pub optional: Vec<(Name, Node)>,
    pub rest: Option<Option<Name>>,
    pub post: Vec<ParamTarget>,
    pub keywords: Vec<(Name, Option<Node>)>,
    pub keyword_rest: Option<Option<Name>>,
    pub block: Option<Option<Name>>,
    /// Block-local variables after `;`.
    pub locals: Vec<Name>,
    /// `(...)`
    pub forwarding: bool,
    pub span: Span,
}

impl Params {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
            && self.optional.is_empty()
            && self.rest.is_none()
            && self.post.is_empty()
            && self.keywords.is_empty()
            && self.keyword_rest.is_none()
            && self.block.is_none()
            && self.locals.is_empty()
            && !self.forwarding
    }
}

/// Positional parameter, possibly destructuring.
#[derive(Clone, PartialEq, Debug)]
pub enum ParamTarget {
    Name(Name),
    Destructure(Vec<ParamTarget>),
    Splat(Option<Name>),
}

/// Operand of `alias`.
#[derive(Clone, PartialEq, Debug)]
pub enum AliasTarget {
    Method(Name),
    Global(Name),
    BackRef(u8),
    NthRef(u32),
}

/// Value of the `shareable_constant_value` directive in effect.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ShareableMode {
    #[default]
    None,
    Literal,
    ExperimentalEverything,
    ExperimentalCopy,
}

impl ShareableMode {
    /// Parse a directive value (case-insensitive).
    pub fn from_value(value: &str) -> Option<Self> {
        let lower = value.to_ascii_lowercase();
        Some(match lower.as_str() {
            "none" => ShareableMode::None,
            "literal" => ShareableMode::Literal,
            "experimental_everything" => ShareableMode::ExperimentalEverything,
            "experimental_copy" => ShareableMode::ExperimentalCopy,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShareableMode::None => "none",
            ShareableMode::Literal => "literal",
            ShareableMode::ExperimentalEverything => "experimental_everything",
            ShareableMode::ExperimentalCopy => "experimental_copy",
        }
    }
}

/// What the shareability analyzer must do with a constant's value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ShareableAction {
    /// Value is a literal tree; freeze it deeply.
    DeepFreezeLiteral,
    /// Value is not a literal; raise unless it is already shareable.
    EnsureShareable,
    /// Make any value shareable by freezing it.
    MakeShareable,
    /// Make a shareable deep copy of the value.
    MakeShareableCopy,
}

/// Tag on a constant assignment made under a non-`none` directive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ShareableTag {
    pub mode: ShareableMode,
    pub action: ShareableAction,
}
