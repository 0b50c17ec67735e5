use super::*;
use proptest::prelude::*;

#[test]
fn test_point_is_empty() {
    let s = Span::point(7);
    assert!(s.is_empty());
    assert_eq!(s.len(), 0);
    assert!(!s.contains(7));
}

#[test]
fn test_merge_covers_both() {
    let a = Span::new(4, 9);
    let b = Span::new(1, 5);
    assert_eq!(a.merge(b), Span::new(1, 9));
    assert_eq!(b.merge(a), Span::new(1, 9));
}

#[test]
fn test_to_keeps_start() {
    let a = Span::new(4, 6);
    assert_eq!(a.to(Span::new(10, 12)), Span::new(4, 12));
    // An earlier end never produces an inverted span.
    assert_eq!(a.to(Span::new(0, 2)), Span::new(4, 4));
}

#[test]
fn test_try_from_range_overflow() {
    let big = u32::MAX as usize + 1;
    assert_eq!(
        Span::try_from_range(0..big),
        Err(SpanError::EndTooLarge(big))
    );
    assert_eq!(Span::try_from_range(2..5), Ok(Span::new(2, 5)));
}

#[test]
fn test_debug_format() {
    assert_eq!(format!("{:?}", Span::new(3, 8)), "3..8");
}

proptest! {
    #[test]
    fn merge_is_commutative(a in 0u32..1000, b in 0u32..1000, c in 0u32..1000, d in 0u32..1000) {
        let x = Span::new(a.min(b), a.max(b));
        let y = Span::new(c.min(d), c.max(d));
        prop_assert_eq!(x.merge(y), y.merge(x));
        prop_assert!(x.merge(y).contains_span(x));
        prop_assert!(x.merge(y).contains_span(y));
    }
}
