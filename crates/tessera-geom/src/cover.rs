//! Rectangle covering.
//!
//! Covering is how a multi-sprite drawable turns into one selection box:
//! the minimal axis-aligned rectangle containing every input rectangle.

use crate::Rect;

/// Minimal rectangle containing all of `rects`, or `None` for an empty input.
#[must_use]
pub fn try_cover(rects: &[Rect]) -> Option<Rect> {
    let (first, rest) = rects.split_first()?;
    Some(rest.iter().fold(*first, |acc, rect| acc.union(rect)))
}

/// Minimal rectangle containing all of `rects`.
///
/// An empty input yields [`Rect::ZERO`]. Callers that need to tell "nothing
/// to cover" apart from a real zero-sized box should use [`try_cover`].
///
/// ```
/// use tessera_geom::{cover, Rect};
///
/// assert_eq!(cover(&[]), Rect::ZERO);
/// ```
#[must_use]
pub fn cover(rects: &[Rect]) -> Rect {
    try_cover(rects).unwrap_or(Rect::ZERO)
}

/// Cover an ordered sequence of `(rectangle, ignore_rest)` pairs.
///
/// Accumulation stops right after the first item whose `ignore_rest` flag
/// is set: that item still contributes, everything after it is skipped.
/// Items without a rectangle (`None`) contribute nothing but their flag is
/// still honoured.
pub fn cover_until<I>(items: I) -> Option<Rect>
where
    I: IntoIterator<Item = (Option<Rect>, bool)>,
{
    let mut covered: Option<Rect> = None;

    for (rect, ignore_rest) in items {
        if let Some(rect) = rect {
            covered = Some(match covered {
                Some(acc) => acc.union(&rect),
                None => rect,
            });
        }

        if ignore_rest {
            break;
        }
    }

    covered
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cover_two_disjoint() {
        let rects = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(20.0, 20.0, 5.0, 5.0)];
        assert_eq!(cover(&rects), Rect::new(0.0, 0.0, 25.0, 25.0));
    }

    #[test]
    fn cover_empty_is_zero() {
        assert_eq!(cover(&[]), Rect::ZERO);
        assert_eq!(try_cover(&[]), None);
    }

    #[test]
    fn cover_single_is_identity() {
        let rect = Rect::new(-3.0, 4.0, 2.0, 1.0);
        assert_eq!(cover(&[rect]), rect);
    }

    #[test]
    fn cover_until_stops_after_flagged_item() {
        let items = vec![
            (Some(Rect::new(0.0, 0.0, 4.0, 4.0)), false),
            (Some(Rect::new(10.0, 0.0, 4.0, 4.0)), true),
            (Some(Rect::new(100.0, 100.0, 4.0, 4.0)), false),
        ];
        assert_eq!(cover_until(items), Some(Rect::new(0.0, 0.0, 14.0, 4.0)));
    }

    #[test]
    fn cover_until_first_flagged_only_counts_itself() {
        let items = vec![
            (Some(Rect::new(5.0, 5.0, 1.0, 1.0)), true),
            (Some(Rect::new(0.0, 0.0, 50.0, 50.0)), false),
        ];
        assert_eq!(cover_until(items), Some(Rect::new(5.0, 5.0, 1.0, 1.0)));
    }

    #[test]
    fn cover_until_skips_missing_rectangles() {
        let items = vec![(None, false), (Some(Rect::new(1.0, 1.0, 2.0, 2.0)), false)];
        assert_eq!(cover_until(items), Some(Rect::new(1.0, 1.0, 2.0, 2.0)));
        assert_eq!(cover_until(vec![(None, true)]), None);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0, 0.0f32..500.0, 0.0f32..500.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn cover_contains_every_input(rects in prop::collection::vec(arb_rect(), 1..16)) {
            let covered = cover(&rects);
            for rect in &rects {
                // Allow for float rounding on the far edges
                prop_assert!(covered.expanded(0.01).contains_rect(rect));
            }
        }

        #[test]
        fn cover_is_order_independent(rects in prop::collection::vec(arb_rect(), 1..8)) {
            let mut reversed = rects.clone();
            reversed.reverse();
            let a = cover(&rects);
            let b = cover(&reversed);
            prop_assert!((a.x - b.x).abs() < 1e-3);
            prop_assert!((a.y - b.y).abs() < 1e-3);
            prop_assert!((a.right() - b.right()).abs() < 1e-3);
            prop_assert!((a.bottom() - b.bottom()).abs() < 1e-3);
        }
    }
}
