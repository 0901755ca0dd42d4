// Masked-strand derivation. A mask is the crossing of two strands: its
// cached base geometry mirrors one of them (which one depends on the
// pattern's handedness), and its center sits on the centerline intersection.

use crate::geometry::intersect::segment_intersection;
use crate::geometry::math::{perp, unit_vector};
use crate::model::{DeletionRect, MaskedStrand, StrandBase};

pub use crate::model::MaskAnchor;

/// Derive the mask over the crossing of two strands, or `None` when their
/// centerline segments do not intersect.
pub fn derive_mask(
    first_name: &str,
    first: &StrandBase,
    second_name: &str,
    second: &StrandBase,
    anchor: MaskAnchor,
) -> Option<MaskedStrand> {
    let crossing = segment_intersection(first.start, first.end, second.start, second.end)?;
    let src = match anchor {
        MaskAnchor::First => first,
        MaskAnchor::Second => second,
    };
    let mut base = StrandBase::new(
        &format!("{first_name}_{second_name}"),
        src.set_number,
        src.start,
        src.end,
        src.width,
    );
    base.color = src.color;
    base.stroke_color = src.stroke_color;
    base.stroke_width = src.stroke_width;
    Some(MaskedStrand {
        base,
        first_selected_strand: first_name.to_string(),
        second_selected_strand: second_name.to_string(),
        anchor,
        base_center_point: crossing,
        // Independent copy; user edits move this one, refreshes shift it by
        // the base center's delta.
        edited_center_point: crossing,
        deletion_rectangles: Vec::new(),
    })
}

/// Oriented rectangle covering a strand's ribbon, widened by `widen` on
/// each side. Degenerate strands have no meaningful orientation.
pub fn deletion_rect_for(base: &StrandBase, widen: f64) -> Option<DeletionRect> {
    let (d, len) = unit_vector(base.start, base.end);
    if len == 0.0 {
        return None;
    }
    let n = perp(d);
    let hw = (base.width + 2.0 * base.stroke_width) * 0.5 + widen;
    Some(DeletionRect {
        top_left: crate::model::Point::new(base.start.x + n.x * hw, base.start.y + n.y * hw),
        top_right: crate::model::Point::new(base.end.x + n.x * hw, base.end.y + n.y * hw),
        bottom_left: crate::model::Point::new(base.start.x - n.x * hw, base.start.y - n.y * hw),
        bottom_right: crate::model::Point::new(base.end.x - n.x * hw, base.end.y - n.y * hw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn strand(name: i32, start: Point, end: Point) -> StrandBase {
        StrandBase::new(&format!("{name}_1"), name, start, end, 46.0)
    }

    #[test]
    fn anchor_selects_geometry_source() {
        let v = strand(1, Point::new(50.0, 0.0), Point::new(50.0, 100.0));
        let h = strand(2, Point::new(0.0, 50.0), Point::new(100.0, 50.0));
        let rh = derive_mask("1_1", &v, "2_1", &h, MaskAnchor::Second).unwrap();
        assert_eq!(rh.base.start, h.start);
        assert_eq!(rh.base.set_number, 2);
        assert_eq!(rh.base.layer_name, "1_1_2_1");
        let lh = derive_mask("1_1", &v, "2_1", &h, MaskAnchor::First).unwrap();
        assert_eq!(lh.base.start, v.start);
        assert_eq!(lh.base.set_number, 1);
        assert_eq!(rh.base_center_point, Point::new(50.0, 50.0));
        assert_eq!(rh.base_center_point, lh.base_center_point);
    }

    #[test]
    fn no_crossing_no_mask() {
        let a = strand(1, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let b = strand(2, Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        assert!(derive_mask("1_1", &a, "2_1", &b, MaskAnchor::Second).is_none());
    }

    #[test]
    fn deletion_rect_spans_the_ribbon() {
        let b = strand(1, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let r = deletion_rect_for(&b, 3.0).unwrap();
        // (46 + 2*4)/2 + 3 = 30
        assert!((r.top_left.y + 30.0).abs() < 1e-9 || (r.top_left.y - 30.0).abs() < 1e-9);
        assert!((r.top_left.x).abs() < 1e-9);
        assert!((r.top_right.x - 100.0).abs() < 1e-9);
    }
}
