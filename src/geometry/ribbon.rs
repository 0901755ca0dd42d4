// Ribbon outline and hit testing. A strand renders as its cubic centerline
// thickened to `width` plus the stroke on both sides; the outline is the
// closed polygon of that thickened path and doubles as the selection region.

use crate::geometry::math::{cubic_point, cubic_tangent, distance, perp, unit_vector};
use crate::geometry::tolerance::{EPS_LEN, EPS_POS};
use crate::model::{Point, StrandBase};

const CURVE_SAMPLES: usize = 32;

#[inline]
fn half_width(base: &StrandBase) -> f64 {
    (base.width + 2.0 * base.stroke_width) * 0.5
}

fn finite_geometry(base: &StrandBase) -> bool {
    base.start.is_finite()
        && base.end.is_finite()
        && base.control_point1.is_finite()
        && base.control_point2.is_finite()
}

/// Whether the control points leave the centerline a straight chord.
fn is_straight(base: &StrandBase) -> bool {
    let on_chord = |p: Point| {
        let (d, len) = unit_vector(base.start, base.end);
        if len <= EPS_LEN {
            return true;
        }
        let vx = p.x - base.start.x;
        let vy = p.y - base.start.y;
        let cross = vx * d.y - vy * d.x;
        cross.abs() <= EPS_POS
    };
    on_chord(base.control_point1) && on_chord(base.control_point2)
}

/// Closed outline polygon of the thickened strand, wound one side out and
/// the other back. Degenerate strands (zero length or non-finite geometry)
/// have no outline.
pub fn ribbon_outline(base: &StrandBase) -> Vec<Point> {
    if !finite_geometry(base) || distance(base.start, base.end) <= EPS_LEN {
        return Vec::new();
    }
    let hw = half_width(base);
    if is_straight(base) {
        let (d, _) = unit_vector(base.start, base.end);
        let n = perp(d);
        return vec![
            Point::new(base.start.x + n.x * hw, base.start.y + n.y * hw),
            Point::new(base.end.x + n.x * hw, base.end.y + n.y * hw),
            Point::new(base.end.x - n.x * hw, base.end.y - n.y * hw),
            Point::new(base.start.x - n.x * hw, base.start.y - n.y * hw),
        ];
    }

    let p0 = base.start;
    let p1 = base.control_point1;
    let p2 = base.control_point2;
    let p3 = base.end;
    let mut left = Vec::with_capacity(CURVE_SAMPLES + 1);
    let mut right = Vec::with_capacity(CURVE_SAMPLES + 1);
    let mut last_n = perp(unit_vector(p0, p3).0);
    for i in 0..=CURVE_SAMPLES {
        let t = i as f64 / CURVE_SAMPLES as f64;
        let c = cubic_point(p0, p1, p2, p3, t);
        let tan = cubic_tangent(p0, p1, p2, p3, t);
        let (d, len) = unit_vector(Point::ZERO, tan);
        // A vanishing tangent (cusp) reuses the previous normal.
        let n = if len > EPS_LEN { perp(d) } else { last_n };
        last_n = n;
        left.push(Point::new(c.x + n.x * hw, c.y + n.y * hw));
        right.push(Point::new(c.x - n.x * hw, c.y - n.y * hw));
    }
    right.reverse();
    left.extend(right);
    left
}

/// Even-odd ray-cast containment. An empty polygon contains nothing.
pub fn polygon_contains(poly: &[Point], p: Point) -> bool {
    if poly.len() < 3 || !p.is_finite() {
        return false;
    }
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(start: Point, end: Point) -> StrandBase {
        let mut b = StrandBase::new("1_1", 1, start, end, 46.0);
        b.update_control_points();
        b
    }

    #[test]
    fn straight_outline_is_a_quad() {
        let b = base(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let poly = ribbon_outline(&b);
        assert_eq!(poly.len(), 4);
        // (width 46 + 2 * stroke 4) / 2 = 27 on each side
        assert!(poly.iter().all(|p| (p.y.abs() - 27.0).abs() < 1e-9));
    }

    #[test]
    fn zero_length_has_no_outline() {
        let b = base(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert!(ribbon_outline(&b).is_empty());
    }

    #[test]
    fn contains_center_not_far_point() {
        let b = base(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let poly = ribbon_outline(&b);
        assert!(polygon_contains(&poly, Point::new(50.0, 0.0)));
        assert!(polygon_contains(&poly, Point::new(50.0, 20.0)));
        assert!(!polygon_contains(&poly, Point::new(50.0, 40.0)));
        assert!(!polygon_contains(&poly, Point::new(-30.0, 0.0)));
    }

    #[test]
    fn curved_outline_covers_the_bulge() {
        let mut b = base(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        b.control_point1 = Point::new(25.0, 60.0);
        b.control_point2 = Point::new(75.0, 60.0);
        let poly = ribbon_outline(&b);
        assert!(poly.len() > 4);
        // Midpoint of the curve sits near y = 45; the straight chord misses it.
        assert!(polygon_contains(&poly, Point::new(50.0, 45.0)));
    }
}
