// Parametric segment-segment intersection with a tolerance-guarded
// denominator. Parallel, collinear, and degenerate inputs all report None;
// callers that care about overlap handle it themselves.

use crate::geometry::tolerance::{near_zero, EPS_DENOM};
use crate::model::Point;

/// Intersection point of segments (a1, a2) and (b1, b2), if the segments
/// cross within both parameter ranges [0, 1] (endpoints inclusive).
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let denom = (a1.x - a2.x) * (b1.y - b2.y) - (a1.y - a2.y) * (b1.x - b2.x);
    if near_zero(denom, EPS_DENOM) {
        return None;
    }
    let t = ((a1.x - b1.x) * (b1.y - b2.y) - (a1.y - b1.y) * (b1.x - b2.x)) / denom;
    let u = -((a1.x - a2.x) * (a1.y - b1.y) - (a1.y - a2.y) * (a1.x - b1.x)) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    Some(Point::new(
        a1.x + t * (a2.x - a1.x),
        a1.y + t * (a2.y - a1.y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proper_cross() {
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        )
        .unwrap();
        assert!((p.x - 1.0).abs() < 1e-12 && (p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn endpoint_touch_counts() {
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        )
        .unwrap();
        assert!((p.x - 1.0).abs() < 1e-12 && p.y.abs() < 1e-12);
    }

    #[test]
    fn miss_outside_range() {
        // Lines cross, segments do not.
        assert!(segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(3.0, 0.0),
            Point::new(4.0, -1.0),
        )
        .is_none());
    }

    #[test]
    fn parallel_is_none() {
        assert!(segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn collinear_overlap_is_none() {
        assert!(segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        )
        .is_none());
    }

    #[test]
    fn degenerate_segment_is_none() {
        assert!(segment_intersection(
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
        )
        .is_none());
    }

    #[test]
    fn symmetric_in_arguments() {
        let a1 = Point::new(0.0, 0.3);
        let a2 = Point::new(2.0, 1.7);
        let b1 = Point::new(0.1, 2.0);
        let b2 = Point::new(1.9, 0.0);
        let p = segment_intersection(a1, a2, b1, b2).unwrap();
        let q = segment_intersection(b1, b2, a1, a2).unwrap();
        assert!((p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9);
    }
}
