// Scalar and vector helpers shared across the document and the generators.

use crate::geometry::tolerance::EPS_LEN;
use crate::model::Point;

#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Normalized direction a -> b, with the length. Degenerate input yields a
/// zero vector rather than NaN.
#[inline]
pub fn unit_vector(a: Point, b: Point) -> (Point, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len > EPS_LEN {
        (Point::new(dx / len, dy / len), len)
    } else {
        (Point::ZERO, 0.0)
    }
}

/// Left-hand perpendicular of a unit direction.
#[inline]
pub fn perp(d: Point) -> Point {
    Point::new(-d.y, d.x)
}

/// Step `length` from `origin` along `angle_deg` in the screen polar
/// convention: 0 degrees points along +y (down), 90 along +x. This is the
/// convention the attachment model and the grid generators share; every
/// stored angle constant assumes it.
#[inline]
pub fn point_at_angle(origin: Point, angle_deg: f64, length: f64) -> Point {
    let rad = angle_deg.to_radians();
    Point::new(origin.x + length * rad.sin(), origin.y + length * rad.cos())
}

/// Inverse of `point_at_angle`: the screen-convention angle from `a` to `b`,
/// normalized to [0, 360).
#[inline]
pub fn angle_to(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx.atan2(dy).to_degrees().rem_euclid(360.0)
}

/// Rotate `p` around `pivot` by `degrees` (counterclockwise in math axes).
#[inline]
pub fn rotate_about(p: Point, pivot: Point, degrees: f64) -> Point {
    let rad = degrees.to_radians();
    let (s, c) = rad.sin_cos();
    let dx = p.x - pivot.x;
    let dy = p.y - pivot.y;
    Point::new(pivot.x + dx * c - dy * s, pivot.y + dx * s + dy * c)
}

/// Cubic Bezier point at parameter t.
#[inline]
pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Cubic Bezier derivative at parameter t (unnormalized tangent).
#[inline]
pub fn cubic_tangent(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = 3.0 * mt * mt;
    let b = 6.0 * mt * t;
    let c = 3.0 * t * t;
    Point::new(
        a * (p1.x - p0.x) + b * (p2.x - p1.x) + c * (p3.x - p2.x),
        a * (p1.y - p0.y) + b * (p2.y - p1.y) + c * (p3.y - p2.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tolerance::approx_eq;

    #[test]
    fn screen_angle_convention() {
        let p = point_at_angle(Point::new(100.0, 100.0), 90.0, 50.0);
        assert!(approx_eq(p.x, 150.0, 1e-9));
        assert!(approx_eq(p.y, 100.0, 1e-9));

        let down = point_at_angle(Point::ZERO, 0.0, 10.0);
        assert!(approx_eq(down.x, 0.0, 1e-9));
        assert!(approx_eq(down.y, 10.0, 1e-9));
    }

    #[test]
    fn angle_to_inverts_point_at_angle() {
        let o = Point::new(3.0, -7.0);
        for deg in [0.0, 37.5, 90.0, 181.0, 270.0, 359.0] {
            let p = point_at_angle(o, deg, 12.0);
            assert!(approx_eq(angle_to(o, p), deg, 1e-9), "deg {deg}");
        }
    }

    #[test]
    fn unit_vector_degenerate() {
        let (d, len) = unit_vector(Point::new(1.0, 1.0), Point::new(1.0, 1.0));
        assert_eq!(len, 0.0);
        assert_eq!(d, Point::ZERO);
    }
}
