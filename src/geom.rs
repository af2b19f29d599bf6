//! Shared geometry utilities.

use kurbo::{Point, Vec2};

/// Unit vector in the direction of `v`, or `None` for a zero-length
/// (or non-finite) vector.
pub fn unit(v: Vec2) -> Option<Vec2> {
    let len = v.hypot();
    if len > 0.0 && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}

/// Unit direction from `from` to `to`. `None` when the points coincide.
pub fn direction(from: Point, to: Point) -> Option<Vec2> {
    unit(to - from)
}

/// Unsigned turning angle at `p1` for the polyline `p0 → p1 → p2`,
/// in radians [0, pi]. `None` if either leg has zero length.
pub fn turning_angle(p0: Point, p1: Point, p2: Point) -> Option<f64> {
    let t_in = direction(p0, p1)?;
    let t_out = direction(p1, p2)?;
    Some(t_in.dot(t_out).clamp(-1.0, 1.0).acos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn unit_rejects_zero() {
        assert!(unit(Vec2::ZERO).is_none());
        let u = unit(Vec2::new(3.0, 4.0)).unwrap();
        assert_relative_eq!(u.x, 0.6);
        assert_relative_eq!(u.y, 0.8);
    }

    #[test]
    fn right_angle_turn() {
        let a = turning_angle(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(a, FRAC_PI_2);
    }

    #[test]
    fn straight_and_degenerate() {
        let p = Point::new(2.0, 2.0);
        let a = turning_angle(Point::ZERO, Point::new(1.0, 1.0), p).unwrap();
        assert!(a.abs() < 1e-7);
        assert!(turning_angle(p, p, Point::ZERO).is_none());
    }
}
