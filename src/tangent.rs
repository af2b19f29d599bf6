//! Endpoint tangent estimation by local point averaging.
//!
//! Freehand input jitters at the sample level, so the direction of the
//! first (or last) polyline segment alone is a poor tangent. Samples
//! near the endpoint are averaged and the tangent points at their centroid.

use kurbo::{Point, Vec2};

use crate::geom;
use crate::segment::Run;

/// Which end of a run a tangent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Leaving the first point of the run, pointing into the curve.
    Start,
    /// At the last point of the run, pointing back into the curve.
    End,
}

/// Estimate the unit tangent at one end of `run`.
///
/// Starts from the adjacent sample and keeps adding samples outward while
/// they stay within `range` of the endpoint. The opposite endpoint of the
/// run is never included unless it is the only neighbour.
pub fn estimate(points: &[Point], run: Run, side: Side, range: f64) -> Vec2 {
    debug_assert!(run.end > run.start && run.end < points.len());

    let sample = |k: usize| match side {
        Side::Start => points[run.start + k],
        Side::End => points[run.end - k],
    };
    let anchor = sample(0);

    let mut sum = sample(1).to_vec2();
    let mut count = 1usize;
    for k in 2..run.span() {
        let q = sample(k);
        if anchor.distance(q) > range {
            break;
        }
        sum += q.to_vec2();
        count += 1;
    }
    let centroid = (sum / count as f64).to_point();

    geom::direction(anchor, centroid)
        .or_else(|| geom::direction(anchor, sample(run.span())))
        .unwrap_or(Vec2::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn two_points_use_the_chord() {
        let p = pts(&[(0.0, 0.0), (3.0, 4.0)]);
        let run = Run::new(0, 1);
        let t1 = estimate(&p, run, Side::Start, 30.0);
        let t2 = estimate(&p, run, Side::End, 30.0);
        assert_abs_diff_eq!(t1.x, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(t1.y, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(t2.x, -0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(t2.y, -0.8, epsilon = 1e-12);
    }

    #[test]
    fn averages_samples_within_range() {
        // Jittery start: the first segment points up, the neighbourhood points right.
        let p = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, -1.0), (3.0, 0.0), (50.0, 0.0)]);
        let run = Run::new(0, 4);
        let t = estimate(&p, run, Side::Start, 5.0);
        // Centroid of (1,1), (2,-1), (3,0) is (2,0).
        assert_abs_diff_eq!(t.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn stops_at_first_sample_out_of_range() {
        let p = pts(&[(0.0, 0.0), (1.0, 1.0), (10.0, 0.0), (2.0, 0.0), (20.0, 0.0)]);
        let run = Run::new(0, 4);
        let t = estimate(&p, run, Side::Start, 5.0);
        // (10,0) is out of range, so (2,0) behind it is ignored too.
        let expected = geom::unit(Vec2::new(1.0, 1.0)).unwrap();
        assert_abs_diff_eq!(t.x, expected.x, epsilon = 1e-12);
        assert_abs_diff_eq!(t.y, expected.y, epsilon = 1e-12);
    }

    #[test]
    fn end_tangent_points_back_into_curve() {
        let p = pts(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]);
        let t = estimate(&p, Run::new(0, 3), Side::End, 30.0);
        assert_abs_diff_eq!(t.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn duplicate_neighbours_fall_back_to_chord() {
        let p = pts(&[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 5.0)]);
        let t = estimate(&p, Run::new(0, 3), Side::Start, 30.0);
        assert_abs_diff_eq!(t.y, 1.0, epsilon = 1e-12);

        let same = pts(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        assert_eq!(estimate(&same, Run::new(0, 2), Side::End, 30.0), Vec2::ZERO);
    }
}
