//! Least-squares cubic fit with fixed endpoints and tangent directions,
//! and the error measure used to judge the result.

use kurbo::{CubicBez, Point, Vec2};

use crate::param::Parameters;
use crate::segment::Run;

/// Solved handle lengths below this fraction of the chord are treated as
/// a failed fit, and the run is approximated by a straight cubic instead.
pub const MIN_HANDLE_RATIO: f64 = 1.0e-6;

/// Relative size below which the normal-equation determinant counts as zero.
const SINGULAR_DET: f64 = 1.0e-12;

/// Straight cubic: both handles one third of the chord along the tangents.
///
/// Used for two-point runs and as the fallback for degenerate solves.
pub fn straight(v0: Point, v3: Point, t1: Vec2, t2: Vec2) -> CubicBez {
    let d = v0.distance(v3) / 3.0;
    CubicBez::new(v0, v0 + t1 * d, v3 + t2 * d, v3)
}

/// Fit a cubic to the samples of `run` at their current parameters.
///
/// The endpoints are the run's first and last points; `t1` leaves the
/// start, `t2` leaves the end back into the curve. Only the two handle
/// lengths are solved for, from the 2x2 normal equations.
pub fn fit(points: &[Point], params: &Parameters, run: Run, t1: Vec2, t2: Vec2) -> CubicBez {
    let v0 = points[run.start];
    let v3 = points[run.end];

    let (mut c11, mut c12, mut c22, mut x1, mut x2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for i in run.start..=run.end {
        let [b0, b1, b2, b3] = params.basis(i).b;
        let a1 = t1 * b1;
        let a2 = t2 * b2;

        c11 += a1.dot(a1);
        c12 += a1.dot(a2);
        c22 += a2.dot(a2);

        let chord = v0.to_vec2() * (b0 + b1) + v3.to_vec2() * (b2 + b3);
        let residual = points[i].to_vec2() - chord;
        x1 += residual.dot(a1);
        x2 += residual.dot(a2);
    }

    let det = c11 * c22 - c12 * c12;
    let singular = !det.is_finite() || det.abs() <= SINGULAR_DET * c11 * c22;
    let min_handle = MIN_HANDLE_RATIO * v0.distance(v3);
    let (alpha1, alpha2) = if singular {
        (0.0, 0.0)
    } else {
        ((x1 * c22 - c12 * x2) / det, (c11 * x2 - x1 * c12) / det)
    };

    if singular || !(alpha1 >= min_handle && alpha2 >= min_handle) {
        log::trace!(
            "degenerate solve on {}..={} (det={:e}, a1={:e}, a2={:e}), using straight cubic",
            run.start,
            run.end,
            det,
            alpha1,
            alpha2
        );
        return straight(v0, v3, t1, t2);
    }

    CubicBez::new(v0, v0 + t1 * alpha1, v3 + t2 * alpha2, v3)
}

/// The worst-fitting sample of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxError {
    /// Squared distance between the sample and its curve point.
    pub dist_sq: f64,
    /// Input index of the sample.
    pub index: usize,
    pub sample: Point,
    /// Curve evaluated at the sample's parameter.
    pub on_curve: Point,
}

/// Largest squared distance between a sample of `run` and the curve at
/// that sample's parameter.
///
/// Endpoints lie on the curve by construction, so only interior samples
/// are measured and the returned index is always strictly inside the run.
pub fn max_error(points: &[Point], params: &Parameters, run: Run, curve: &CubicBez) -> MaxError {
    debug_assert!(run.span() >= 2, "max_error needs an interior sample");

    let measure = |i: usize| {
        let on_curve = params.basis(i).eval(curve);
        MaxError {
            dist_sq: points[i].distance_squared(on_curve),
            index: i,
            sample: points[i],
            on_curve,
        }
    };

    let mut worst = measure(run.start + 1);
    for i in run.start + 2..run.end {
        let e = measure(i);
        if e.dist_sq > worst.dist_sq {
            worst = e;
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Basis;
    use approx::assert_abs_diff_eq;

    fn setup(coords: &[(f64, f64)]) -> (Vec<Point>, Parameters, Run) {
        let points: Vec<Point> = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
        let run = Run::new(0, points.len() - 1);
        let mut params = Parameters::new(points.len());
        params.chord_length(&points, run);
        (points, params, run)
    }

    #[test]
    fn straight_uses_third_of_chord() {
        let c = straight(
            Point::new(0.0, 0.0),
            Point::new(0.0, 9.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.0),
        );
        assert_eq!(c.p1, Point::new(0.0, 3.0));
        assert_eq!(c.p2, Point::new(3.0, 9.0));
        assert_eq!(c.p3, Point::new(0.0, 9.0));
    }

    #[test]
    fn collinear_samples_give_thirds() {
        let (points, params, run) = setup(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]);
        let c = fit(&points, &params, run, Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0));
        assert_abs_diff_eq!(c.p1.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.p2.x, 20.0, epsilon = 1e-9);
        assert_eq!(c.p1.y, 0.0);
        assert_eq!(c.p2.y, 0.0);

        let e = max_error(&points, &params, run, &c);
        assert!(e.dist_sq < 1e-12);
    }

    #[test]
    fn recovers_a_sampled_arch() {
        let curve = CubicBez::new((0.0, 0.0), (0.0, 40.0), (60.0, 40.0), (60.0, 0.0));
        let us = [0.0, 0.25, 0.5, 0.75, 1.0];
        let points: Vec<Point> = us.iter().map(|&u| Basis::at(u).eval(&curve)).collect();
        let run = Run::new(0, 4);
        // At the true parameters the fit must be exact.
        let mut params = Parameters::new(points.len());
        params.assign(run, &us);

        let c = fit(&points, &params, run, Vec2::new(0.0, 1.0), Vec2::new(0.0, 1.0));
        assert_abs_diff_eq!(c.p1.y, 40.0, epsilon = 1e-6);
        assert_abs_diff_eq!(c.p2.y, 40.0, epsilon = 1e-6);
        assert!(max_error(&points, &params, run, &c).dist_sq < 1e-9);
    }

    #[test]
    fn single_interior_sample_is_singular() {
        let (points, params, run) = setup(&[(0.0, 0.0), (5.0, 1.0), (10.0, 0.0)]);
        let t1 = Vec2::new(1.0, 0.0);
        let t2 = Vec2::new(-1.0, 0.0);
        let c = fit(&points, &params, run, t1, t2);
        assert_eq!(c, straight(points[0], points[2], t1, t2));
    }

    #[test]
    fn negative_handles_fall_back_to_straight() {
        // Samples bulge up, tangents point down.
        let (points, params, run) =
            setup(&[(0.0, 0.0), (2.0, 5.0), (5.0, 7.0), (8.0, 5.0), (10.0, 0.0)]);
        let t1 = Vec2::new(0.0, -1.0);
        let t2 = Vec2::new(0.0, -1.0);
        let c = fit(&points, &params, run, t1, t2);
        assert_eq!(c, straight(points[0], points[4], t1, t2));
    }

    #[test]
    fn max_error_is_interior() {
        let (points, params, run) = setup(&[(0.0, 0.0), (5.0, 1.0), (10.0, 8.0), (15.0, 0.0)]);
        let c = straight(points[0], points[3], Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0));
        let e = max_error(&points, &params, run, &c);
        assert_eq!(e.index, 2);
        assert_eq!(e.sample, points[2]);
        assert_abs_diff_eq!(e.dist_sq, e.sample.distance_squared(e.on_curve), epsilon = 1e-12);
    }
}
