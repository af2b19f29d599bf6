//! Curve parameters for the samples of the active run.
//!
//! Holds the two scratch arrays of a fit, both indexed by input point
//! index and only meaningful inside the run currently being fitted:
//! the parameter `u` of each sample on the candidate curve, and the
//! cached cubic Bernstein weights at that `u`.

use kurbo::{CubicBez, Point, Vec2};

use crate::segment::Run;

/// Cubic Bernstein weights and their derivative weights at one `u`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Basis {
    /// B0..B3.
    pub b: [f64; 4],
    /// Weights of the control-point differences in Q'(u).
    pub d1: [f64; 3],
    /// Weights of the second differences in Q''(u).
    pub d2: [f64; 2],
}

impl Basis {
    pub fn at(u: f64) -> Self {
        let v = 1.0 - u;
        Self {
            b: [v * v * v, 3.0 * u * v * v, 3.0 * u * u * v, u * u * u],
            d1: [3.0 * v * v, 6.0 * u * v, 3.0 * u * u],
            d2: [6.0 * v, 6.0 * u],
        }
    }

    /// Q(u).
    pub fn eval(&self, c: &CubicBez) -> Point {
        let [b0, b1, b2, b3] = self.b;
        (c.p0.to_vec2() * b0 + c.p1.to_vec2() * b1 + c.p2.to_vec2() * b2 + c.p3.to_vec2() * b3)
            .to_point()
    }

    /// Q'(u).
    pub fn deriv(&self, c: &CubicBez) -> Vec2 {
        (c.p1 - c.p0) * self.d1[0] + (c.p2 - c.p1) * self.d1[1] + (c.p3 - c.p2) * self.d1[2]
    }

    /// Q''(u).
    pub fn second_deriv(&self, c: &CubicBez) -> Vec2 {
        ((c.p2 - c.p1) - (c.p1 - c.p0)) * self.d2[0] + ((c.p3 - c.p2) - (c.p2 - c.p1)) * self.d2[1]
    }
}

/// Parameter array and basis cache for one fit.
#[derive(Debug, Clone)]
pub struct Parameters {
    u: Vec<f64>,
    basis: Vec<Basis>,
}

impl Parameters {
    pub fn new(len: usize) -> Self {
        Self {
            u: vec![0.0; len],
            basis: vec![Basis::default(); len],
        }
    }

    #[cfg(test)]
    pub(crate) fn u(&self, i: usize) -> f64 {
        self.u[i]
    }

    pub fn basis(&self, i: usize) -> &Basis {
        &self.basis[i]
    }

    /// Parameters of the samples in `run`, endpoints included.
    #[cfg(test)]
    pub(crate) fn of_run(&self, run: Run) -> &[f64] {
        &self.u[run.start..=run.end]
    }

    /// Assign parameters proportional to cumulative chord length and
    /// refresh the basis cache for `run`.
    ///
    /// A run whose points all coincide gets uniform parameters.
    pub fn chord_length(&mut self, points: &[Point], run: Run) {
        self.u[run.start] = 0.0;
        for i in run.start + 1..=run.end {
            self.u[i] = self.u[i - 1] + points[i].distance(points[i - 1]);
        }

        let total = self.u[run.end];
        if total > 0.0 && total.is_finite() {
            for i in run.start + 1..run.end {
                self.u[i] /= total;
            }
        } else {
            let span = run.span() as f64;
            for i in run.start + 1..run.end {
                self.u[i] = (i - run.start) as f64 / span;
            }
        }
        self.u[run.end] = 1.0;

        self.update_basis(run);
    }

    /// Overwrite the parameters of `run` with `u` (one per sample).
    #[cfg(test)]
    pub(crate) fn assign(&mut self, run: Run, u: &[f64]) {
        self.u[run.start..=run.end].copy_from_slice(u);
        self.update_basis(run);
    }

    /// Recompute the cached Bernstein weights for every sample in `run`.
    pub fn update_basis(&mut self, run: Run) {
        for i in run.start..=run.end {
            self.basis[i] = Basis::at(self.u[i]);
        }
    }

    /// One Newton-Raphson pass moving each interior sample's parameter
    /// toward the closest point of `curve`, then refresh the basis cache.
    ///
    /// Each updated parameter is clamped to [0, 1]. Endpoint parameters
    /// stay exactly 0 and 1.
    pub fn refine(&mut self, points: &[Point], run: Run, curve: &CubicBez) {
        for i in run.start + 1..run.end {
            let basis = &self.basis[i];
            let q = basis.eval(curve);
            let dq = basis.deriv(curve);
            let ddq = basis.second_deriv(curve);

            let diff = q - points[i];
            let numerator = diff.dot(dq);
            let denominator = dq.hypot2() + diff.dot(ddq);
            if denominator == 0.0 {
                continue;
            }
            let u = self.u[i] - numerator / denominator;
            if u.is_finite() {
                self.u[i] = u.clamp(0.0, 1.0);
            }
        }
        debug_assert!(self.u[run.start] == 0.0 && self.u[run.end] == 1.0);

        self.update_basis(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line_curve() -> CubicBez {
        CubicBez::new((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0))
    }

    #[test]
    fn basis_partitions_unity() {
        for &u in &[0.0, 0.25, 0.5, 0.9, 1.0] {
            let sum: f64 = Basis::at(u).b.iter().sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn basis_matches_kurbo() {
        use kurbo::{ParamCurve, ParamCurveDeriv};
        let c = CubicBez::new((0.0, 0.0), (10.0, 30.0), (40.0, -5.0), (50.0, 10.0));
        let basis = Basis::at(0.3);
        let p = basis.eval(&c);
        let expected = c.eval(0.3);
        assert_abs_diff_eq!(p.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, expected.y, epsilon = 1e-9);

        let d = basis.deriv(&c);
        let expected = c.deriv().eval(0.3);
        assert_abs_diff_eq!(d.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(d.y, expected.y, epsilon = 1e-9);

        let dd = basis.second_deriv(&c);
        let expected = c.deriv().deriv().eval(0.3);
        assert_abs_diff_eq!(dd.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(dd.y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn chord_length_is_monotonic_with_exact_ends() {
        let points: Vec<Point> = [(0.0, 0.0), (1.0, 0.0), (1.0, 2.0), (4.0, 6.0), (4.0, 7.0)]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        let mut params = Parameters::new(points.len());
        let run = Run::new(1, 4);
        params.chord_length(&points, run);

        let u = params.of_run(run);
        assert_eq!(u[0], 0.0);
        assert_eq!(u[u.len() - 1], 1.0);
        assert!(u.windows(2).all(|w| w[0] < w[1]));
        // Chords 2, 5, 1.
        assert_abs_diff_eq!(u[1], 2.0 / 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u[2], 7.0 / 8.0, epsilon = 1e-12);
    }

    #[test]
    fn coincident_run_gets_uniform_parameters() {
        let points = vec![Point::new(5.0, 5.0); 5];
        let mut params = Parameters::new(points.len());
        let run = Run::new(0, 4);
        params.chord_length(&points, run);
        assert_eq!(params.of_run(run), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn newton_step_finds_closest_parameter() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.5, 0.0), Point::new(3.0, 0.0)];
        let mut params = Parameters::new(3);
        let run = Run::new(0, 2);
        params.assign(run, &[0.0, 0.4, 1.0]);

        params.refine(&points, run, &line_curve());
        assert_abs_diff_eq!(params.u(1), 0.5, epsilon = 1e-12);
        assert_eq!(params.u(0), 0.0);
        assert_eq!(params.u(2), 1.0);
        assert_eq!(*params.basis(1), Basis::at(params.u(1)));
    }

    #[test]
    fn newton_step_is_clamped_to_unit_interval() {
        // The sample lies past the end of the curve, so the raw step overshoots to 2.0.
        let points = vec![Point::new(0.0, 0.0), Point::new(6.0, 0.0), Point::new(3.0, 0.0)];
        let mut params = Parameters::new(3);
        let run = Run::new(0, 2);
        params.assign(run, &[0.0, 0.9, 1.0]);
        params.refine(&points, run, &line_curve());
        assert_eq!(params.u(1), 1.0);
    }

    #[test]
    fn zero_denominator_leaves_parameter() {
        // Every control point at the origin: Q' and Q'' vanish.
        let curve = CubicBez::new((0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0));
        let points = vec![Point::ZERO, Point::new(1.0, 1.0), Point::ZERO];
        let mut params = Parameters::new(3);
        let run = Run::new(0, 2);
        params.assign(run, &[0.0, 0.3, 1.0]);
        params.refine(&points, run, &curve);
        assert_eq!(params.u(1), 0.3);
    }
}
