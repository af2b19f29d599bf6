//! Optional diagnostic output of a fit.
//!
//! The fitter reports the worst-fitting sample of every candidate curve
//! it measures. Editors draw these as short lines from the sample to the
//! curve to visualize where a fit struggles.

use kurbo::{BezPath, Point};

/// Receives the maximum-error sample of each candidate curve.
pub trait DiagnosticSink {
    /// `sample` is the input point, `on_curve` the candidate curve
    /// evaluated at that sample's parameter.
    fn max_error(&mut self, sample: Point, on_curve: Point);
}

impl<F: FnMut(Point, Point)> DiagnosticSink for F {
    fn max_error(&mut self, sample: Point, on_curve: Point) {
        self(sample, on_curve)
    }
}

/// Collects every reported pair for drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugLines {
    pub lines: Vec<(Point, Point)>,
}

impl DebugLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// One open subpath per pair.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        for &(sample, on_curve) in &self.lines {
            path.move_to(sample);
            path.line_to(on_curve);
        }
        path
    }
}

impl DiagnosticSink for DebugLines {
    fn max_error(&mut self, sample: Point, on_curve: Point) {
        self.lines.push((sample, on_curve));
    }
}
