//! stroke2bez: freehand stroke polyline → minimal cubic bezier path.
//!
//! Fits piecewise cubic Beziers to a dense sequence of digitized points
//! within an absolute error tolerance, keeping sharp corners sharp.
//! Each smooth section is fitted with Schneider's algorithm: chord-length
//! parameters, a least-squares solve for the handle lengths, Newton-Raphson
//! reparameterization, and splitting at the worst sample.
//!
//! # Example
//!
//! ```
//! use stroke2bez::{fit, FitConfig, kurbo::Point};
//!
//! let points: Vec<Point> = (0..4).map(|i| Point::new(i as f64 * 10.0, 0.0)).collect();
//! let path = fit(&points, None, &FitConfig::default(), None);
//! // First point, then one (control, control, anchor) triple per cubic.
//! assert_eq!(path.len(), 4);
//! ```

#![forbid(unsafe_code)]

mod config;
mod geom;
mod output;
mod param;
mod segment;
mod sink;
mod solve;
mod stroke;
mod tangent;

pub mod error;
pub mod render;

// Re-export kurbo so downstream users get the same version
// used by the input points and OutputPath.
pub use kurbo;

pub use config::FitConfig;
pub use error::FitError;
pub use output::{FittedSegment, OutputPath};
pub use segment::{corner_runs, Run};
pub use sink::{DebugLines, DiagnosticSink};
pub use solve::MIN_HANDLE_RATIO;
pub use stroke::{Stroke, StrokeFile};

use kurbo::Point;
use rayon::prelude::*;

use segment::Segmenter;

/// Fit cubic Beziers to a finished stroke.
///
/// `timestamps`, when given, must be parallel to `points`; each emitted
/// anchor carries the timestamp of the input sample it came from.
/// `sink` receives the worst-fitting sample of every candidate curve.
///
/// The caller guarantees `points.len() >= 2`, a matching timestamp count
/// and a valid `config` (see [`FitConfig::validate`]). These are checked
/// in debug builds only; use [`try_fit`] for untrusted input.
pub fn fit(
    points: &[Point],
    timestamps: Option<&[f64]>,
    config: &FitConfig,
    sink: Option<&mut dyn DiagnosticSink>,
) -> OutputPath {
    debug_assert!(points.len() >= 2, "need at least 2 points, got {}", points.len());
    debug_assert!(timestamps.map_or(true, |ts| ts.len() == points.len()));
    debug_assert!(config.validate().is_ok(), "invalid config {:?}", config);

    Segmenter::new(points, timestamps, config, sink).run()
}

/// [`fit`] with its preconditions checked and reported as errors.
pub fn try_fit(
    points: &[Point],
    timestamps: Option<&[f64]>,
    config: &FitConfig,
    sink: Option<&mut dyn DiagnosticSink>,
) -> Result<OutputPath, FitError> {
    if points.len() < 2 {
        return Err(FitError::TooFewPoints(points.len()));
    }
    if let Some(ts) = timestamps {
        if ts.len() != points.len() {
            return Err(FitError::TimestampMismatch {
                points: points.len(),
                timestamps: ts.len(),
            });
        }
    }
    config.validate()?;
    Ok(fit(points, timestamps, config, sink))
}

/// Fit many independent strokes in parallel, one result per stroke.
pub fn fit_strokes(strokes: &[Stroke], config: &FitConfig) -> Vec<Result<OutputPath, FitError>> {
    strokes
        .par_iter()
        .map(|stroke| try_fit(&stroke.points, stroke.timestamps.as_deref(), config, None))
        .collect()
}
