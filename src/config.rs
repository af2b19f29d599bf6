use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// All curve fitting parameters in one struct.
/// Serializable so presets can be stored next to stroke files,
/// and plain data so an editor can adjust it between fits.
///
/// Distances are absolute canvas units. The error metric is not
/// normalized by zoom: a stroke fitted at a different scale needs
/// a different config (see [`FitConfig::for_view_scale`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Turning angle (radians) above which an interior vertex is a corner.
    /// The stroke is split there and never blended across. Zero makes
    /// every bend a corner; anything at or above pi disables corners.
    pub corner_thresh: f64,
    /// Radius around a run endpoint within which samples are averaged
    /// to estimate the endpoint tangent. Larger = smoother tangents.
    pub tangent_range: f64,
    /// Maximum allowed distance between a sample and the fitted curve.
    pub epsilon: f64,
    /// Error distance above which a run is split instead of refined.
    /// At or below `epsilon`, runs are never refined.
    pub psi: f64,
    /// Newton-Raphson reparameterization attempts per run before splitting.
    pub max_iter: u32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            corner_thresh: 0.873, // ~50 degrees
            tangent_range: 30.0,
            epsilon: 8.0,
            psi: 30.0,
            max_iter: 3,
        }
    }
}

impl FitConfig {
    /// Pencil tool preset for a canvas viewed at `scale` (screen px per
    /// canvas unit). Tolerances are tuned in screen pixels and converted
    /// to canvas units so a stroke looks equally smooth at any zoom.
    pub fn for_view_scale(scale: f64) -> Self {
        Self {
            corner_thresh: PI / 6.0,
            tangent_range: 20.0 / scale,
            epsilon: 10.0 / scale,
            psi: 80.0 / scale,
            max_iter: 4,
        }
    }

    /// Check that every field is usable by the fitter.
    pub fn validate(&self) -> Result<(), FitError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(FitError::InvalidConfig(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )))
            }
        };
        positive("epsilon", self.epsilon)?;
        positive("psi", self.psi)?;
        positive("tangent_range", self.tangent_range)?;

        if self.corner_thresh.is_nan() || self.corner_thresh < 0.0 {
            return Err(FitError::InvalidConfig(format!(
                "corner_thresh must be non-negative, got {}",
                self.corner_thresh
            )));
        }
        Ok(())
    }
}
