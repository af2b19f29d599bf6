//! Recorded strokes and the JSON stroke file format.
//!
//! ```json
//! { "config": { "epsilon": 4.0 },
//!   "strokes": [ { "points": [[0, 0], [10, 2], [20, 0]], "timestamps": [0.0, 0.1, 0.2] } ] }
//! ```
//!
//! A bare stroke object (`{"points": …}`) is accepted as a one-stroke file.

use std::path::Path;

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::config::FitConfig;
use crate::error::FitError;

/// One finished stroke: sampled points with optional recording times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(with = "xy_pairs")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<f64>>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points, timestamps: None }
    }

    pub fn with_timestamps(points: Vec<Point>, timestamps: Vec<f64>) -> Self {
        Self {
            points,
            timestamps: Some(timestamps),
        }
    }
}

/// A set of strokes plus an optional fitting preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeFile {
    pub strokes: Vec<Stroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<FitConfig>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    File(StrokeFile),
    Single(Stroke),
}

impl StrokeFile {
    pub fn from_json(json: &str) -> Result<Self, FitError> {
        Ok(match serde_json::from_str(json)? {
            Repr::File(file) => file,
            Repr::Single(stroke) => StrokeFile {
                strokes: vec![stroke],
                config: None,
            },
        })
    }

    pub fn load(path: &Path) -> Result<Self, FitError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points.len()).sum()
    }
}

/// Points as `[x, y]` arrays instead of kurbo's `{"x", "y"}` objects.
mod xy_pairs {
    use kurbo::Point;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().map(|p| (p.x, p.y)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let pairs = Vec::<(f64, f64)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(Point::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let file = StrokeFile::from_json(
            r#"{
                "config": {"epsilon": 4.0},
                "strokes": [
                    {"points": [[0, 0], [10, 2], [20, 0]], "timestamps": [0.0, 0.1, 0.2]},
                    {"points": [[5, 5], [6, 6]]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(file.strokes.len(), 2);
        assert_eq!(file.point_count(), 5);
        assert_eq!(file.strokes[0].points[1], Point::new(10.0, 2.0));
        assert_eq!(file.strokes[0].timestamps.as_deref(), Some(&[0.0, 0.1, 0.2][..]));
        assert_eq!(file.strokes[1].timestamps, None);
        assert_eq!(file.config.map(|c| c.epsilon), Some(4.0));
    }

    #[test]
    fn bare_stroke_is_one_stroke_file() {
        let file = StrokeFile::from_json(r#"{"points": [[1.5, 2.5], [3, 4]]}"#).unwrap();
        assert_eq!(file.strokes, vec![Stroke::new(vec![Point::new(1.5, 2.5), Point::new(3.0, 4.0)])]);
        assert!(file.config.is_none());
    }

    #[test]
    fn serializes_points_as_pairs() {
        let stroke = Stroke::new(vec![Point::new(1.0, 2.0)]);
        let json = serde_json::to_string(&stroke).unwrap();
        assert_eq!(json, r#"{"points":[[1.0,2.0]]}"#);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = StrokeFile::from_json(r#"{"points": [[1, 2, 3]]}"#).unwrap_err();
        assert!(matches!(err, FitError::Parse(_)));
    }
}
