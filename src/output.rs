//! Accumulated fit result: a flat list of bezier points with timestamps.
//!
//! Layout: the first point of the stroke, then one triple
//! (control 1, control 2, anchor) per fitted cubic. Each triple starts
//! at the anchor before it. Only anchors carry timestamps.

use kurbo::{BezPath, CubicBez, Point};
use serde::Serialize;

/// One cubic of the fitted path with the timestamp of its end anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedSegment {
    pub curve: CubicBez,
    /// Recording time of `curve.p3`, if the input had timestamps.
    pub timestamp: Option<f64>,
}

/// Owned, append-only output of a fit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputPath {
    points: Vec<Point>,
    timestamps: Vec<Option<f64>>,
}

impl OutputPath {
    /// Empty path with room for `capacity` points.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            timestamps: Vec::with_capacity(capacity),
        }
    }

    /// Append one point. Capacity doubles when full.
    pub(crate) fn push(&mut self, point: Point, timestamp: Option<f64>) {
        if self.points.len() == self.points.capacity() {
            let extra = self.points.capacity().max(1);
            self.points.reserve_exact(extra);
            self.timestamps.reserve_exact(extra);
        }
        self.points.push(point);
        self.timestamps.push(timestamp);
    }

    /// Append the two handles and the end anchor of `curve`.
    pub(crate) fn push_curve(&mut self, curve: &CubicBez, timestamp: Option<f64>) {
        self.push(curve.p1, None);
        self.push(curve.p2, None);
        self.push(curve.p3, timestamp);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Parallel to [`points`](Self::points); `None` on control points.
    pub fn timestamps(&self) -> &[Option<f64>] {
        &self.timestamps
    }

    /// Point at `index`; negative indices count from the end (`-1` is the last point).
    pub fn node(&self, index: isize) -> Option<Point> {
        let pos = if index < 0 {
            self.points.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.points.get(pos).copied()
    }

    /// Number of fitted cubics.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1) / 3
    }

    /// Iterate the fitted cubics in stroke order.
    pub fn segments(&self) -> impl Iterator<Item = FittedSegment> + '_ {
        (0..self.segment_count()).map(move |k| {
            let i = 3 * k;
            FittedSegment {
                curve: CubicBez::new(
                    self.points[i],
                    self.points[i + 1],
                    self.points[i + 2],
                    self.points[i + 3],
                ),
                timestamp: self.timestamps[i + 3],
            }
        })
    }

    /// Convert to a kurbo path: one `MoveTo`, then one `CurveTo` per segment.
    pub fn to_bezpath(&self) -> BezPath {
        self.path_while(|_| true)
    }

    /// The prefix of the path drawn up to recording time `time`.
    ///
    /// Stops at the first segment whose anchor timestamp is later than
    /// `time`. Segments without a timestamp are always included.
    pub fn until(&self, time: f64) -> BezPath {
        self.path_while(|seg| seg.timestamp.map_or(true, |t| t <= time))
    }

    fn path_while(&self, mut keep: impl FnMut(&FittedSegment) -> bool) -> BezPath {
        let mut path = BezPath::new();
        let Some(&start) = self.points.first() else {
            return path;
        };
        path.move_to(start);
        for seg in self.segments() {
            if !keep(&seg) {
                break;
            }
            path.curve_to(seg.curve.p1, seg.curve.p2, seg.curve.p3);
        }
        path
    }
}
