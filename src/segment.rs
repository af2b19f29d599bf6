//! Corner splitting and the accept / refine / split loop.
//!
//! The stroke is cut into runs at sharp corners; each run is fitted
//! independently. A run's candidate cubic is accepted when every sample
//! is within `epsilon`, reparameterized when the error is moderate, and
//! otherwise split at the worst sample into two smaller runs that share
//! a tangent there.

use kurbo::{CubicBez, Point, Vec2};

use crate::config::FitConfig;
use crate::geom;
use crate::output::OutputPath;
use crate::param::Parameters;
use crate::sink::DiagnosticSink;
use crate::solve;
use crate::tangent::{self, Side};

/// Inclusive index range `[start, end]` of input points fitted as one problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(end > start, "run {}..={} is empty", start, end);
        Self { start, end }
    }

    /// Number of polyline segments in the run (points minus one).
    pub fn span(&self) -> usize {
        self.end - self.start
    }
}

/// Partition `points` into runs at every interior vertex whose turning
/// angle exceeds `corner_thresh`. Adjacent runs share the corner point.
///
/// Vertices next to a zero-length segment are never corners.
pub fn corner_runs(points: &[Point], corner_thresh: f64) -> Vec<Run> {
    let n = points.len();
    debug_assert!(n >= 2, "need at least 2 points, got {}", n);

    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..n.saturating_sub(1) {
        let is_corner = geom::turning_angle(points[i - 1], points[i], points[i + 1])
            .is_some_and(|angle| angle > corner_thresh);
        if is_corner {
            runs.push(Run::new(start, i));
            start = i;
        }
    }
    runs.push(Run::new(start, n - 1));
    runs
}

/// A run waiting to be fitted, with its fixed end tangents.
#[derive(Debug, Clone, Copy)]
struct Task {
    run: Run,
    t1: Vec2,
    t2: Vec2,
}

/// Counters reported in the debug log after a fit.
#[derive(Debug, Clone, Copy, Default)]
struct Stats {
    runs: usize,
    refinements: usize,
    splits: usize,
}

/// Scratch state of one fit: borrowed input, owned parameters and output.
pub(crate) struct Segmenter<'a, 's> {
    points: &'a [Point],
    timestamps: Option<&'a [f64]>,
    config: &'a FitConfig,
    params: Parameters,
    out: OutputPath,
    sink: Option<&'s mut (dyn DiagnosticSink + 's)>,
    stats: Stats,
}

impl<'a, 's> Segmenter<'a, 's> {
    pub(crate) fn new(
        points: &'a [Point],
        timestamps: Option<&'a [f64]>,
        config: &'a FitConfig,
        sink: Option<&'s mut (dyn DiagnosticSink + 's)>,
    ) -> Self {
        Self {
            points,
            timestamps,
            config,
            params: Parameters::new(points.len()),
            out: OutputPath::with_capacity(points.len()),
            sink,
            stats: Stats::default(),
        }
    }

    /// Fit the whole stroke and hand back the accumulated path.
    pub(crate) fn run(mut self) -> OutputPath {
        self.out.push(self.points[0], self.timestamp(0));
        for run in corner_runs(self.points, self.config.corner_thresh) {
            self.fit_run(run);
        }
        log::debug!(
            "fitted {} points: {} runs, {} refinements, {} splits -> {} cubics",
            self.points.len(),
            self.stats.runs,
            self.stats.refinements,
            self.stats.splits,
            self.out.segment_count()
        );
        self.out
    }

    /// Fit one corner-delimited run, splitting as needed.
    ///
    /// Sub-runs are processed depth-first, first half before second half,
    /// so emitted segments stay in stroke order.
    fn fit_run(&mut self, run: Run) {
        self.stats.runs += 1;
        let range = self.config.tangent_range;
        let mut pending = vec![Task {
            run,
            t1: tangent::estimate(self.points, run, Side::Start, range),
            t2: tangent::estimate(self.points, run, Side::End, range),
        }];
        while let Some(task) = pending.pop() {
            if let Some((first, second)) = self.fit_task(task) {
                pending.push(second);
                pending.push(first);
            }
        }
    }

    /// Fit a single task. Returns the two halves when it has to be split.
    fn fit_task(&mut self, task: Task) -> Option<(Task, Task)> {
        let Task { run, t1, t2 } = task;
        let points = self.points;

        if run.span() == 1 {
            let curve = solve::straight(points[run.start], points[run.end], t1, t2);
            self.emit(&curve, run.end);
            return None;
        }

        let epsilon_sq = self.config.epsilon * self.config.epsilon;
        let psi_sq = self.config.psi * self.config.psi;

        self.params.chord_length(points, run);
        let mut level = 0;
        let worst = loop {
            let curve = solve::fit(points, &self.params, run, t1, t2);
            let worst = solve::max_error(points, &self.params, run, &curve);
            if let Some(sink) = self.sink.as_deref_mut() {
                sink.max_error(worst.sample, worst.on_curve);
            }

            if worst.dist_sq < epsilon_sq {
                self.emit(&curve, run.end);
                return None;
            }
            if worst.dist_sq < psi_sq && level < self.config.max_iter {
                self.params.refine(points, run, &curve);
                self.stats.refinements += 1;
                level += 1;
                continue;
            }
            break worst;
        };

        let split = worst.index;
        log::trace!(
            "split {}..={} at {} (error {:.3}, level {})",
            run.start,
            run.end,
            split,
            worst.dist_sq.sqrt(),
            level
        );
        self.stats.splits += 1;

        let direction = split_direction(points, split);
        Some((
            Task {
                run: Run::new(run.start, split),
                t1,
                t2: -direction,
            },
            Task {
                run: Run::new(split, run.end),
                t1: direction,
                t2,
            },
        ))
    }

    fn emit(&mut self, curve: &CubicBez, anchor: usize) {
        let timestamp = self.timestamp(anchor);
        self.out.push_curve(curve, timestamp);
    }

    fn timestamp(&self, index: usize) -> Option<f64> {
        self.timestamps.map(|ts| ts[index])
    }
}

/// Stroke direction through interior point `i`: the normalized average
/// of the incoming and outgoing chords.
fn split_direction(points: &[Point], i: usize) -> Vec2 {
    let incoming = points[i] - points[i - 1];
    let outgoing = points[i + 1] - points[i];
    geom::unit((incoming + outgoing) * 0.5)
        .or_else(|| geom::unit(outgoing))
        .or_else(|| geom::unit(incoming))
        .unwrap_or(Vec2::ZERO)
}
