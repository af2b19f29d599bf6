//! Output rendering: SVG documents of fitted paths, and a raster
//! preview for visual inspection.
//!
//! The preview converts kurbo paths to pixels via tiny-skia and produces
//! a three-panel PNG: input polylines, fitted cubics with their handles,
//! and an overlay of both with the max-error diagnostic lines.

use std::path::Path;

use kurbo::{BezPath, PathEl, Point, Rect, Shape};
use tiny_skia::{Color, Pixmap, Transform};

use crate::error::FitError;
use crate::output::OutputPath;
use crate::sink::DebugLines;
use crate::stroke::Stroke;

const PANEL: u32 = 800;
const PADDING: u32 = 20;
const SEPARATOR: u32 = 2;

/// SVG document with one stroked `<path>` per fitted stroke.
pub fn svg_document(fitted: &[OutputPath]) -> String {
    let paths: Vec<BezPath> = fitted.iter().map(OutputPath::to_bezpath).collect();
    let view = paths
        .iter()
        .filter(|p| !p.elements().is_empty())
        .map(|p| p.bounding_box())
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO)
        .inflate(2.0, 2.0);

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\">\n",
        view.x0,
        view.y0,
        view.width(),
        view.height()
    );
    for path in &paths {
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"none\" stroke=\"black\" stroke-width=\"1\"/>\n",
            path.to_svg()
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

/// Convert a kurbo `BezPath` to a `tiny_skia::Path`.
fn kurbo_to_tinyskia(bezpath: &BezPath, transform: Transform) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for el in bezpath.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                let (x, y) = transform_point(p, transform);
                pb.move_to(x, y);
            }
            PathEl::LineTo(p) => {
                let (x, y) = transform_point(p, transform);
                pb.line_to(x, y);
            }
            PathEl::QuadTo(c, p) => {
                let (cx, cy) = transform_point(c, transform);
                let (px, py) = transform_point(p, transform);
                pb.quad_to(cx, cy, px, py);
            }
            PathEl::CurveTo(c1, c2, p) => {
                let (c1x, c1y) = transform_point(c1, transform);
                let (c2x, c2y) = transform_point(c2, transform);
                let (px, py) = transform_point(p, transform);
                pb.cubic_to(c1x, c1y, c2x, c2y, px, py);
            }
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Apply transform manually to a point (f64 → f32), so stroke widths
/// stay in pixels regardless of the canvas scale.
fn transform_point(p: Point, t: Transform) -> (f32, f32) {
    let x = p.x as f32;
    let y = p.y as f32;
    (t.sx * x + t.kx * y + t.tx, t.ky * x + t.sy * y + t.ty)
}

/// Encode a pixmap to PNG bytes.
fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, FitError> {
    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| FitError::Render(e.to_string()))?;
    writer
        .write_image_data(pixmap.data())
        .map_err(|e| FitError::Render(e.to_string()))?;
    drop(writer);
    Ok(buf)
}

fn new_panel(width: u32, height: u32, background: Color) -> Result<Pixmap, FitError> {
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| FitError::Render(format!("cannot allocate {}x{} pixmap", width, height)))?;
    pixmap.fill(background);
    Ok(pixmap)
}

fn stroke_path(pixmap: &mut Pixmap, path: &BezPath, transform: Transform, color: Color, width: f32) {
    if let Some(sk_path) = kurbo_to_tinyskia(path, transform) {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width,
            ..tiny_skia::Stroke::default()
        };
        pixmap.stroke_path(&sk_path, &paint, &stroke, Transform::identity(), None);
    }
}

fn dot(pixmap: &mut Pixmap, p: Point, transform: Transform, color: Color, radius: f32) {
    let (x, y) = transform_point(p, transform);
    if let Some(circle) = tiny_skia::PathBuilder::from_circle(x, y, radius) {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        pixmap.fill_path(
            &circle,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((&first, rest)) = points.split_first() {
        path.move_to(first);
        for &p in rest {
            path.line_to(p);
        }
    }
    path
}

/// Handles of every fitted cubic as separate line subpaths.
fn handles(fitted: &OutputPath) -> BezPath {
    let mut path = BezPath::new();
    for seg in fitted.segments() {
        let c = seg.curve;
        path.move_to(c.p0);
        path.line_to(c.p1);
        path.move_to(c.p3);
        path.line_to(c.p2);
    }
    path
}

/// Canvas → panel transform fitting `bounds` into the padded panel area.
/// Canvas coordinates are Y-down, like the panel.
fn fit_transform(bounds: Rect) -> Transform {
    let content = (PANEL - PADDING * 2) as f64;
    let w = bounds.width().max(1e-9);
    let h = bounds.height().max(1e-9);
    let s = (content / w).min(content / h);
    let ox = PADDING as f64 + (content - w * s) / 2.0;
    let oy = PADDING as f64 + (content - h * s) / 2.0;
    log::debug!(
        "preview bounds={:?} scale={:.4} offset=({:.1}, {:.1})",
        bounds,
        s,
        ox,
        oy
    );
    Transform {
        sx: s as f32,
        kx: 0.0,
        ky: 0.0,
        sy: s as f32,
        tx: (ox - s * bounds.x0) as f32,
        ty: (oy - s * bounds.y0) as f32,
    }
}

fn bounds(strokes: &[Stroke]) -> Rect {
    let mut points = strokes.iter().flat_map(|s| s.points.iter().copied());
    let Some(first) = points.next() else {
        return Rect::new(0.0, 0.0, 1.0, 1.0);
    };
    points.fold(Rect::from_points(first, first), |r, p| r.union_pt(p))
}

/// Render a side-by-side preview PNG.
///
/// Left panel: input polylines with their samples.
/// Middle panel: fitted cubics, handles in blue, anchors as dots.
/// Right panel: overlay, fitted curves in red over the input, plus
/// the diagnostic lines from each worst sample to its curve point.
pub fn render_preview(
    strokes: &[Stroke],
    fitted: &[OutputPath],
    debug: &DebugLines,
    output_path: &Path,
) -> Result<(), FitError> {
    let transform = fit_transform(bounds(strokes));
    let gray = Color::from_rgba8(150, 150, 150, 255);

    // ── Left panel: raw samples ──
    let mut input_panel = new_panel(PANEL, PANEL, Color::WHITE)?;
    for stroke in strokes {
        stroke_path(&mut input_panel, &polyline(&stroke.points), transform, gray, 1.0);
        for &p in &stroke.points {
            dot(&mut input_panel, p, transform, Color::BLACK, 1.5);
        }
    }

    // ── Middle panel: fitted curves ──
    let mut fitted_panel = new_panel(PANEL, PANEL, Color::WHITE)?;
    let blue = Color::from_rgba8(40, 90, 220, 255);
    for path in fitted {
        stroke_path(&mut fitted_panel, &handles(path), transform, blue, 1.0);
        stroke_path(&mut fitted_panel, &path.to_bezpath(), transform, Color::BLACK, 2.0);
        for seg in path.segments() {
            dot(&mut fitted_panel, seg.curve.p1, transform, blue, 2.0);
            dot(&mut fitted_panel, seg.curve.p2, transform, blue, 2.0);
            dot(&mut fitted_panel, seg.curve.p3, transform, Color::BLACK, 3.0);
        }
    }

    // ── Right panel: overlay ──
    let mut overlay_panel = new_panel(PANEL, PANEL, Color::WHITE)?;
    for stroke in strokes {
        stroke_path(&mut overlay_panel, &polyline(&stroke.points), transform, gray, 1.0);
    }
    let red = Color::from_rgba8(255, 0, 0, 160);
    for path in fitted {
        stroke_path(&mut overlay_panel, &path.to_bezpath(), transform, red, 2.0);
    }
    let magenta = Color::from_rgba8(200, 0, 200, 255);
    stroke_path(&mut overlay_panel, &debug.to_bezpath(), transform, magenta, 1.0);

    // ── Composite ──
    let total_w = PANEL * 3 + SEPARATOR * 2;
    let mut final_pixmap = new_panel(total_w, PANEL, Color::from_rgba8(200, 200, 200, 255))?;
    for y in 0..PANEL {
        for x in 0..PANEL {
            let idx = (y * PANEL + x) as usize;
            let row = y * total_w;
            final_pixmap.pixels_mut()[(row + x) as usize] = input_panel.pixels()[idx];
            final_pixmap.pixels_mut()[(row + PANEL + SEPARATOR + x) as usize] =
                fitted_panel.pixels()[idx];
            final_pixmap.pixels_mut()[(row + (PANEL + SEPARATOR) * 2 + x) as usize] =
                overlay_panel.pixels()[idx];
        }
    }

    std::fs::write(output_path, encode_png(&final_pixmap)?)?;
    Ok(())
}
