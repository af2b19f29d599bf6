use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use stroke2bez::{DebugLines, FitConfig, OutputPath, StrokeFile};

#[derive(Parser)]
#[command(name = "stroke2bez", about = "Freehand stroke polylines to cubic bezier paths")]
struct Cli {
    /// Input stroke file (JSON: {"strokes": [{"points": [[x, y], ...]}]})
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the fitted points and timestamps as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write a three-panel preview PNG (input · fit · overlay)
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Use the pencil preset for this view scale (screen px per canvas unit)
    #[arg(long)]
    view_scale: Option<f64>,

    /// Max distance between a sample and the curve
    #[arg(long)]
    epsilon: Option<f64>,

    /// Error distance above which a section is split instead of refined
    #[arg(long)]
    psi: Option<f64>,

    /// Corner detection angle threshold in degrees
    #[arg(long)]
    corner_angle: Option<f64>,

    /// Radius for endpoint tangent averaging
    #[arg(long)]
    tangent_range: Option<f64>,

    /// Newton-Raphson passes before splitting
    #[arg(long)]
    max_iter: Option<u32>,
}

impl Cli {
    /// Preset (view scale, then stroke file, then default) with flag overrides.
    fn config(&self, file: &StrokeFile) -> FitConfig {
        let mut config = match (self.view_scale, file.config) {
            (Some(scale), _) => FitConfig::for_view_scale(scale),
            (None, Some(config)) => config,
            (None, None) => FitConfig::default(),
        };
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(psi) = self.psi {
            config.psi = psi;
        }
        if let Some(degrees) = self.corner_angle {
            config.corner_thresh = degrees.to_radians();
        }
        if let Some(range) = self.tangent_range {
            config.tangent_range = range;
        }
        if let Some(max_iter) = self.max_iter {
            config.max_iter = max_iter;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let t_start = Instant::now();

    let file = StrokeFile::load(&cli.input)?;
    let config = cli.config(&file);
    config.validate()?;

    eprintln!();
    eprintln!(
        "  Load        {} strokes, {} points",
        file.strokes.len(),
        file.point_count()
    );
    eprintln!(
        "  Config      \u{03b5}={} \u{03c8}={} corner={:.1}\u{00b0} tangent={} iter={}",
        config.epsilon,
        config.psi,
        config.corner_thresh.to_degrees(),
        config.tangent_range,
        config.max_iter
    );

    // The preview needs the diagnostic lines, which a parallel fit can't share.
    let mut debug = DebugLines::new();
    let fitted: Vec<OutputPath> = if cli.preview.is_some() {
        file.strokes
            .iter()
            .map(|s| stroke2bez::try_fit(&s.points, s.timestamps.as_deref(), &config, Some(&mut debug)))
            .collect::<Result<_, _>>()?
    } else {
        stroke2bez::fit_strokes(&file.strokes, &config)
            .into_iter()
            .collect::<Result<_, _>>()?
    };

    let segments: usize = fitted.iter().map(OutputPath::segment_count).sum();
    eprintln!(
        "  Fit         {} cubics ({} points)  ({}ms)",
        segments,
        fitted.iter().map(OutputPath::len).sum::<usize>(),
        t_start.elapsed().as_millis()
    );

    if let Some(path) = &cli.output {
        std::fs::write(path, stroke2bez::render::svg_document(&fitted))?;
        eprintln!("  SVG         {}", path.display());
    }
    if let Some(path) = &cli.json {
        std::fs::write(path, serde_json::to_string_pretty(&fitted)?)?;
        eprintln!("  JSON        {}", path.display());
    }
    if let Some(path) = &cli.preview {
        stroke2bez::render::render_preview(&file.strokes, &fitted, &debug, path)?;
        eprintln!("  Preview     {}", path.display());
    }
    eprintln!();

    Ok(())
}
