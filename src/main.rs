use boxcheck::{check_with_image, image_size, CheckReport, CheckRequest, OverlapMetric};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "boxcheck")]
#[command(about = "boxcheck - flag detections that match no known design component", long_about = None)]
struct Cli {
    /// Request JSON: components plus detections or raw predictions
    request: PathBuf,

    /// Top-left corner distance gate in pixels
    #[arg(long)]
    distance_threshold: Option<f64>,

    /// Overlap ratio gate
    #[arg(long)]
    overlap_threshold: Option<f64>,

    /// Overlap ratio definition
    #[arg(long, value_enum)]
    metric: Option<Metric>,

    /// Only match against remote (library) components
    #[arg(long)]
    remote_only: bool,

    /// Minimum prediction score kept when decoding raw predictions
    #[arg(long)]
    score_threshold: Option<f64>,

    /// Exported image, used for the size of normalized predictions
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Metric {
    /// Intersection over the detection's own area
    DetectionArea,
    /// Intersection over union
    Iou,
}

impl From<Metric> for OverlapMetric {
    fn from(m: Metric) -> Self {
        match m {
            Metric::DetectionArea => OverlapMetric::DetectionArea,
            Metric::Iou => OverlapMetric::Iou,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    /// JSON report with matched entries, corrections and a summary
    Json,
    /// Plain text, one line per correction
    Text,
    /// TSV format: status\tid\tlabel\tscore\tx,y,w,h
    Tsv,
}

fn apply_overrides(cli: &Cli, request: &mut CheckRequest) {
    let cfg = &mut request.config;
    if let Some(v) = cli.distance_threshold {
        cfg.distance_threshold = v;
    }
    if let Some(v) = cli.overlap_threshold {
        cfg.overlap_threshold = v;
    }
    if let Some(m) = cli.metric {
        cfg.metric = m.into();
    }
    if cli.remote_only {
        cfg.remote_only = true;
    }
    if let Some(v) = cli.score_threshold {
        request.decode.score_threshold = v;
    }
}

fn print_report(report: &CheckReport, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            for d in &report.corrections {
                println!("{} {} ({:.1}%)", d.id, d.label, d.score * 100.0);
            }
        }
        OutputFormat::Tsv => {
            for m in &report.matched {
                let b = m.detection.bbox;
                println!(
                    "matched\t{}\t{}\t{:.4}\t{:.1},{:.1},{:.1},{:.1}\t{}\t{:.4}\t{:.2}",
                    m.detection.id,
                    m.detection.label,
                    m.detection.score,
                    b.x,
                    b.y,
                    b.width,
                    b.height,
                    m.component_id,
                    m.overlap_ratio,
                    m.corner_distance,
                );
            }
            for d in &report.corrections {
                let b = d.bbox;
                println!(
                    "correction\t{}\t{}\t{:.4}\t{:.1},{:.1},{:.1},{:.1}",
                    d.id, d.label, d.score, b.x, b.y, b.width, b.height,
                );
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let data = std::fs::read_to_string(&cli.request)?;
    let mut request: CheckRequest = serde_json::from_str(&data)?;
    apply_overrides(&cli, &mut request);

    let image = match &cli.image {
        Some(path) => Some(image_size(path)?),
        None => None,
    };

    let report = check_with_image(&request, image)?;
    log::info!(
        "{} detections: {} matched ({} entries), {} corrections",
        report.summary.detections,
        report.summary.matched_detections,
        report.summary.matched_entries,
        report.summary.corrections
    );

    print_report(&report, cli.format)
}
