use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use longshot::rendering::{HtmlSurface, SurfaceConfig};
use longshot::{
    ExportConfig, ExportFormat, ExportSource, FileSink, ImageExportService, Progress, Viewport,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Capture a whole HTML document as one long image")]
struct Args {
    /// HTML file to render
    input: PathBuf,
    /// Directory the image is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Preferred output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Png)]
    format: ExportFormat,
    /// JSON file with `limits` and `readiness` overrides
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output canvas width in pixels
    #[arg(long)]
    target_width: Option<u32>,
    /// Width of the off-screen layout viewport
    #[arg(long, default_value_t = 1080)]
    viewport_width: u32,
    /// Height of the off-screen layout viewport
    #[arg(long, default_value_t = 1200)]
    viewport_height: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path).context("load export config")?,
        None => ExportConfig::default(),
    };
    if let Some(width) = args.target_width {
        config.limits.target_width = width;
    }

    let html = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("read {}", args.input.display()))?;
    let surface = HtmlSurface::load(
        &html,
        SurfaceConfig {
            viewport: Viewport {
                width: args.viewport_width,
                height: args.viewport_height,
            },
            ..Default::default()
        },
    );

    let service = ImageExportService::from_config(&config);
    let mut progress = Progress::new(|p| eprint!("\rexporting {:>3.0}%", p * 100.0));
    let output = service
        .export_single_image(ExportSource::Background(surface), args.format, &mut progress)
        .await;
    eprintln!();
    let output = output.context("export failed")?;

    if output.fell_back() {
        println!(
            "{} is not available here; saved as {} instead",
            output.requested_format, output.format_used
        );
    }

    let mut sink = FileSink::new(&args.out_dir);
    output.save_to(&mut sink).await.context("save image")?;
    println!(
        "{}x{} {} -> {} (sha256 {})",
        output.width,
        output.height,
        output.format_used,
        sink.last_saved().unwrap_or(sink.dir()).display(),
        output.digest()
    );
    Ok(())
}
