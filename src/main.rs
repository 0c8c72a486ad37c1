use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;

use unwebp::{bundle, process_uploads, OutputPayload, PipelineConfig, UploadItem};

#[derive(Parser)]
#[command(name = "unwebp")]
#[command(about = "Convert WebP images (bare or inside ZIP/RAR/7Z archives) to JPEG", long_about = None)]
#[command(version)]
struct Args {
    /// Input files (.webp, .zip, .rar, .7z)
    #[arg(value_name = "FILES", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose, args.quiet);

    let config = PipelineConfig::default();

    if !args.output_dir.exists() {
        std::fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;
    }

    let uploads = read_uploads(&args.inputs, &config)?;
    let images = process_uploads(&uploads, &config);

    match bundle(images, &config) {
        OutputPayload::Empty => anyhow::bail!("no valid WebP file found"),
        OutputPayload::Single { filename, data, .. }
        | OutputPayload::Archive { filename, data, .. } => {
            let output_path = args.output_dir.join(&filename);
            std::fs::write(&output_path, data).context("Failed to write output file")?;
            log::info!("Done: {}", output_path.display());
        }
    }

    Ok(())
}

/// Read the named files into upload items, applying the caller-side
/// contract: skip anything over the size cap and anything without a name.
fn read_uploads(inputs: &[PathBuf], config: &PipelineConfig) -> Result<Vec<UploadItem>> {
    let mut uploads = Vec::with_capacity(inputs.len());

    for path in inputs {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat input file: {}", path.display()))?;
        if metadata.len() > config.max_upload_size {
            log::warn!(
                "skipping {}: larger than the {} byte upload limit",
                path.display(),
                config.max_upload_size
            );
            continue;
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if filename.is_empty() {
            log::warn!("skipping {}: no file name", path.display());
            continue;
        }

        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        uploads.push(UploadItem { filename, data });
    }

    Ok(uploads)
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}
