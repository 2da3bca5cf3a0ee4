//! Pixel Mosaic - Turn an image into tiled mosaics.
//!
//! This binary reads one image, runs the mosaic pipeline and writes the
//! encoded mosaics next to a JSON summary on stdout.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixel_mosaic::{
    codec::ImageCodec,
    config::Config,
    pipeline::{MosaicRequest, MosaicResponse, MosaicService},
    quantize::NeuQuantizer,
    raster::ImageResampler,
};

fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let file = match read_input(config.input.as_deref(), config.max_input_bytes) {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to read input: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(bytes = file.len(), "input read");

    let service = MosaicService::with_collaborators(
        ImageCodec::with_output(config.format, config.jpeg_quality),
        ImageResampler::new(),
        NeuQuantizer::with_sample_factor(config.sample_factor),
        config.limits(),
    );
    let run = service.process(&MosaicRequest::with_options(file, config.options()));

    if let Err(e) = write_images(&config, &run.response) {
        error!("Failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    match serde_json::to_string_pretty(&run.response) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if run.response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Read the source image from `path`, or stdin when absent.
///
/// At most `limit + 1` bytes are read so an oversized input is still seen as
/// oversized by the pipeline without being buffered whole.
fn read_input(path: Option<&Path>, limit: usize) -> io::Result<Vec<u8>> {
    let cap = limit.saturating_add(1) as u64;
    let mut file = Vec::new();
    match path {
        Some(path) => {
            File::open(path)?.take(cap).read_to_end(&mut file)?;
        }
        None => {
            io::stdin().lock().take(cap).read_to_end(&mut file)?;
        }
    }
    Ok(file)
}

/// Write every encoded mosaic to the output directory.
fn write_images(config: &Config, response: &MosaicResponse) -> io::Result<()> {
    if response.images.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(&config.output_dir)?;
    for image in &response.images {
        let path = config.output_path(&image.name);
        fs::write(&path, &image.data)?;
        info!(
            "Wrote {} ({}x{}, {} bytes)",
            path.display(),
            image.width,
            image.height,
            image.bytes
        );
    }
    Ok(())
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so stdout carries only the JSON response.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pixel_mosaic=debug"
    } else {
        "pixel_mosaic=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
