use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use ct_scan_sim::{CtScanner, Image, ScanConfig};

////////////////////////////////////////////////////////////////////////
// Main entry point
//

/// Simulate a fan-beam CT scan of an image and reconstruct it by
/// (optionally filtered) back-projection.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Input image file, which will be scanned.
    #[arg(long)]
    input_image: PathBuf,
    /// Rotation of the emitter/detector system per step, in degrees.
    #[arg(long, default_value_t = 1.0)]
    angular_step: f64,
    /// Number of detectors on the arc opposite the emitter.
    #[arg(long, default_value_t = 180)]
    detectors: usize,
    /// Angular aperture of the detector fan, in degrees.
    #[arg(long, default_value_t = 120.0)]
    spread: f64,
    /// Ramp-filter each projection before back-projection.
    #[arg(long)]
    filtered: bool,
    /// Override the bright-center correction factor.
    #[arg(long)]
    skip_factor: Option<f64>,
    /// File to write the intermediate sinogram to.
    #[arg(long)]
    output_sinogram: Option<PathBuf>,
    /// File to write the reconstructed image to.
    #[arg(long)]
    output_image: Option<PathBuf>,
}

fn load_image(path: &Path) -> Result<Image> {
    let decoded = image::open(path)
        .with_context(|| format!("could not read {}", path.display()))?
        .into_rgb8();
    Ok(Image::from_rgb_average(&decoded)?)
}

fn save_image(image: &Image, path: &Path) -> Result<()> {
    image
        .to_gray_image()
        .save(path)
        .with_context(|| format!("could not write {}", path.display()))
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let image = load_image(&opts.input_image)?;
    let mut config = ScanConfig::new(
        opts.angular_step,
        opts.detectors,
        opts.spread,
        opts.filtered,
    )?;
    if let Some(skip_factor) = opts.skip_factor {
        config = config.with_skip_factor(skip_factor);
    }

    let mut scanner = CtScanner::new(image, config)?;

    eprint!("Scanning... ");
    scanner.build_sinogram()?;
    eprintln!("done ({} steps).", scanner.sinogram().steps);

    if let Some(ref name) = opts.output_sinogram {
        save_image(&scanner.sinogram().to_image()?, name)?;
    }

    eprint!("Reconstructing... ");
    let reconstruction = scanner.reconstruct()?;
    eprintln!("done!");

    let mse = scanner.mean_squared_error(&reconstruction)?;
    println!("Mean squared error vs. original: {:.3}", mse);

    if let Some(ref name) = opts.output_image {
        save_image(&reconstruction, name)?;
    }

    Ok(())
}
