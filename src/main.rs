//! ha9class CLI - H/Alpha 9-zone classifier

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use ha9class::core::{AlphaUnits, ThresholdConfig};
use ha9class::io::{ByteOrder, RawDataType, RawRasterSpec};
use ha9class::ClassificationJob;

#[derive(Parser)]
#[command(name = "ha9class")]
#[command(version, about = "H/Alpha 9-zone classifier for polarimetric SAR", long_about = None)]
struct Cli {
    /// Input Entropy (H) file (GDAL-readable or raw binary)
    #[arg(long, alias = "h_file")]
    h_file: PathBuf,

    /// Input Alpha file (GDAL-readable or raw binary)
    #[arg(long, alias = "alpha_file")]
    alpha_file: PathBuf,

    /// Output paletted class map (.tif or .png)
    #[arg(long, default_value = "ha9.tif")]
    out: PathBuf,

    /// Raster width, required if inputs are raw binary
    #[arg(long, help_heading = "Raw Binary IO")]
    width: Option<usize>,

    /// Raster height, required if inputs are raw binary
    #[arg(long, help_heading = "Raw Binary IO")]
    height: Option<usize>,

    /// Raw binary data type
    #[arg(long, default_value = "float32", help_heading = "Raw Binary IO")]
    dtype: RawDataType,

    /// Raw binary byte order: little or big
    #[arg(long, default_value = "little", help_heading = "Raw Binary IO")]
    byteorder: ByteOrder,

    /// Nodata sentinel for raw binary inputs
    #[arg(long, allow_hyphen_values = true, help_heading = "Raw Binary IO")]
    nodata: Option<f64>,

    /// JSON file with threshold pairs; flags below override it
    #[arg(long, help_heading = "Classification Thresholds")]
    config: Option<PathBuf>,

    /// Entropy thresholds [default: 0.5 0.9]
    #[arg(long, alias = "h_thresh", num_args = 2, value_names = ["H_LOW", "H_HIGH"],
          allow_hyphen_values = true, help_heading = "Classification Thresholds")]
    h_thresh: Option<Vec<f32>>,

    /// Alpha thresholds for Low H bin [default: 42.5 52.5]
    #[arg(long, alias = "alpha_thresh_low_h", num_args = 2, value_names = ["A_L1", "A_H1"],
          allow_hyphen_values = true, help_heading = "Classification Thresholds")]
    alpha_thresh_low_h: Option<Vec<f32>>,

    /// Alpha thresholds for Med H bin [default: 40.0 50.0]
    #[arg(long, alias = "alpha_thresh_med_h", num_args = 2, value_names = ["A_L2", "A_H2"],
          allow_hyphen_values = true, help_heading = "Classification Thresholds")]
    alpha_thresh_med_h: Option<Vec<f32>>,

    /// Alpha thresholds for High H bin [default: 45.0 55.0]
    #[arg(long, alias = "alpha_thresh_high_h", num_args = 2, value_names = ["A_L3", "A_H3"],
          allow_hyphen_values = true, help_heading = "Classification Thresholds")]
    alpha_thresh_high_h: Option<Vec<f32>>,

    /// Alpha units: auto, degrees or radians
    #[arg(long, default_value = "auto")]
    alpha_units: AlphaUnits,

    /// Skip the quicklook PNG
    #[arg(long)]
    no_quicklook: bool,

    /// Write a JSON run report next to the output
    #[arg(long)]
    report: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn pair(values: &Option<Vec<f32>>) -> Option<(f32, f32)> {
    match values.as_deref() {
        Some([low, high]) => Some((*low, *high)),
        _ => None,
    }
}

impl Cli {
    fn threshold_config(&self) -> Result<ThresholdConfig> {
        let mut config = match &self.config {
            Some(path) => ThresholdConfig::from_json_file(path)
                .with_context(|| format!("Failed to read threshold config {}", path.display()))?,
            None => ThresholdConfig::default(),
        };

        if let Some(p) = pair(&self.h_thresh) {
            config.h_thresh = p;
        }
        if let Some(p) = pair(&self.alpha_thresh_low_h) {
            config.alpha_thresh_low_h = p;
        }
        if let Some(p) = pair(&self.alpha_thresh_med_h) {
            config.alpha_thresh_med_h = p;
        }
        if let Some(p) = pair(&self.alpha_thresh_high_h) {
            config.alpha_thresh_high_h = p;
        }
        Ok(config)
    }

    fn raw_spec(&self) -> Result<Option<RawRasterSpec>> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Ok(Some(RawRasterSpec {
                width,
                height,
                dtype: self.dtype,
                byte_order: self.byteorder,
                nodata: self.nodata,
            })),
            (None, None) => Ok(None),
            _ => bail!("--width and --height must be given together"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Thresholds are validated before any raster is touched
    let thresholds = cli
        .threshold_config()?
        .validate()
        .context("Invalid classification thresholds")?;

    let mut job = ClassificationJob::new(cli.h_file.clone(), cli.alpha_file.clone(), cli.out.clone());
    job.raw = cli.raw_spec()?;
    job.thresholds = thresholds;
    job.alpha_units = cli.alpha_units;
    job.write_quicklook = !cli.no_quicklook;
    job.write_report = cli.report;

    let outcome = job.run().context("Classification failed")?;

    log::info!("Wrote paletted class map: {}", outcome.output.display());
    if let Some(path) = &outcome.quicklook {
        log::info!("Wrote quicklook PNG: {}", path.display());
    }
    if let Some(path) = &outcome.report {
        log::info!("Wrote report: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::parse_from([
            "ha9class",
            "--h-file",
            "H.bin",
            "--alpha-file",
            "alpha.bin",
            "--h-thresh",
            "0.4",
            "0.8",
            "--width",
            "10",
            "--height",
            "5",
            "--dtype",
            "float64",
        ]);

        let config = cli.threshold_config().unwrap();
        assert_eq!(config.h_thresh, (0.4, 0.8));
        assert_eq!(config.alpha_thresh_low_h, (42.5, 52.5));

        let raw = cli.raw_spec().unwrap().unwrap();
        assert_eq!((raw.width, raw.height), (10, 5));
        assert_eq!(raw.dtype, RawDataType::Float64);
        assert_eq!(cli.out, PathBuf::from("ha9.tif"));
    }

    #[test]
    fn test_underscore_aliases_and_partial_shape() {
        let cli = Cli::parse_from([
            "ha9class",
            "--h_file",
            "H.bin",
            "--alpha_file",
            "alpha.bin",
            "--alpha_thresh_med_h",
            "50",
            "40",
            "--width",
            "10",
        ]);

        assert!(cli.raw_spec().is_err());
        // Parsed as given; ordering is rejected at validation
        let config = cli.threshold_config().unwrap();
        assert_eq!(config.alpha_thresh_med_h, (50.0, 40.0));
        assert!(config.validate().is_err());
    }
}
