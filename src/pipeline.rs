//! End-to-end classification run: load, classify, write

use crate::core::{
    build_nodata_mask, convert_alpha_to_degrees, AlphaUnits, ClassStatistics, ColorTable,
    HAlphaClassifier, ThresholdSet,
};
use crate::io::{ClassMapWriter, ClassificationReport, OutputFormat, RasterReader, RawRasterSpec};
use crate::types::{ClassMap, HaError, HaResult};
use std::path::PathBuf;

/// Inputs and options for one classification run
#[derive(Debug, Clone)]
pub struct ClassificationJob {
    pub h_file: PathBuf,
    pub alpha_file: PathBuf,
    pub output: PathBuf,
    /// Layout used when an input is not GDAL-readable
    pub raw: Option<RawRasterSpec>,
    pub thresholds: ThresholdSet,
    pub alpha_units: AlphaUnits,
    pub write_quicklook: bool,
    pub write_report: bool,
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub classes: ClassMap,
    pub statistics: ClassStatistics,
    pub output: PathBuf,
    pub quicklook: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

impl ClassificationJob {
    pub fn new<P: Into<PathBuf>>(h_file: P, alpha_file: P, output: P) -> Self {
        Self {
            h_file: h_file.into(),
            alpha_file: alpha_file.into(),
            output: output.into(),
            raw: None,
            thresholds: ThresholdSet::default(),
            alpha_units: AlphaUnits::Auto,
            write_quicklook: true,
            write_report: false,
        }
    }

    /// Run the job
    ///
    /// Nothing is written when validation, loading or classification fails.
    /// The class map is written before the quicklook and report, so a failed
    /// sidecar write leaves the class map on disk.
    pub fn run(&self) -> HaResult<JobOutcome> {
        log::info!("Starting H/Alpha 9-zone classification");
        log::info!("Thresholds used: {}", self.thresholds);

        // Reject an unwritable output before any raster is read
        let format = OutputFormat::from_path(&self.output)?;
        if format == OutputFormat::GeoTiff && !cfg!(feature = "gdal") {
            return Err(HaError::UnsupportedOutput(format!(
                "{}: GeoTIFF output requires the `gdal` feature",
                self.output.display()
            )));
        }

        let h = RasterReader::load(&self.h_file, self.raw.as_ref())?;
        let alpha = RasterReader::load(&self.alpha_file, self.raw.as_ref())?;

        if h.dim() != alpha.dim() {
            return Err(HaError::ShapeMismatch {
                expected: h.dim(),
                found: alpha.dim(),
            });
        }

        let georef = h.georef.clone().or(&alpha.georef);
        let mask = build_nodata_mask(&h, &alpha)?;
        let alpha_deg = convert_alpha_to_degrees(alpha.data, self.alpha_units);

        let classifier = HAlphaClassifier::new(self.thresholds);
        let classes = classifier.classify(&h.data, &alpha_deg, Some(&mask))?;

        let statistics = ClassStatistics::from_class_map(&classes);
        statistics.log_summary();

        let table = ColorTable::esa();
        ClassMapWriter::write(&self.output, &classes, &georef, &table)?;

        let quicklook = if self.write_quicklook {
            let path = ClassMapWriter::quicklook_path(&self.output);
            ClassMapWriter::write_quicklook_png(&path, &classes, &table)?;
            Some(path)
        } else {
            None
        };

        let report = if self.write_report {
            let path = ClassificationReport::default_path(&self.output);
            ClassificationReport::new(
                &self.h_file,
                &self.alpha_file,
                &self.output,
                classes.dim(),
                &self.thresholds,
                &statistics,
            )
            .save(&path)?;
            Some(path)
        } else {
            None
        };

        log::info!("Classification complete: {}", self.output.display());
        Ok(JobOutcome {
            classes,
            statistics,
            output: self.output.clone(),
            quicklook,
            report,
        })
    }
}
