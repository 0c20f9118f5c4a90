use crate::core::classify::ClassStatistics;
use crate::core::palette::ScatteringClass;
use crate::core::thresholds::{ThresholdConfig, ThresholdSet};
use crate::io::writer::sibling_path;
use crate::types::HaResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    pub class_id: u8,
    pub description: &'static str,
    pub pixels: u64,
    pub fraction: f64,
}

/// JSON sidecar describing one classification run
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub generated_at: DateTime<Utc>,
    pub h_file: PathBuf,
    pub alpha_file: PathBuf,
    pub output: PathBuf,
    /// (rows, cols)
    pub shape: (usize, usize),
    pub thresholds: ThresholdConfig,
    pub classes: Vec<ClassSummary>,
}

impl ClassificationReport {
    pub fn new(
        h_file: &Path,
        alpha_file: &Path,
        output: &Path,
        shape: (usize, usize),
        thresholds: &ThresholdSet,
        stats: &ClassStatistics,
    ) -> Self {
        let classes = ScatteringClass::ALL
            .iter()
            .map(|class| ClassSummary {
                class_id: class.id(),
                description: class.description(),
                pixels: stats.counts[class.id() as usize],
                fraction: stats.fraction(class.id()),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            h_file: h_file.to_path_buf(),
            alpha_file: alpha_file.to_path_buf(),
            output: output.to_path_buf(),
            shape,
            thresholds: thresholds.to_config(),
            classes,
        }
    }

    /// `<dir>/<stem>_report.json` next to the class map
    pub fn default_path<P: AsRef<Path>>(output: P) -> PathBuf {
        sibling_path(output.as_ref(), "_report.json")
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> HaResult<()> {
        log::info!("Writing classification report: {}", path.as_ref().display());
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_report_contents() {
        let stats = ClassStatistics::from_class_map(&array![[0u8, 5], [5, 9]]);
        let report = ClassificationReport::new(
            Path::new("H.tif"),
            Path::new("alpha.tif"),
            Path::new("out/ha9.tif"),
            (2, 2),
            &ThresholdSet::default(),
            &stats,
        );

        assert_eq!(report.classes.len(), 10);
        assert_eq!(report.classes[5].pixels, 2);
        assert_eq!(report.classes[5].fraction, 0.5);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["thresholds"]["h_thresh"][0].as_f64(), Some(0.5));
        assert_eq!(json["classes"][9]["description"], "No feasible region / ambiguous (violet) [Z9]");
        assert_eq!(
            ClassificationReport::default_path("out/ha9.tif"),
            PathBuf::from("out/ha9_report.json")
        );
    }
}
