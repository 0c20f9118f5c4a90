//! Core H/Alpha classification modules

pub mod alpha_units;
pub mod classify;
pub mod palette;
pub mod thresholds;

// Re-export main types
pub use alpha_units::{convert_alpha_to_degrees, detect_alpha_units, AlphaUnits};
pub use classify::{
    build_nodata_mask, zone_class, ClassStatistics, HAlphaClassifier, CLASS_TABLE, NODATA_CLASS,
    NUM_CLASSES,
};
pub use palette::{ColorTable, Rgba, ScatteringClass};
pub use thresholds::{Bin, ThresholdConfig, ThresholdPair, ThresholdSet};
