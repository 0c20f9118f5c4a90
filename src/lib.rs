//! ha9class: H/Alpha 9-zone classifier for polarimetric SAR
//!
//! Classifies co-registered Entropy (H) and mean Alpha rasters into the nine
//! Cloude-Pottier scattering zones using entropy-dependent alpha thresholds,
//! and writes the result as a paletted raster with a quicklook.
//!
//! S. Cloude and E. Pottier, "An entropy based classification scheme for land
//! applications of polarimetric SAR", IEEE TGRS 35(1), 1997, pp. 68-78.

pub mod types;
pub mod io;
pub mod core;
pub mod pipeline;

// Re-export main types and functions for easier access
pub use types::{
    ClassMap, GeoReference, GeoTransform, HaError, HaResult, HaRealImage, NodataMask, RasterGrid,
};

pub use crate::core::{
    AlphaUnits, Bin, ClassStatistics, ColorTable, HAlphaClassifier, ScatteringClass,
    ThresholdConfig, ThresholdSet,
};
pub use io::{ClassMapWriter, RasterReader, RawRasterSpec};
pub use pipeline::{ClassificationJob, JobOutcome};

#[cfg(feature = "python")]
mod python {
    use crate::core::{ColorTable, HAlphaClassifier, ThresholdSet};
    use crate::types::HaError;
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
    use pyo3::prelude::*;

    fn to_py_err(e: HaError) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e))
    }

    /// Classify H and alpha (degrees) arrays into zones 0..9
    #[pyfunction]
    #[pyo3(signature = (
        h,
        alpha,
        h_thresh = (0.5, 0.9),
        alpha_thresh_low_h = (42.5, 52.5),
        alpha_thresh_med_h = (40.0, 50.0),
        alpha_thresh_high_h = (45.0, 55.0),
        nodata_mask = None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn classify_9zones<'py>(
        py: Python<'py>,
        h: PyReadonlyArray2<'py, f32>,
        alpha: PyReadonlyArray2<'py, f32>,
        h_thresh: (f32, f32),
        alpha_thresh_low_h: (f32, f32),
        alpha_thresh_med_h: (f32, f32),
        alpha_thresh_high_h: (f32, f32),
        nodata_mask: Option<PyReadonlyArray2<'py, bool>>,
    ) -> PyResult<&'py PyArray2<u8>> {
        let thresholds = ThresholdSet::new(
            h_thresh,
            alpha_thresh_low_h,
            alpha_thresh_med_h,
            alpha_thresh_high_h,
        )
        .map_err(to_py_err)?;

        let classes = HAlphaClassifier::new(thresholds)
            .classify_view(
                h.as_array(),
                alpha.as_array(),
                nodata_mask.as_ref().map(|m| m.as_array()),
            )
            .map_err(to_py_err)?;

        Ok(classes.into_pyarray(py))
    }

    /// The 10 RGBA entries of the class color table
    #[pyfunction]
    fn color_table() -> Vec<(u8, u8, u8, u8)> {
        ColorTable::esa()
            .entries()
            .iter()
            .map(|&[r, g, b, a]| (r, g, b, a))
            .collect()
    }

    /// Python module definition
    #[pymodule]
    fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(classify_9zones, m)?)?;
        m.add_function(wrap_pyfunction!(color_table, m)?)?;
        Ok(())
    }
}
