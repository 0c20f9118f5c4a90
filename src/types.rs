use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Real-valued sample type for entropy and alpha rasters
pub type HaReal = f32;

/// 2D real raster (rows x cols)
pub type HaRealImage = Array2<HaReal>;

/// 2D class-ID raster, values 0..=9
pub type ClassMap = Array2<u8>;

/// Per-pixel nodata mask (true = invalid)
pub type NodataMask = Array2<bool>;

/// Geospatial transformation parameters (GDAL affine order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from a GDAL-ordered coefficient array
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    /// Coefficients in GDAL order
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }
}

/// Opaque georeferencing carried from input to output unmodified
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoReference {
    pub geo_transform: Option<GeoTransform>,
    /// Projection as WKT
    pub projection: Option<String>,
}

impl GeoReference {
    pub fn is_empty(&self) -> bool {
        self.geo_transform.is_none() && self.projection.is_none()
    }

    /// Fill missing fields from `other`
    pub fn or(self, other: &GeoReference) -> GeoReference {
        GeoReference {
            geo_transform: self.geo_transform.or(other.geo_transform),
            projection: self.projection.or_else(|| other.projection.clone()),
        }
    }
}

/// A single-band raster loaded into memory
#[derive(Debug, Clone)]
pub struct RasterGrid {
    pub data: HaRealImage,
    /// Sentinel marking pixels without a valid measurement
    pub nodata: Option<f64>,
    pub georef: GeoReference,
}

impl RasterGrid {
    pub fn new(data: HaRealImage) -> Self {
        Self {
            data,
            nodata: None,
            georef: GeoReference::default(),
        }
    }

    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn with_georef(mut self, georef: GeoReference) -> Self {
        self.georef = georef;
        self
    }

    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// True when `value` is the declared sentinel, or NaN when no sentinel is declared
    ///
    /// The sentinel is narrowed to the sample type before comparing, since
    /// samples are stored as `f32`.
    pub fn is_nodata(&self, value: HaReal) -> bool {
        match self.nodata {
            Some(sentinel) if sentinel.is_nan() => value.is_nan(),
            Some(sentinel) => value == sentinel as HaReal,
            None => value.is_nan(),
        }
    }
}

/// Error types for H/Alpha classification
#[derive(Debug, thiserror::Error)]
pub enum HaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid threshold pair {name}: low ({low}) must be strictly less than high ({high})")]
    InvalidThreshold { name: String, low: f32, high: f32 },

    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),
}

/// Result type for H/Alpha operations
pub type HaResult<T> = Result<T, HaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodata_sentinel() {
        let grid = RasterGrid::new(Array2::zeros((2, 2))).with_nodata(Some(-9999.0));
        assert!(grid.is_nodata(-9999.0));
        assert!(!grid.is_nodata(0.0));
        // NaN is not the sentinel; the classifier rejects it separately
        assert!(!grid.is_nodata(f32::NAN));

        // Non-integer sentinels match the stored f32 sample
        let fractional = RasterGrid::new(Array2::zeros((1, 1))).with_nodata(Some(-9999.9));
        assert!(fractional.is_nodata(-9999.9f32));
        assert!(!fractional.is_nodata(-9999.0));

        let no_sentinel = RasterGrid::new(Array2::zeros((2, 2)));
        assert!(no_sentinel.is_nodata(f32::NAN));
        assert!(!no_sentinel.is_nodata(-9999.0));
    }

    #[test]
    fn test_georef_fallback() {
        let h = GeoReference {
            geo_transform: None,
            projection: Some("WKT_H".to_string()),
        };
        let alpha = GeoReference {
            geo_transform: Some(GeoTransform::from_gdal([10.0, 1.0, 0.0, 20.0, 0.0, -1.0])),
            projection: Some("WKT_A".to_string()),
        };

        let merged = h.or(&alpha);
        assert_eq!(merged.projection.as_deref(), Some("WKT_H"));
        assert_eq!(merged.geo_transform.map(|g| g.top_left_x), Some(10.0));
        assert!(GeoReference::default().is_empty());
    }
}
