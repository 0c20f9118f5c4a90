use crate::types::{HaError, HaResult, RasterGrid};
use ndarray::Array2;
use num_traits::ToPrimitive;
use std::path::Path;

#[cfg(feature = "gdal")]
use crate::types::{GeoReference, GeoTransform};
#[cfg(feature = "gdal")]
use gdal::Dataset;

/// Sample types accepted for raw binary rasters (numpy names)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDataType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl RawDataType {
    /// Bytes per sample
    pub fn size(self) -> usize {
        match self {
            RawDataType::UInt8 | RawDataType::Int8 => 1,
            RawDataType::UInt16 | RawDataType::Int16 => 2,
            RawDataType::UInt32 | RawDataType::Int32 | RawDataType::Float32 => 4,
            RawDataType::Float64 => 8,
        }
    }
}

impl std::str::FromStr for RawDataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uint8" | "u1" => Ok(RawDataType::UInt8),
            "int8" | "i1" => Ok(RawDataType::Int8),
            "uint16" | "u2" => Ok(RawDataType::UInt16),
            "int16" | "i2" => Ok(RawDataType::Int16),
            "uint32" | "u4" => Ok(RawDataType::UInt32),
            "int32" | "i4" => Ok(RawDataType::Int32),
            "float32" | "f4" => Ok(RawDataType::Float32),
            "float64" | "f8" => Ok(RawDataType::Float64),
            _ => Err(format!("Unsupported raw data type: {}", s)),
        }
    }
}

impl std::fmt::Display for RawDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RawDataType::UInt8 => "uint8",
            RawDataType::Int8 => "int8",
            RawDataType::UInt16 => "uint16",
            RawDataType::Int16 => "int16",
            RawDataType::UInt32 => "uint32",
            RawDataType::Int32 => "int32",
            RawDataType::Float32 => "float32",
            RawDataType::Float64 => "float64",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl std::str::FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "little" | "le" => Ok(ByteOrder::Little),
            "big" | "be" => Ok(ByteOrder::Big),
            _ => Err(format!("Invalid byte order: {}", s)),
        }
    }
}

/// Layout of a headerless binary raster
#[derive(Debug, Clone, PartialEq)]
pub struct RawRasterSpec {
    pub width: usize,
    pub height: usize,
    pub dtype: RawDataType,
    pub byte_order: ByteOrder,
    /// Sentinel to treat as nodata, raw files carry none of their own
    pub nodata: Option<f64>,
}

impl RawRasterSpec {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dtype: RawDataType::Float32,
            byte_order: ByteOrder::Little,
            nodata: None,
        }
    }

    pub fn element_count(&self) -> usize {
        self.width * self.height
    }
}

/// Reader for entropy and alpha rasters
pub struct RasterReader;

impl RasterReader {
    /// Load a raster, trying GDAL first and falling back to raw binary
    ///
    /// Raw reading needs `raw` to carry the grid shape.
    pub fn load<P: AsRef<Path>>(path: P, raw: Option<&RawRasterSpec>) -> HaResult<RasterGrid> {
        let path = path.as_ref();
        log::info!("Loading raster: {}", path.display());

        #[cfg(feature = "gdal")]
        {
            match Self::read_gdal(path) {
                Ok(grid) => return Ok(grid),
                Err(e) => log::debug!("GDAL could not open {}: {}", path.display(), e),
            }
        }

        match raw {
            Some(spec) => {
                let data = Self::read_raw_binary(path, spec)?;
                Ok(RasterGrid::new(data).with_nodata(spec.nodata))
            }
            None => Err(HaError::InvalidFormat(format!(
                "{}: width & height required for raw binary inputs",
                path.display()
            ))),
        }
    }

    /// Read the first band of a GDAL-readable raster as f32
    #[cfg(feature = "gdal")]
    pub fn read_gdal<P: AsRef<Path>>(path: P) -> HaResult<RasterGrid> {
        let dataset = Dataset::open(path.as_ref())?;
        let (width, height) = dataset.raster_size();
        log::debug!("Raster size: {}x{}", width, height);

        let rasterband = dataset.rasterband(1)?;
        let nodata = rasterband.no_data_value();
        let band_data = rasterband.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

        let data = Array2::from_shape_vec((height, width), band_data.data)
            .map_err(|e| HaError::Processing(format!("Failed to reshape raster data: {}", e)))?;

        let georef = GeoReference {
            geo_transform: dataset.geo_transform().ok().map(GeoTransform::from_gdal),
            projection: Some(dataset.projection()).filter(|wkt| !wkt.is_empty()),
        };
        log::debug!("Nodata: {:?}, georeference: {:?}", nodata, georef);

        Ok(RasterGrid::new(data).with_nodata(nodata).with_georef(georef))
    }

    /// Read a headerless binary raster into a (height, width) f32 array
    pub fn read_raw_binary<P: AsRef<Path>>(path: P, spec: &RawRasterSpec) -> HaResult<Array2<f32>> {
        log::debug!(
            "Reading raw binary {} as {}x{} {} ({:?} endian)",
            path.as_ref().display(),
            spec.width,
            spec.height,
            spec.dtype,
            spec.byte_order
        );

        let bytes = std::fs::read(path.as_ref())?;
        Self::decode_raw(&bytes, spec)
    }

    /// Decode raw bytes according to `spec`
    pub fn decode_raw(bytes: &[u8], spec: &RawRasterSpec) -> HaResult<Array2<f32>> {
        let count = spec.element_count();
        let available = bytes.len() / spec.dtype.size();
        if available < count {
            return Err(HaError::InvalidFormat(format!(
                "Raw file size mismatch: expected {} elements, got {}",
                count, available
            )));
        }
        if available > count || bytes.len() % spec.dtype.size() != 0 {
            log::warn!(
                "Raw input holds {} bytes, reading only the first {} elements",
                bytes.len(),
                count
            );
        }

        let bytes = &bytes[..count * spec.dtype.size()];
        let order = spec.byte_order;
        let samples = match spec.dtype {
            RawDataType::UInt8 => decode_samples(bytes, order, u8::from_le_bytes, u8::from_be_bytes),
            RawDataType::Int8 => decode_samples(bytes, order, i8::from_le_bytes, i8::from_be_bytes),
            RawDataType::UInt16 => decode_samples(bytes, order, u16::from_le_bytes, u16::from_be_bytes),
            RawDataType::Int16 => decode_samples(bytes, order, i16::from_le_bytes, i16::from_be_bytes),
            RawDataType::UInt32 => decode_samples(bytes, order, u32::from_le_bytes, u32::from_be_bytes),
            RawDataType::Int32 => decode_samples(bytes, order, i32::from_le_bytes, i32::from_be_bytes),
            RawDataType::Float32 => decode_samples(bytes, order, f32::from_le_bytes, f32::from_be_bytes),
            RawDataType::Float64 => decode_samples(bytes, order, f64::from_le_bytes, f64::from_be_bytes),
        };

        Array2::from_shape_vec((spec.height, spec.width), samples)
            .map_err(|e| HaError::Processing(format!("Failed to reshape raw data: {}", e)))
    }
}

fn decode_samples<T: ToPrimitive, const N: usize>(
    bytes: &[u8],
    order: ByteOrder,
    from_le: fn([u8; N]) -> T,
    from_be: fn([u8; N]) -> T,
) -> Vec<f32> {
    bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut raw = [0u8; N];
            raw.copy_from_slice(chunk);
            let value = match order {
                ByteOrder::Little => from_le(raw),
                ByteOrder::Big => from_be(raw),
            };
            value.to_f32().unwrap_or(f32::NAN)
        })
        .collect()
}
