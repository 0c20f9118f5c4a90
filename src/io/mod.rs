//! I/O modules for reading H/Alpha rasters and writing class maps

pub mod raster;
pub mod report;
pub mod writer;

pub use raster::{ByteOrder, RasterReader, RawDataType, RawRasterSpec};
pub use report::ClassificationReport;
pub use writer::{ClassMapWriter, OutputFormat};
