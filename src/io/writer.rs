use crate::core::palette::ColorTable;
use crate::types::{ClassMap, GeoReference, HaError, HaResult};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[cfg(feature = "gdal")]
use crate::core::palette::ScatteringClass;
#[cfg(feature = "gdal")]
use gdal::raster::{
    Buffer, ColorEntry, ColorInterpretation, ColorTable as GdalColorTable, PaletteInterpretation,
    RasterCreationOption,
};
#[cfg(feature = "gdal")]
use gdal::{DriverManager, Metadata};

/// Band description stored with paletted class maps
pub const CLASS_MAP_DESCRIPTION: &str = "H/alpha 9-zone class map (0=nodata, 1..9 classes)";

/// Output formats for class maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    GeoTiff,
    Png,
}

impl OutputFormat {
    /// Choose a format from the file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> HaResult<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("tif") | Some("tiff") => Ok(OutputFormat::GeoTiff),
            Some("png") => Ok(OutputFormat::Png),
            _ => Err(HaError::UnsupportedOutput(format!(
                "{} (expected .tif, .tiff or .png)",
                path.as_ref().display()
            ))),
        }
    }
}

/// Writer for paletted class maps and quicklooks
pub struct ClassMapWriter;

impl ClassMapWriter {
    /// Write a paletted class map, format chosen by extension
    pub fn write<P: AsRef<Path>>(
        path: P,
        classes: &ClassMap,
        georef: &GeoReference,
        table: &ColorTable,
    ) -> HaResult<()> {
        match OutputFormat::from_path(path.as_ref())? {
            OutputFormat::GeoTiff => Self::write_geotiff_output(path.as_ref(), classes, georef, table),
            OutputFormat::Png => {
                if !georef.is_empty() {
                    log::warn!("PNG output cannot carry georeferencing; it will be dropped");
                }
                Self::write_paletted_png(path, classes, table)
            }
        }
    }

    #[cfg(feature = "gdal")]
    fn write_geotiff_output(
        path: &Path,
        classes: &ClassMap,
        georef: &GeoReference,
        table: &ColorTable,
    ) -> HaResult<()> {
        Self::write_paletted_geotiff(path, classes, georef, table)
    }

    #[cfg(not(feature = "gdal"))]
    fn write_geotiff_output(
        path: &Path,
        _classes: &ClassMap,
        _georef: &GeoReference,
        _table: &ColorTable,
    ) -> HaResult<()> {
        Err(HaError::UnsupportedOutput(format!(
            "{}: GeoTIFF output requires the `gdal` feature",
            path.display()
        )))
    }

    /// Write a single-band byte GeoTIFF with an embedded 256-entry color table
    ///
    /// Entries 10..255 are transparent, nodata is 0, and class descriptions
    /// are stored as `CLASS_0`..`CLASS_9` dataset metadata.
    #[cfg(feature = "gdal")]
    pub fn write_paletted_geotiff<P: AsRef<Path>>(
        path: P,
        classes: &ClassMap,
        georef: &GeoReference,
        table: &ColorTable,
    ) -> HaResult<()> {
        log::info!("Writing paletted GeoTIFF: {}", path.as_ref().display());

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let (height, width) = classes.dim();
        let options = [
            RasterCreationOption { key: "COMPRESS", value: "LZW" },
            RasterCreationOption { key: "TILED", value: "YES" },
        ];

        let mut dataset = driver.create_with_band_type_with_options::<u8, _>(
            path.as_ref(),
            width as isize,
            height as isize,
            1,
            &options,
        )?;

        if let Some(transform) = &georef.geo_transform {
            dataset.set_geo_transform(&transform.to_gdal())?;
        }
        if let Some(wkt) = &georef.projection {
            dataset.set_projection(wkt)?;
        }

        for class in ScatteringClass::ALL {
            dataset.set_metadata_item(&format!("CLASS_{}", class.id()), &class.label(), "")?;
        }

        let mut rasterband = dataset.rasterband(1)?;
        let flat_data: Vec<u8> = classes.iter().copied().collect();
        let buffer = Buffer::new((width, height), flat_data);
        rasterband.write((0, 0), (width, height), &buffer)?;
        rasterband.set_no_data_value(Some(0.0))?;

        let mut color_table = GdalColorTable::new(PaletteInterpretation::Rgba);
        for (idx, [r, g, b, a]) in table.to_palette_256().into_iter().enumerate() {
            color_table.set_color_entry(
                idx as u16,
                &ColorEntry::rgba(r as i16, g as i16, b as i16, a as i16),
            );
        }
        rasterband.set_color_table(&color_table);
        rasterband.set_color_interpretation(ColorInterpretation::PaletteIndex)?;
        rasterband.set_description(CLASS_MAP_DESCRIPTION)?;

        log::info!("Paletted GeoTIFF saved ({}x{})", width, height);
        Ok(())
    }

    /// Write an 8-bit indexed PNG with PLTE and tRNS from the color table
    pub fn write_paletted_png<P: AsRef<Path>>(
        path: P,
        classes: &ClassMap,
        table: &ColorTable,
    ) -> HaResult<()> {
        log::info!("Writing paletted PNG: {}", path.as_ref().display());

        let palette = table.to_palette_256();
        let plte: Vec<u8> = palette.iter().flat_map(|&[r, g, b, _]| [r, g, b]).collect();
        let trns: Vec<u8> = palette.iter().map(|&[_, _, _, a]| a).collect();
        let data: Vec<u8> = classes.iter().copied().collect();

        let (width, height) = png_size(classes)?;
        let file = File::create(path.as_ref())?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(plte);
        encoder.set_trns(trns);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;
        Ok(())
    }

    /// Write an RGB quicklook rendered through the class palette
    pub fn write_quicklook_png<P: AsRef<Path>>(
        path: P,
        classes: &ClassMap,
        table: &ColorTable,
    ) -> HaResult<()> {
        log::info!("Writing quicklook PNG: {}", path.as_ref().display());

        let rgb = table.render_rgb(classes);
        let data: Vec<u8> = rgb.iter().copied().collect();

        let (width, height) = png_size(classes)?;
        let file = File::create(path.as_ref())?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;
        Ok(())
    }

    /// `<dir>/<stem>_ql.png` next to the class map
    pub fn quicklook_path<P: AsRef<Path>>(output: P) -> PathBuf {
        sibling_path(output.as_ref(), "_ql.png")
    }
}

/// Path next to `output` with its extension replaced by `suffix`
pub(crate) fn sibling_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ha9".to_string());
    output.with_file_name(format!("{}{}", stem, suffix))
}

fn png_size(classes: &ClassMap) -> HaResult<(u32, u32)> {
    let (rows, cols) = classes.dim();
    if rows == 0 || cols == 0 {
        return Err(HaError::Processing("Cannot encode an empty class map".to_string()));
    }
    let width = u32::try_from(cols)
        .map_err(|_| HaError::Processing(format!("Width {} too large for PNG", cols)))?;
    let height = u32::try_from(rows)
        .map_err(|_| HaError::Processing(format!("Height {} too large for PNG", rows)))?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_extension() {
        assert_eq!(OutputFormat::from_path("ha9.tif").unwrap(), OutputFormat::GeoTiff);
        assert_eq!(OutputFormat::from_path("out/HA9.TIFF").unwrap(), OutputFormat::GeoTiff);
        assert_eq!(OutputFormat::from_path("ha9.png").unwrap(), OutputFormat::Png);
        assert!(matches!(
            OutputFormat::from_path("ha9.jpg"),
            Err(HaError::UnsupportedOutput(_))
        ));
        assert!(OutputFormat::from_path("ha9").is_err());
    }

    #[test]
    fn test_quicklook_path() {
        assert_eq!(
            ClassMapWriter::quicklook_path("/data/out/ha9.tif"),
            PathBuf::from("/data/out/ha9_ql.png")
        );
        assert_eq!(ClassMapWriter::quicklook_path("scene.v2.png"), PathBuf::from("scene.v2_ql.png"));
    }

    #[test]
    fn test_empty_class_map_rejected() {
        let empty = ClassMap::zeros((0, 4));
        assert!(png_size(&empty).is_err());
    }
}
