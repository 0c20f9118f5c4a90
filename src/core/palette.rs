use crate::core::classify::NUM_CLASSES;
use crate::types::ClassMap;
use ndarray::{Array3, Axis, Zip};
use serde::Serialize;

/// RGBA color entry (0-255 per channel)
pub type Rgba = [u8; 4];

/// Fully transparent entry used for nodata and unused palette slots
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Scattering classes of the 9-zone H/Alpha plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScatteringClass {
    Nodata = 0,
    Dihedral = 1,
    ForestryDoubleBounce = 2,
    BranchCrown = 3,
    Dipole = 4,
    Vegetation = 5,
    AnisotropicNeedles = 6,
    BraggSurface = 7,
    SurfaceRoughness = 8,
    NoFeasibleRegion = 9,
}

impl ScatteringClass {
    pub const ALL: [ScatteringClass; NUM_CLASSES] = [
        ScatteringClass::Nodata,
        ScatteringClass::Dihedral,
        ScatteringClass::ForestryDoubleBounce,
        ScatteringClass::BranchCrown,
        ScatteringClass::Dipole,
        ScatteringClass::Vegetation,
        ScatteringClass::AnisotropicNeedles,
        ScatteringClass::BraggSurface,
        ScatteringClass::SurfaceRoughness,
        ScatteringClass::NoFeasibleRegion,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn color(self) -> Rgba {
        match self {
            ScatteringClass::Nodata => TRANSPARENT,
            ScatteringClass::Dihedral => [255, 165, 0, 255],
            ScatteringClass::ForestryDoubleBounce => [204, 0, 0, 255],
            ScatteringClass::BranchCrown => [128, 0, 64, 255],
            ScatteringClass::Dipole => [255, 204, 0, 255],
            ScatteringClass::Vegetation => [0, 255, 0, 255],
            ScatteringClass::AnisotropicNeedles => [0, 100, 0, 255],
            ScatteringClass::BraggSurface => [0, 204, 204, 255],
            ScatteringClass::SurfaceRoughness => [0, 51, 153, 255],
            ScatteringClass::NoFeasibleRegion => [153, 51, 153, 255],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ScatteringClass::Nodata => "nodata / unclassified",
            ScatteringClass::Dihedral => "Dihedral scatterer (orange) [Z1]",
            ScatteringClass::ForestryDoubleBounce => "Forestry / double-bounce (red) [Z2]",
            ScatteringClass::BranchCrown => "Branch / crown structure (maroon) [Z3]",
            ScatteringClass::Dipole => "Dipole (yellow) [Z4]",
            ScatteringClass::Vegetation => "Vegetation (lime green) [Z5]",
            ScatteringClass::AnisotropicNeedles => "Cloud of anisotropic needles (dark green) [Z6]",
            ScatteringClass::BraggSurface => "Bragg surface (cyan) [Z7]",
            ScatteringClass::SurfaceRoughness => "Surface roughness / propagation (dark blue) [Z8]",
            ScatteringClass::NoFeasibleRegion => "No feasible region / ambiguous (violet) [Z9]",
        }
    }

    /// Description prefixed with the class ID, as stored in raster metadata
    pub fn label(self) -> String {
        format!("{}: {}", self.id(), self.description())
    }
}

/// The fixed 10-entry class color table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    entries: [Rgba; NUM_CLASSES],
}

impl ColorTable {
    /// ESA-style colors for zones Z1..Z9, class 0 transparent
    pub fn esa() -> Self {
        let mut entries = [TRANSPARENT; NUM_CLASSES];
        for class in ScatteringClass::ALL {
            entries[class.id() as usize] = class.color();
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[Rgba; NUM_CLASSES] {
        &self.entries
    }

    pub fn get(&self, class_id: u8) -> Option<Rgba> {
        self.entries.get(class_id as usize).copied()
    }

    /// Expand to a full 8-bit palette; slots past the class table are transparent
    pub fn to_palette_256(&self) -> Vec<Rgba> {
        let mut palette = vec![TRANSPARENT; 256];
        palette[..NUM_CLASSES].copy_from_slice(&self.entries);
        palette
    }

    /// Render a class map to an RGB image (rows x cols x 3)
    ///
    /// Alpha is dropped, so nodata renders black. Unknown IDs render black too.
    pub fn render_rgb(&self, classes: &ClassMap) -> Array3<u8> {
        let (rows, cols) = classes.dim();
        let mut rgb = Array3::<u8>::zeros((rows, cols, 3));

        Zip::from(rgb.lanes_mut(Axis(2)))
            .and(classes)
            .for_each(|mut pixel, &class_id| {
                let [r, g, b, _] = self.get(class_id).unwrap_or(TRANSPARENT);
                pixel[0] = r;
                pixel[1] = g;
                pixel[2] = b;
            });

        rgb
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::esa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_color_table_entries() {
        let table = ColorTable::esa();
        assert_eq!(table.get(0), Some([0, 0, 0, 0]));
        assert_eq!(table.get(1), Some([255, 165, 0, 255]));
        assert_eq!(table.get(2), Some([204, 0, 0, 255]));
        assert_eq!(table.get(3), Some([128, 0, 64, 255]));
        assert_eq!(table.get(4), Some([255, 204, 0, 255]));
        assert_eq!(table.get(5), Some([0, 255, 0, 255]));
        assert_eq!(table.get(6), Some([0, 100, 0, 255]));
        assert_eq!(table.get(7), Some([0, 204, 204, 255]));
        assert_eq!(table.get(8), Some([0, 51, 153, 255]));
        assert_eq!(table.get(9), Some([153, 51, 153, 255]));
        assert_eq!(table.get(10), None);
        assert_eq!(table, ColorTable::default());
    }

    #[test]
    fn test_palette_256_padding() {
        let palette = ColorTable::esa().to_palette_256();
        assert_eq!(palette.len(), 256);
        assert_eq!(palette[5], [0, 255, 0, 255]);
        assert!(palette[10..].iter().all(|&c| c == TRANSPARENT));
    }

    #[test]
    fn test_class_ids_round_trip() {
        for id in 0..NUM_CLASSES as u8 {
            assert_eq!(ScatteringClass::from_id(id).map(|c| c.id()), Some(id));
        }
        assert_eq!(ScatteringClass::from_id(10), None);
        assert_eq!(ScatteringClass::Vegetation.label(), "5: Vegetation (lime green) [Z5]");
    }

    #[test]
    fn test_render_rgb() {
        let classes = array![[0u8, 7], [3, 42]];
        let rgb = ColorTable::esa().render_rgb(&classes);
        assert_eq!(rgb.dim(), (2, 2, 3));
        assert_eq!(rgb.slice(ndarray::s![0, 0, ..]).to_vec(), vec![0, 0, 0]);
        assert_eq!(rgb.slice(ndarray::s![0, 1, ..]).to_vec(), vec![0, 204, 204]);
        assert_eq!(rgb.slice(ndarray::s![1, 0, ..]).to_vec(), vec![128, 0, 64]);
        assert_eq!(rgb.slice(ndarray::s![1, 1, ..]).to_vec(), vec![0, 0, 0]);
    }
}
