use crate::core::thresholds::{Bin, ThresholdSet};
use crate::types::{ClassMap, HaError, HaReal, HaResult, NodataMask, RasterGrid};
use ndarray::{Array2, ArrayView2, Zip};
use serde::Serialize;

/// Class ID written for nodata or unclassified pixels
pub const NODATA_CLASS: u8 = 0;

/// Number of class IDs including nodata
pub const NUM_CLASSES: usize = 10;

/// Fixed zone numbering, indexed `[h_bin][alpha_bin]` with bins ordered Low, Med, High.
///
/// This is an enumeration, not a formula.
pub const CLASS_TABLE: [[u8; 3]; 3] = [
    // Low H:  Low A, Med A, High A
    [7, 4, 1],
    // Med H
    [8, 5, 2],
    // High H
    [9, 6, 3],
];

/// Look up the class for an (H bin, Alpha bin) pair
#[inline]
pub fn zone_class(h_bin: Bin, alpha_bin: Bin) -> u8 {
    CLASS_TABLE[h_bin.index()][alpha_bin.index()]
}

/// Build the validity mask for two input grids (true = nodata)
///
/// Each grid contributes its own sentinel, or NaN when it declares none.
pub fn build_nodata_mask(h: &RasterGrid, alpha: &RasterGrid) -> HaResult<NodataMask> {
    check_shape(h.dim(), alpha.dim())?;

    let mask = Zip::from(&h.data)
        .and(&alpha.data)
        .map_collect(|&h_val, &a_val| h.is_nodata(h_val) || alpha.is_nodata(a_val));

    log::debug!(
        "Nodata mask: {} of {} pixels flagged",
        mask.iter().filter(|&&m| m).count(),
        mask.len()
    );
    Ok(mask)
}

fn check_shape(expected: (usize, usize), found: (usize, usize)) -> HaResult<()> {
    if expected != found {
        return Err(HaError::ShapeMismatch { expected, found });
    }
    Ok(())
}

/// H/Alpha 9-zone classifier with entropy-dependent alpha thresholds
#[derive(Debug, Clone, Default)]
pub struct HAlphaClassifier {
    thresholds: ThresholdSet,
}

impl HAlphaClassifier {
    /// Create a classifier from a validated threshold set
    pub fn new(thresholds: ThresholdSet) -> Self {
        Self { thresholds }
    }

    /// Create a classifier with the default thresholds
    pub fn standard() -> Self {
        Self::new(ThresholdSet::default())
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Classify a single sample pair
    ///
    /// NaN or infinite input in either value yields the nodata class.
    #[inline]
    pub fn classify_pixel(&self, h: HaReal, alpha: HaReal) -> u8 {
        if !h.is_finite() || !alpha.is_finite() {
            return NODATA_CLASS;
        }
        let h_bin = self.thresholds.h_bin(h);
        let alpha_bin = self.thresholds.alpha_bin(alpha, h_bin);
        zone_class(h_bin, alpha_bin)
    }

    /// Classify whole grids
    ///
    /// `nodata_mask` marks pixels to force to class 0; NaN/Inf samples are
    /// always class 0 regardless of the mask.
    pub fn classify(
        &self,
        h: &Array2<HaReal>,
        alpha: &Array2<HaReal>,
        nodata_mask: Option<&NodataMask>,
    ) -> HaResult<ClassMap> {
        self.classify_view(h.view(), alpha.view(), nodata_mask.map(|m| m.view()))
    }

    /// Classify two raster grids, deriving the mask from their sentinels
    pub fn classify_grids(&self, h: &RasterGrid, alpha: &RasterGrid) -> HaResult<ClassMap> {
        let mask = build_nodata_mask(h, alpha)?;
        self.classify(&h.data, &alpha.data, Some(&mask))
    }

    pub fn classify_view(
        &self,
        h: ArrayView2<'_, HaReal>,
        alpha: ArrayView2<'_, HaReal>,
        nodata_mask: Option<ArrayView2<'_, bool>>,
    ) -> HaResult<ClassMap> {
        check_shape(h.dim(), alpha.dim())?;
        if let Some(mask) = &nodata_mask {
            check_shape(h.dim(), mask.dim())?;
        }

        let (rows, cols) = h.dim();
        log::info!("Classifying {}x{} pixels into H/Alpha zones", rows, cols);
        log::debug!("Thresholds: {}", self.thresholds);

        let all_valid;
        let mask = match nodata_mask {
            Some(mask) => mask.reborrow(),
            None => {
                all_valid = Array2::from_elem(h.dim(), false);
                all_valid.view()
            }
        };

        let zip = Zip::from(&h).and(&alpha).and(&mask);

        #[cfg(feature = "parallel")]
        log::debug!("Parallel classification on {} threads", rayon::current_num_threads());

        #[cfg(feature = "parallel")]
        let classes = zip.par_map_collect(|&h_val, &a_val, &masked| {
            if masked {
                NODATA_CLASS
            } else {
                self.classify_pixel(h_val, a_val)
            }
        });

        #[cfg(not(feature = "parallel"))]
        let classes = zip.map_collect(|&h_val, &a_val, &masked| {
            if masked {
                NODATA_CLASS
            } else {
                self.classify_pixel(h_val, a_val)
            }
        });

        Ok(classes)
    }

    /// Per-pixel reference path; must produce output identical to `classify`
    pub fn classify_sequential(
        &self,
        h: &Array2<HaReal>,
        alpha: &Array2<HaReal>,
        nodata_mask: Option<&NodataMask>,
    ) -> HaResult<ClassMap> {
        check_shape(h.dim(), alpha.dim())?;
        if let Some(mask) = nodata_mask {
            check_shape(h.dim(), mask.dim())?;
        }

        let (rows, cols) = h.dim();
        let mut classes = Array2::<u8>::zeros((rows, cols));

        for i in 0..rows {
            for j in 0..cols {
                let masked = nodata_mask.map_or(false, |m| m[[i, j]]);
                classes[[i, j]] = if masked {
                    NODATA_CLASS
                } else {
                    self.classify_pixel(h[[i, j]], alpha[[i, j]])
                };
            }
        }

        Ok(classes)
    }
}

/// Pixel counts per class ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassStatistics {
    pub counts: [u64; NUM_CLASSES],
}

impl ClassStatistics {
    pub fn from_class_map(classes: &ClassMap) -> Self {
        let mut counts = [0u64; NUM_CLASSES];
        for &c in classes.iter() {
            // Out-of-range IDs cannot come out of the classifier
            if let Some(slot) = counts.get_mut(c as usize) {
                *slot += 1;
            }
        }
        Self { counts }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn classified(&self) -> u64 {
        self.total() - self.counts[NODATA_CLASS as usize]
    }

    /// Fraction of all pixels in `class_id`
    pub fn fraction(&self, class_id: u8) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(class_id as usize).copied().unwrap_or(0) as f64 / total as f64
    }

    pub fn log_summary(&self) {
        log::info!(
            "Classified {} of {} pixels ({} nodata)",
            self.classified(),
            self.total(),
            self.counts[NODATA_CLASS as usize]
        );
        for (id, count) in self.counts.iter().enumerate() {
            log::debug!("  class {}: {} ({:.2}%)", id, count, self.fraction(id as u8) * 100.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_reference_scenarios() {
        let classifier = HAlphaClassifier::standard();
        assert_eq!(classifier.classify_pixel(0.3, 60.0), 1);
        assert_eq!(classifier.classify_pixel(0.7, 45.0), 5);
        assert_eq!(classifier.classify_pixel(0.95, 30.0), 9);
        // On the lower edges: Med H, then 52.5 >= 50.0 in the Med-H pair
        assert_eq!(classifier.classify_pixel(0.5, 52.5), 2);
        assert_eq!(classifier.classify_pixel(f32::NAN, 40.0), 0);
    }

    #[test]
    fn test_class_table_layout() {
        assert_eq!(zone_class(Bin::Low, Bin::High), 1);
        assert_eq!(zone_class(Bin::Med, Bin::High), 2);
        assert_eq!(zone_class(Bin::High, Bin::High), 3);
        assert_eq!(zone_class(Bin::Low, Bin::Med), 4);
        assert_eq!(zone_class(Bin::Med, Bin::Med), 5);
        assert_eq!(zone_class(Bin::High, Bin::Med), 6);
        assert_eq!(zone_class(Bin::Low, Bin::Low), 7);
        assert_eq!(zone_class(Bin::Med, Bin::Low), 8);
        assert_eq!(zone_class(Bin::High, Bin::Low), 9);
    }

    #[test]
    fn test_non_finite_inputs() {
        let classifier = HAlphaClassifier::standard();
        assert_eq!(classifier.classify_pixel(0.3, f32::NAN), 0);
        assert_eq!(classifier.classify_pixel(f32::INFINITY, 60.0), 0);
        assert_eq!(classifier.classify_pixel(0.3, f32::NEG_INFINITY), 0);
    }

    #[test]
    fn test_out_of_range_values_are_binned() {
        let classifier = HAlphaClassifier::standard();
        // H slightly above 1 from numerical noise stays High H
        assert_eq!(classifier.classify_pixel(1.02, 30.0), 9);
        // Negative H is Low H
        assert_eq!(classifier.classify_pixel(-0.01, 30.0), 7);
        // Alpha beyond 90 is High A
        assert_eq!(classifier.classify_pixel(0.7, 91.0), 2);
    }

    #[test]
    fn test_grid_with_mask() {
        let classifier = HAlphaClassifier::standard();
        let h = array![[0.3, 0.7], [0.95, 0.5]];
        let alpha = array![[60.0, 45.0], [30.0, 52.5]];
        let mask = array![[false, true], [false, false]];

        let classes = classifier.classify(&h, &alpha, Some(&mask)).unwrap();
        assert_eq!(classes, array![[1u8, 0], [9, 2]]);

        let unmasked = classifier.classify(&h, &alpha, None).unwrap();
        assert_eq!(unmasked, array![[1u8, 5], [9, 2]]);
    }

    #[test]
    fn test_classify_view_on_subviews() {
        let classifier = HAlphaClassifier::standard();
        let h = array![[0.3, 0.7, 0.0], [0.95, 0.5, 0.0]];
        let alpha = array![[60.0, 45.0, 0.0], [30.0, 52.5, 0.0]];
        let mask = array![[true, false, false], [false, false, false]];

        let h_view = h.slice(ndarray::s![.., ..2]);
        let alpha_view = alpha.slice(ndarray::s![.., ..2]);

        let unmasked = classifier.classify_view(h_view, alpha_view, None).unwrap();
        assert_eq!(unmasked, array![[1u8, 5], [9, 2]]);

        let masked = classifier
            .classify_view(h_view, alpha_view, Some(mask.slice(ndarray::s![.., ..2])))
            .unwrap();
        assert_eq!(masked, array![[0u8, 5], [9, 2]]);
    }

    #[test]
    fn test_shape_mismatch() {
        let classifier = HAlphaClassifier::standard();
        let h = Array2::<f32>::zeros((4, 4));
        let alpha = Array2::<f32>::zeros((4, 5));

        match classifier.classify(&h, &alpha, None) {
            Err(HaError::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, (4, 4));
                assert_eq!(found, (4, 5));
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }

        let mask = Array2::from_elem((3, 4), false);
        assert!(classifier
            .classify(&h, &Array2::zeros((4, 4)), Some(&mask))
            .is_err());
    }

    #[test]
    fn test_build_nodata_mask() {
        let h = RasterGrid::new(array![[-9999.0, 0.5], [f32::NAN, 0.2]]).with_nodata(Some(-9999.0));
        let alpha = RasterGrid::new(array![[40.0, f32::NAN], [40.0, 40.0]]);

        let mask = build_nodata_mask(&h, &alpha).unwrap();
        assert_eq!(mask, array![[true, true], [false, false]]);

        // NaN H is not the sentinel but is still rejected by the classifier
        let classes = HAlphaClassifier::standard().classify_grids(&h, &alpha).unwrap();
        assert_eq!(classes, array![[0u8, 0], [0, 7]]);
    }

    #[test]
    fn test_statistics() {
        let classes = array![[0u8, 1, 1], [5, 9, 0]];
        let stats = ClassStatistics::from_class_map(&classes);
        assert_eq!(stats.total(), 6);
        assert_eq!(stats.classified(), 4);
        assert_eq!(stats.counts[1], 2);
        assert!((stats.fraction(0) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.fraction(3), 0.0);
    }
}
