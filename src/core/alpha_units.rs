use crate::types::HaRealImage;
use serde::{Deserialize, Serialize};

/// Largest alpha value still taken as radians during auto-detection (~pi/2)
pub const RADIANS_DETECTION_LIMIT: f32 = 1.7;

/// Angular units of an alpha raster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaUnits {
    /// Decide from the data range
    #[default]
    Auto,
    Degrees,
    Radians,
}

impl std::str::FromStr for AlphaUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(AlphaUnits::Auto),
            "degrees" | "deg" => Ok(AlphaUnits::Degrees),
            "radians" | "rad" => Ok(AlphaUnits::Radians),
            _ => Err(format!("Invalid alpha units: {}", s)),
        }
    }
}

/// Guess the units of an alpha raster from its largest finite sample
///
/// A grid with no finite samples is reported as degrees.
pub fn detect_alpha_units(alpha: &HaRealImage) -> AlphaUnits {
    let max = alpha
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);

    if max.is_finite() && max <= RADIANS_DETECTION_LIMIT {
        AlphaUnits::Radians
    } else {
        AlphaUnits::Degrees
    }
}

/// Return alpha in degrees, converting if the given (or detected) units are radians
pub fn convert_alpha_to_degrees(alpha: HaRealImage, units: AlphaUnits) -> HaRealImage {
    let resolved = match units {
        AlphaUnits::Auto => {
            let detected = detect_alpha_units(&alpha);
            log::info!("Detected alpha units: {:?}", detected);
            detected
        }
        other => other,
    };

    match resolved {
        AlphaUnits::Radians => {
            log::debug!("Converting alpha from radians to degrees");
            alpha.mapv_into(f32::to_degrees)
        }
        _ => alpha,
    }
}
