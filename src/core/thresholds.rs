use crate::types::{HaError, HaReal, HaResult};
use serde::{Deserialize, Serialize};

/// Discretisation of an entropy or alpha value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bin {
    Low,
    Med,
    High,
}

impl Bin {
    /// Ordinal used to index the class lookup table
    pub fn index(self) -> usize {
        match self {
            Bin::Low => 0,
            Bin::Med => 1,
            Bin::High => 2,
        }
    }
}

impl std::fmt::Display for Bin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bin::Low => write!(f, "Low"),
            Bin::Med => write!(f, "Med"),
            Bin::High => write!(f, "High"),
        }
    }
}

/// A strictly ordered pair of cut points
///
/// Values are binned with half-open intervals: `v < low` is Low,
/// `low <= v < high` is Med, `v >= high` is High.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPair {
    low: HaReal,
    high: HaReal,
}

impl ThresholdPair {
    /// Validate and build a pair; `name` identifies it in the error
    pub fn new(name: &str, low: HaReal, high: HaReal) -> HaResult<Self> {
        // NaN fails this comparison too
        if !(low < high) {
            return Err(HaError::InvalidThreshold {
                name: name.to_string(),
                low,
                high,
            });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> HaReal {
        self.low
    }

    pub fn high(&self) -> HaReal {
        self.high
    }

    #[inline]
    pub fn bin(&self, value: HaReal) -> Bin {
        if value < self.low {
            Bin::Low
        } else if value < self.high {
            Bin::Med
        } else {
            Bin::High
        }
    }

    pub fn as_tuple(&self) -> (HaReal, HaReal) {
        (self.low, self.high)
    }
}

/// Unvalidated threshold configuration as supplied by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub h_thresh: (HaReal, HaReal),
    pub alpha_thresh_low_h: (HaReal, HaReal),
    pub alpha_thresh_med_h: (HaReal, HaReal),
    pub alpha_thresh_high_h: (HaReal, HaReal),
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            h_thresh: (0.5, 0.9),
            alpha_thresh_low_h: (42.5, 52.5),
            alpha_thresh_med_h: (40.0, 50.0),
            alpha_thresh_high_h: (45.0, 55.0),
        }
    }
}

impl ThresholdConfig {
    /// Load a (possibly partial) configuration from JSON; missing keys take defaults
    pub fn from_json_str(json: &str) -> HaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> HaResult<Self> {
        log::debug!("Reading threshold configuration from {}", path.as_ref().display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(self) -> HaResult<ThresholdSet> {
        ThresholdSet::try_from(self)
    }
}

/// Validated entropy-dependent threshold set
///
/// One entropy pair splits H into Low/Med/High, and each of those bins
/// carries its own alpha pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdConfig", into = "ThresholdConfig")]
pub struct ThresholdSet {
    h: ThresholdPair,
    alpha_low_h: ThresholdPair,
    alpha_med_h: ThresholdPair,
    alpha_high_h: ThresholdPair,
}

impl ThresholdSet {
    pub fn new(
        h_thresh: (HaReal, HaReal),
        alpha_thresh_low_h: (HaReal, HaReal),
        alpha_thresh_med_h: (HaReal, HaReal),
        alpha_thresh_high_h: (HaReal, HaReal),
    ) -> HaResult<Self> {
        Ok(Self {
            h: ThresholdPair::new("h_thresh", h_thresh.0, h_thresh.1)?,
            alpha_low_h: ThresholdPair::new(
                "alpha_thresh_low_h",
                alpha_thresh_low_h.0,
                alpha_thresh_low_h.1,
            )?,
            alpha_med_h: ThresholdPair::new(
                "alpha_thresh_med_h",
                alpha_thresh_med_h.0,
                alpha_thresh_med_h.1,
            )?,
            alpha_high_h: ThresholdPair::new(
                "alpha_thresh_high_h",
                alpha_thresh_high_h.0,
                alpha_thresh_high_h.1,
            )?,
        })
    }

    pub fn h_thresh(&self) -> ThresholdPair {
        self.h
    }

    /// Alpha pair applied inside the given entropy bin
    pub fn alpha_thresh(&self, h_bin: Bin) -> ThresholdPair {
        match h_bin {
            Bin::Low => self.alpha_low_h,
            Bin::Med => self.alpha_med_h,
            Bin::High => self.alpha_high_h,
        }
    }

    #[inline]
    pub fn h_bin(&self, h: HaReal) -> Bin {
        self.h.bin(h)
    }

    #[inline]
    pub fn alpha_bin(&self, alpha: HaReal, h_bin: Bin) -> Bin {
        self.alpha_thresh(h_bin).bin(alpha)
    }

    pub fn to_config(&self) -> ThresholdConfig {
        ThresholdConfig {
            h_thresh: self.h.as_tuple(),
            alpha_thresh_low_h: self.alpha_low_h.as_tuple(),
            alpha_thresh_med_h: self.alpha_med_h.as_tuple(),
            alpha_thresh_high_h: self.alpha_high_h.as_tuple(),
        }
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        let c = ThresholdConfig::default();
        // Literal defaults are strictly ordered
        Self {
            h: ThresholdPair { low: c.h_thresh.0, high: c.h_thresh.1 },
            alpha_low_h: ThresholdPair {
                low: c.alpha_thresh_low_h.0,
                high: c.alpha_thresh_low_h.1,
            },
            alpha_med_h: ThresholdPair {
                low: c.alpha_thresh_med_h.0,
                high: c.alpha_thresh_med_h.1,
            },
            alpha_high_h: ThresholdPair {
                low: c.alpha_thresh_high_h.0,
                high: c.alpha_thresh_high_h.1,
            },
        }
    }
}

impl TryFrom<ThresholdConfig> for ThresholdSet {
    type Error = HaError;

    fn try_from(c: ThresholdConfig) -> HaResult<Self> {
        ThresholdSet::new(
            c.h_thresh,
            c.alpha_thresh_low_h,
            c.alpha_thresh_med_h,
            c.alpha_thresh_high_h,
        )
    }
}

impl From<ThresholdSet> for ThresholdConfig {
    fn from(set: ThresholdSet) -> Self {
        set.to_config()
    }
}

impl std::fmt::Display for ThresholdSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "H: {:?}, Alpha (Low H): {:?}, Alpha (Med H): {:?}, Alpha (High H): {:?}",
            self.h.as_tuple(),
            self.alpha_low_h.as_tuple(),
            self.alpha_med_h.as_tuple(),
            self.alpha_high_h.as_tuple()
        )
    }
}
