//! Frequency band registries
//!
//! Two registries are used by the engine:
//!
//! | Registry | Bands | Used for |
//! |----------|-------|----------|
//! | [`BandRegistry::fine`] | delta, theta, alpha1, alpha2, smr, beta2, hibeta, lowgamma | band power, ratios, asymmetry |
//! | [`BandRegistry::coarse`] | delta, theta, alpha, beta | phase connectivity |
//!
//! Every band is the closed-open interval `[low_hz, high_hz)`.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A named closed-open frequency interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    /// Band name (e.g. `"alpha2"`)
    pub name: String,
    /// Inclusive lower edge in Hz
    pub low_hz: f64,
    /// Exclusive upper edge in Hz
    pub high_hz: f64,
}

impl FrequencyBand {
    /// Create a band
    pub fn new(name: impl Into<String>, low_hz: f64, high_hz: f64) -> Self {
        Self { name: name.into(), low_hz, high_hz }
    }

    /// Whether `freq_hz` falls inside `[low_hz, high_hz)`
    #[inline]
    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.low_hz && freq_hz < self.high_hz
    }

    /// Band centre frequency
    #[inline]
    pub fn center_hz(&self) -> f64 {
        0.5 * (self.low_hz + self.high_hz)
    }
}

/// Ordered, non-overlapping set of frequency bands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FrequencyBand>", into = "Vec<FrequencyBand>")]
pub struct BandRegistry {
    bands: Vec<FrequencyBand>,
}

impl BandRegistry {
    /// Create a registry, validating ordering and overlap.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, any interval is empty or not
    /// finite, a name repeats, or a band starts below its predecessor's
    /// upper edge.
    pub fn new(bands: Vec<FrequencyBand>) -> Result<Self, ConfigError> {
        if bands.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }

        for (i, band) in bands.iter().enumerate() {
            let valid = band.low_hz.is_finite()
                && band.high_hz.is_finite()
                && band.low_hz >= 0.0
                && band.high_hz > band.low_hz;
            if !valid {
                return Err(ConfigError::InvalidBand {
                    name: band.name.clone(),
                    low_hz: band.low_hz,
                    high_hz: band.high_hz,
                });
            }
            if bands[..i].iter().any(|b| b.name == band.name) {
                return Err(ConfigError::DuplicateBand { name: band.name.clone() });
            }
            if i > 0 && band.low_hz < bands[i - 1].high_hz {
                return Err(ConfigError::UnorderedBands {
                    previous: bands[i - 1].name.clone(),
                    next: band.name.clone(),
                });
            }
        }

        Ok(Self { bands })
    }

    /// The 8-band registry used for power, ratios and asymmetry.
    pub fn fine() -> Self {
        Self {
            bands: alloc::vec![
                FrequencyBand::new("delta", 1.0, 4.0),
                FrequencyBand::new("theta", 4.0, 8.0),
                FrequencyBand::new("alpha1", 8.0, 10.0),
                FrequencyBand::new("alpha2", 10.0, 12.0),
                FrequencyBand::new("smr", 12.0, 15.0),
                FrequencyBand::new("beta2", 15.0, 20.0),
                FrequencyBand::new("hibeta", 20.0, 30.0),
                FrequencyBand::new("lowgamma", 30.0, 45.0),
            ],
        }
    }

    /// The 4-band registry used for connectivity.
    pub fn coarse() -> Self {
        Self {
            bands: alloc::vec![
                FrequencyBand::new("delta", 1.0, 4.0),
                FrequencyBand::new("theta", 4.0, 8.0),
                FrequencyBand::new("alpha", 8.0, 13.0),
                FrequencyBand::new("beta", 13.0, 30.0),
            ],
        }
    }

    /// Iterate bands in frequency order
    pub fn iter(&self) -> core::slice::Iter<'_, FrequencyBand> {
        self.bands.iter()
    }

    /// Look up a band by name
    pub fn get(&self, name: &str) -> Option<&FrequencyBand> {
        self.bands.iter().find(|b| b.name == name)
    }

    /// Number of bands
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Always `false` for a validated registry
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Band names in frequency order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.name.as_str())
    }
}

impl TryFrom<Vec<FrequencyBand>> for BandRegistry {
    type Error = ConfigError;

    fn try_from(bands: Vec<FrequencyBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<BandRegistry> for Vec<FrequencyBand> {
    fn from(registry: BandRegistry) -> Self {
        registry.bands
    }
}

impl<'a> IntoIterator for &'a BandRegistry {
    type Item = &'a FrequencyBand;
    type IntoIter = core::slice::Iter<'a, FrequencyBand>;

    fn into_iter(self) -> Self::IntoIter {
        self.bands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_builtin_registries_are_valid() {
        let fine = BandRegistry::fine();
        assert_eq!(fine.len(), 8);
        assert!(BandRegistry::new(Vec::from(fine.clone())).is_ok());

        let coarse = BandRegistry::coarse();
        assert_eq!(coarse.names().collect::<Vec<_>>(), vec!["delta", "theta", "alpha", "beta"]);
        assert!(BandRegistry::new(Vec::from(coarse)).is_ok());
    }

    #[test]
    fn test_band_edges_are_closed_open() {
        let fine = BandRegistry::fine();
        let alpha1 = fine.get("alpha1").unwrap();
        assert!(alpha1.contains(8.0));
        assert!(alpha1.contains(9.99));
        assert!(!alpha1.contains(10.0));
    }

    #[test]
    fn test_rejects_overlap() {
        let err = BandRegistry::new(vec![
            FrequencyBand::new("a", 1.0, 5.0),
            FrequencyBand::new("b", 4.0, 8.0),
        ]);
        assert!(matches!(err, Err(ConfigError::UnorderedBands { .. })));

        let err = BandRegistry::new(vec![FrequencyBand::new("a", 5.0, 5.0)]);
        assert!(matches!(err, Err(ConfigError::InvalidBand { .. })));

        assert_eq!(BandRegistry::new(Vec::new()), Err(ConfigError::EmptyRegistry));
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = r#"[{"name":"x","low_hz":8.0,"high_hz":4.0}]"#;
        assert!(serde_json::from_str::<BandRegistry>(bad).is_err());

        let good = r#"[{"name":"alpha","low_hz":8.0,"high_hz":13.0}]"#;
        let registry: BandRegistry = serde_json::from_str(good).unwrap();
        assert_eq!(registry.get("alpha").unwrap().center_hz(), 10.5);
    }
}
