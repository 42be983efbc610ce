//! 10-20 montage tables
//!
//! Channel groupings and electrode pair tables used by regional aggregates,
//! interhemispheric connectivity, asymmetry indices and the pairwise
//! connectivity list. All lookups are by channel name; a channel that is not
//! present in the recording simply drops out of every aggregate that names it.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// A named group of electrodes (an anatomical region).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGroup {
    /// Region name (e.g. `"frontal"`)
    pub name: String,
    /// Electrodes in the region
    pub channels: Vec<String>,
}

/// A homologous left/right electrode pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectrodePair {
    /// Left-hemisphere electrode
    pub left: String,
    /// Right-hemisphere electrode
    pub right: String,
}

/// A named asymmetry index: `ln(right) − ln(left)` of one band's power.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsymmetryPair {
    /// Index name (e.g. `"frontal_alpha"`)
    pub name: String,
    /// Left-hemisphere electrode
    pub left: String,
    /// Right-hemisphere electrode
    pub right: String,
    /// Fine-registry band whose absolute power is compared
    pub band: String,
}

/// Category of a named connectivity pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairKind {
    /// Homologous electrodes across the midline
    Interhemispheric,
    /// Fronto-parietal electrodes within one hemisphere
    LongRange,
}

/// A connectivity pair reported individually in the pairwise list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedPair {
    /// First electrode
    pub first: String,
    /// Second electrode
    pub second: String,
    /// Pair category
    pub kind: PairKind,
    /// Region label (e.g. `"frontal"`, `"left"`)
    pub region: String,
}

/// Complete montage description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Montage {
    /// Anatomical regions
    pub regions: Vec<ChannelGroup>,
    /// Region names treated as "posterior" for the frontal–posterior aggregate
    pub posterior_regions: Vec<String>,
    /// Region name treated as "frontal" for the frontal–posterior aggregate
    pub frontal_region: String,
    /// Homologous pairs for interhemispheric connectivity
    pub homologous_pairs: Vec<ElectrodePair>,
    /// Asymmetry index definitions
    pub asymmetry_pairs: Vec<AsymmetryPair>,
    /// Pairs reported in the pairwise connectivity list
    pub connectivity_pairs: Vec<NamedPair>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

fn group(name: &str, channels: &[&str]) -> ChannelGroup {
    ChannelGroup { name: name.to_string(), channels: names(channels) }
}

fn pair(left: &str, right: &str) -> ElectrodePair {
    ElectrodePair { left: left.to_string(), right: right.to_string() }
}

fn asym(name: &str, left: &str, right: &str, band: &str) -> AsymmetryPair {
    AsymmetryPair {
        name: name.to_string(),
        left: left.to_string(),
        right: right.to_string(),
        band: band.to_string(),
    }
}

fn named(first: &str, second: &str, kind: PairKind, region: &str) -> NamedPair {
    NamedPair {
        first: first.to_string(),
        second: second.to_string(),
        kind,
        region: region.to_string(),
    }
}

impl Montage {
    /// Standard 19-channel 10-20 montage.
    pub fn standard_10_20() -> Self {
        Self {
            regions: alloc::vec![
                group("frontal", &["Fp1", "Fp2", "F7", "F3", "Fz", "F4", "F8"]),
                group("central", &["C3", "Cz", "C4"]),
                group("temporal", &["T7", "T8"]),
                group("parietal", &["P7", "P3", "Pz", "P4", "P8"]),
                group("occipital", &["O1", "O2"]),
            ],
            posterior_regions: names(&["parietal", "occipital"]),
            frontal_region: "frontal".to_string(),
            homologous_pairs: alloc::vec![
                pair("Fp1", "Fp2"),
                pair("F7", "F8"),
                pair("F3", "F4"),
                pair("T7", "T8"),
                pair("C3", "C4"),
                pair("P7", "P8"),
                pair("P3", "P4"),
                pair("O1", "O2"),
            ],
            asymmetry_pairs: alloc::vec![
                asym("frontal_alpha", "F3", "F4", "alpha2"),
                asym("parietal_alpha", "P3", "P4", "alpha2"),
                asym("frontal_theta", "F3", "F4", "theta"),
            ],
            connectivity_pairs: alloc::vec![
                named("Fp1", "Fp2", PairKind::Interhemispheric, "frontal"),
                named("F3", "F4", PairKind::Interhemispheric, "frontal"),
                named("C3", "C4", PairKind::Interhemispheric, "central"),
                named("P3", "P4", PairKind::Interhemispheric, "parietal"),
                named("O1", "O2", PairKind::Interhemispheric, "occipital"),
                named("F3", "P3", PairKind::LongRange, "left"),
                named("F4", "P4", PairKind::LongRange, "right"),
            ],
        }
    }

    /// Look up a region by name
    pub fn region(&self, name: &str) -> Option<&ChannelGroup> {
        self.regions.iter().find(|g| g.name == name)
    }

    /// Channels of the posterior regions, in declaration order
    pub fn posterior_channels(&self) -> Vec<&str> {
        self.posterior_regions
            .iter()
            .filter_map(|name| self.region(name))
            .flat_map(|g| g.channels.iter().map(String::as_str))
            .collect()
    }
}

impl Default for Montage {
    fn default() -> Self {
        Self::standard_10_20()
    }
}
