//! Dive record: the serializable set of human-entered dive parameters.

use serde::{Deserialize, Serialize};

use crate::duration::Duration;

/// Set of dive parameters in human-readable form.
///
/// Built from form input or decoded from the persisted log file. Once wrapped in a
/// [`crate::dive::Dive`] it is only changed by replacing the whole dive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiveRecord {
    /// Start date and time, `YYYY-MM-DDThh:mm`.
    pub date_time: String,
    /// Bottom time.
    pub duration: Duration,
    /// Dive site name.
    #[serde(default)]
    pub site: String,

    /// Air temperature.
    #[serde(default)]
    pub air_temp: f32,
    /// Altitude of the dive site.
    #[serde(default)]
    pub altitude: u32,
    /// Average depth.
    #[serde(default)]
    pub avg_depth: f32,
    /// Sea, lake, river, quarry...
    #[serde(default)]
    pub body_of_water: String,
    /// CNS loading at surfacing.
    #[serde(default)]
    pub cns_end: u32,
    /// CNS loading at descent.
    #[serde(default)]
    pub cns_start: u32,
    /// Current strength.
    #[serde(default)]
    pub current: String,
    /// Gradient factors or conservatism setting.
    #[serde(default)]
    pub deco_alg_factor: String,
    /// Decompression stops were required.
    #[serde(default)]
    pub deco_dive: bool,
    /// Dive computer model.
    #[serde(default)]
    pub dive_computer: String,
    /// Entry type (shore, boat...).
    #[serde(default)]
    pub entry: String,
    /// Breathing gas.
    #[serde(default)]
    pub gas: String,
    /// Geographic coordinates or region.
    #[serde(default)]
    pub geo: String,
    /// Maximum depth.
    #[serde(default)]
    pub max_depth: f32,
    /// Dive took place after dark.
    #[serde(default)]
    pub night_dive: bool,
    /// Free-text notes.
    #[serde(default)]
    pub note: String,
    /// Oxygen fraction, percent.
    #[serde(default)]
    pub o2: u32,
    /// Dive center or boat operator.
    #[serde(default)]
    pub operator: String,
    /// Weighting was right.
    #[serde(default)]
    pub perfect_weight: bool,
    /// Exposure suit.
    #[serde(default)]
    pub suit: String,
    /// Tank pressure at surfacing.
    #[serde(default)]
    pub tank_pressure_end: u32,
    /// Tank pressure at descent.
    #[serde(default)]
    pub tank_pressure_start: u32,
    /// Tank size and material.
    #[serde(default)]
    pub tank_type: String,
    /// Underwater visibility.
    #[serde(default)]
    pub visibility: String,
    /// Highest water temperature.
    #[serde(default)]
    pub water_max_temp: f32,
    /// Lowest water temperature.
    #[serde(default)]
    pub water_min_temp: f32,
    /// Surface weather.
    #[serde(default)]
    pub weather: String,
    /// Ballast weight.
    #[serde(default)]
    pub weights: u32,
}
