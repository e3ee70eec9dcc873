//! Provider and data type identifiers
//!
//! Both enumerations display and parse as their lower-case canonical ids,
//! which are the segments used in canonical cache keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Data Source ==
/// External provider a health record was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Android Health Connect
    HealthConnect,
    /// Apple HealthKit
    #[serde(rename = "healthkit")]
    HealthKit,
    /// Fitbit Web API
    Fitbit,
    /// Garmin Connect
    Garmin,
    /// Oura cloud API
    Oura,
}

impl DataSource {
    /// All known sources, in declaration order.
    pub const ALL: [DataSource; 5] = [
        DataSource::HealthConnect,
        DataSource::HealthKit,
        DataSource::Fitbit,
        DataSource::Garmin,
        DataSource::Oura,
    ];

    /// Returns the canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::HealthConnect => "health_connect",
            DataSource::HealthKit => "healthkit",
            DataSource::Fitbit => "fitbit",
            DataSource::Garmin => "garmin",
            DataSource::Oura => "oura",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| CacheError::InvalidKey(format!("unknown data source '{}'", s)))
    }
}

// == Data Type ==
/// Kind of normalized health record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Steps,
    HeartRate,
    RestingHeartRate,
    HeartRateVariability,
    Sleep,
    Calories,
    Distance,
    Exercise,
    Weight,
    Height,
    BloodOxygen,
}

impl DataType {
    /// All known data types, in declaration order.
    pub const ALL: [DataType; 11] = [
        DataType::Steps,
        DataType::HeartRate,
        DataType::RestingHeartRate,
        DataType::HeartRateVariability,
        DataType::Sleep,
        DataType::Calories,
        DataType::Distance,
        DataType::Exercise,
        DataType::Weight,
        DataType::Height,
        DataType::BloodOxygen,
    ];

    /// Returns the canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Steps => "steps",
            DataType::HeartRate => "heart_rate",
            DataType::RestingHeartRate => "resting_heart_rate",
            DataType::HeartRateVariability => "heart_rate_variability",
            DataType::Sleep => "sleep",
            DataType::Calories => "calories",
            DataType::Distance => "distance",
            DataType::Exercise => "exercise",
            DataType::Weight => "weight",
            DataType::Height => "height",
            DataType::BloodOxygen => "blood_oxygen",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|data_type| data_type.as_str() == s)
            .ok_or_else(|| CacheError::InvalidKey(format!("unknown data type '{}'", s)))
    }
}
