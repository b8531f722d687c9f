use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Prefix every exercise column carries in the export CSV.
pub const KEY_PREFIX: &str = "com.samsung.health.exercise.";

/// Sidecar kind holding heart rate / motion / VO2max samples.
pub const LIVE_DATA_KIND: &str = "com.samsung.health.exercise.live_data.json";

/// Sidecar kind holding GPS samples.
pub const LOCATION_DATA_KIND: &str = "com.samsung.health.exercise.location_data.json";

/// One column of the resampled live-data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    StartTime,
    HeartRate,
    Cadence,
    Calorie,
    Distance,
    Speed,
    PercentOfVo2Max,
    Accuracy,
    Altitude,
    Latitude,
    Longitude,
}

impl Field {
    pub const ALL: [Self; 11] = [
        Self::StartTime,
        Self::HeartRate,
        Self::Cadence,
        Self::Calorie,
        Self::Distance,
        Self::Speed,
        Self::PercentOfVo2Max,
        Self::Accuracy,
        Self::Altitude,
        Self::Latitude,
        Self::Longitude,
    ];

    /// Columns emitted when the caller does not choose any.
    pub const DEFAULT_OUTPUT: [Self; 4] =
        [Self::StartTime, Self::HeartRate, Self::Cadence, Self::Speed];

    pub const fn name(self) -> &'static str {
        match self {
            Self::StartTime => "start_time",
            Self::HeartRate => "heart_rate",
            Self::Cadence => "cadence",
            Self::Calorie => "calorie",
            Self::Distance => "distance",
            Self::Speed => "speed",
            Self::PercentOfVo2Max => "percent_of_vo2max",
            Self::Accuracy => "accuracy",
            Self::Altitude => "altitude",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
        }
    }

    /// Decimal places kept when a value is written out.
    pub const fn decimals(self) -> i32 {
        match self {
            Self::StartTime | Self::HeartRate | Self::Cadence | Self::Calorie | Self::Accuracy => 0,
            Self::PercentOfVo2Max => 1,
            Self::Distance | Self::Speed | Self::Altitude | Self::Latitude | Self::Longitude => 2,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("time") {
            return Ok(Self::StartTime);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

/// A live-data sample, tagged once at load time by the shape of its source record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSample {
    HeartRate {
        start_time: i64,
        heart_rate: f64,
    },
    Motion {
        start_time: i64,
        cadence: f64,
        calorie: Option<f64>,
        distance: Option<f64>,
        speed: Option<f64>,
    },
    Vo2Max {
        start_time: i64,
        percent_of_vo2max: f64,
    },
    DistanceOnly {
        start_time: i64,
        distance: f64,
    },
}

impl RawSample {
    pub const fn start_time(&self) -> i64 {
        match *self {
            Self::HeartRate { start_time, .. }
            | Self::Motion { start_time, .. }
            | Self::Vo2Max { start_time, .. }
            | Self::DistanceOnly { start_time, .. } => start_time,
        }
    }
}

/// GPS sample from the location sidecar. Always fully populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub start_time: i64,
    pub accuracy: f64,
    pub altitude: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Live-data record as it appears in the sidecar JSON: every value key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveDataRecord {
    pub start_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calorie: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_of_vo2max: Option<f64>,
}

impl LiveDataRecord {
    /// Splits the record into one tagged sample per signal it carries.
    ///
    /// A record with `distance` but no `cadence` is a distance-only sample;
    /// with `cadence` the distance travels inside the motion sample instead.
    /// Records carrying none of the marker keys yield nothing.
    pub fn to_samples(&self) -> Vec<RawSample> {
        let start_time = self.start_time;
        let mut out = Vec::new();

        if let Some(heart_rate) = self.heart_rate {
            out.push(RawSample::HeartRate {
                start_time,
                heart_rate,
            });
        }

        if let Some(cadence) = self.cadence {
            out.push(RawSample::Motion {
                start_time,
                cadence,
                calorie: self.calorie,
                distance: self.distance,
                speed: self.speed,
            });
        } else if let Some(distance) = self.distance {
            out.push(RawSample::DistanceOnly {
                start_time,
                distance,
            });
        }

        if let Some(percent_of_vo2max) = self.percent_of_vo2max {
            out.push(RawSample::Vo2Max {
                start_time,
                percent_of_vo2max,
            });
        }

        out
    }
}

/// One row of the exercise CSV, keyed by column name. Every value is text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutRecord(BTreeMap<String, String>);

impl WorkoutRecord {
    pub const fn new(columns: BTreeMap<String, String>) -> Self {
        Self(columns)
    }

    /// Looks a column up by its full name, or by its suffix after [`KEY_PREFIX`].
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .or_else(|| self.0.get(&format!("{KEY_PREFIX}{key}")))
            .map(String::as_str)
    }

    /// Numeric value of a column; `None` when missing, blank, or not a finite number.
    pub fn number(&self, key: &str) -> Option<f64> {
        let raw = self.get(key)?.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn uuid(&self) -> Option<&str> {
        self.get("datauuid").map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn start_time(&self) -> Option<&str> {
        self.get("start_time")
    }

    pub fn end_time(&self) -> Option<&str> {
        self.get("end_time")
    }

    pub fn columns(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// Per-workout export artifact: summary scalars plus the resampled live-data table.
///
/// Numeric fields are `None` when the export left them blank or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressedWorkout {
    pub start_time: String,
    pub end_time: String,
    pub duration: Option<f64>,
    pub distance: Option<f64>,
    pub calories: Option<f64>,
    pub mean_hr: Option<f64>,
    pub max_hr: Option<f64>,
    pub min_hr: Option<f64>,
    pub mean_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub mean_cadence: Option<f64>,
    pub max_cadence: Option<f64>,
    pub altitude_gain: Option<f64>,
    pub altitude_loss: Option<f64>,
    pub live_data: String,
}

/// Everything known about one workout once all its sidecars are loaded.
#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub uuid: String,
    pub start_time: String,
    pub workout: WorkoutRecord,
    #[serde(rename = "compressedWorkout")]
    pub compressed_workout: CompressedWorkout,

    /// Raw sidecar JSON keyed by kind, e.g. `com.samsung.health.exercise.live_data.json`.
    #[serde(flatten)]
    pub sidecars: BTreeMap<String, JsonValue>,

    #[serde(skip)]
    pub live_data: Vec<RawSample>,
    #[serde(skip)]
    pub location_data: Vec<LocationSample>,
}
