//! Maps samples onto fixed-width time windows, one width per signal family.

use crate::types::{Field, LocationSample, RawSample};

pub const INTERVAL_HR_MS: i64 = 5_000;
pub const INTERVAL_MOTION_MS: i64 = 10_000;
pub const INTERVAL_LOCATION_MS: i64 = 10_000;
pub const INTERVAL_VO2MAX_MS: i64 = 30_000;
pub const INTERVAL_DISTANCE_MS: i64 = 30_000;

/// Signal family. Each family is resampled at its own bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldGroup {
    HeartRate,
    Motion,
    Vo2Max,
    DistanceOnly,
    Location,
}

impl FieldGroup {
    pub const fn interval_ms(self) -> i64 {
        match self {
            Self::HeartRate => INTERVAL_HR_MS,
            Self::Motion => INTERVAL_MOTION_MS,
            Self::Vo2Max => INTERVAL_VO2MAX_MS,
            Self::DistanceOnly => INTERVAL_DISTANCE_MS,
            Self::Location => INTERVAL_LOCATION_MS,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::HeartRate => "hr",
            Self::Motion => "motion",
            Self::Vo2Max => "vo2max",
            Self::DistanceOnly => "distance_only",
            Self::Location => "location",
        }
    }
}

/// A (field-group, window start) pair. Samples share a bucket only when both match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub group: FieldGroup,
    pub start: i64,
}

/// Floors `t` to a multiple of `interval_ms`. Negative timestamps floor downwards too.
///
/// Saturates at `i64::MIN` for timestamps within one interval of it.
pub const fn bucket_start(t: i64, interval_ms: i64) -> i64 {
    t.div_euclid(interval_ms).saturating_mul(interval_ms)
}

/// Anything the accumulator can fold: a timestamp, a family, and the values it contributes.
pub trait Sample {
    fn start_time(&self) -> i64;
    fn group(&self) -> FieldGroup;
    fn values(&self) -> Vec<(Field, f64)>;
}

impl Sample for RawSample {
    fn start_time(&self) -> i64 {
        Self::start_time(self)
    }

    fn group(&self) -> FieldGroup {
        match self {
            Self::HeartRate { .. } => FieldGroup::HeartRate,
            Self::Motion { .. } => FieldGroup::Motion,
            Self::Vo2Max { .. } => FieldGroup::Vo2Max,
            Self::DistanceOnly { .. } => FieldGroup::DistanceOnly,
        }
    }

    fn values(&self) -> Vec<(Field, f64)> {
        match *self {
            Self::HeartRate { heart_rate, .. } => vec![(Field::HeartRate, heart_rate)],
            Self::Motion {
                cadence,
                calorie,
                distance,
                speed,
                ..
            } => {
                let mut out = vec![(Field::Cadence, cadence)];
                out.extend(calorie.map(|v| (Field::Calorie, v)));
                out.extend(distance.map(|v| (Field::Distance, v)));
                out.extend(speed.map(|v| (Field::Speed, v)));
                out
            }
            Self::Vo2Max {
                percent_of_vo2max, ..
            } => vec![(Field::PercentOfVo2Max, percent_of_vo2max)],
            Self::DistanceOnly { distance, .. } => vec![(Field::Distance, distance)],
        }
    }
}

impl Sample for LocationSample {
    fn start_time(&self) -> i64 {
        self.start_time
    }

    fn group(&self) -> FieldGroup {
        FieldGroup::Location
    }

    fn values(&self) -> Vec<(Field, f64)> {
        vec![
            (Field::Accuracy, self.accuracy),
            (Field::Altitude, self.altitude),
            (Field::Latitude, self.latitude),
            (Field::Longitude, self.longitude),
        ]
    }
}

pub fn assign<S: Sample + ?Sized>(sample: &S) -> BucketKey {
    let group = sample.group();
    BucketKey {
        group,
        start: bucket_start(sample.start_time(), group.interval_ms()),
    }
}
