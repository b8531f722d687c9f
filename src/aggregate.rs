use crate::bucket::{BucketKey, Sample, assign};
use crate::error::ConfigError;
use crate::types::{Field, LocationSample, RawSample};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How the values folded into one bucket collapse to a single number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    First,
    Last,
    Min,
    Max,
    Mean,
}

impl Strategy {
    pub const fn name(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Min => "min",
            Self::Max => "max",
            Self::Mean => "mean",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "mean" | "avg" => Ok(Self::Mean),
            _ => Err(ConfigError::UnknownStrategy(s.trim().to_string())),
        }
    }
}

/// Strategy used for a field nobody overrode.
///
/// Accumulating counters (distance, calories) keep the value at the end of the
/// window; instantaneous signals are averaged.
pub const fn default_strategy(field: Field) -> Strategy {
    match field {
        Field::Distance | Field::Calorie => Strategy::Last,
        _ => Strategy::Mean,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Stamped {
    at: i64,
    value: f64,
}

/// Running statistics for one (bucket, field) pair.
///
/// `first`/`last` remember the timestamp that produced them, so the result does
/// not depend on the order samples were folded in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregationState {
    first: Option<Stamped>,
    last: Option<Stamped>,
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    count: u64,
}

impl AggregationState {
    pub fn fold(&mut self, at: i64, value: f64) {
        if !value.is_finite() {
            return;
        }

        let stamped = Stamped { at, value };
        if self.first.is_none_or(|f| at < f.at) {
            self.first = Some(stamped);
        }
        if self.last.is_none_or(|l| at >= l.at) {
            self.last = Some(stamped);
        }
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
        self.count += 1;
    }

    /// Folds another state in. On equal timestamps `self` keeps `first` and `other` wins `last`.
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }

        if let Some(of) = other.first
            && self.first.is_none_or(|f| of.at < f.at)
        {
            self.first = Some(of);
        }
        if let Some(ol) = other.last
            && self.last.is_none_or(|l| ol.at >= l.at)
        {
            self.last = Some(ol);
        }
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Collapses the state to one value, or `None` if nothing was folded.
    #[allow(clippy::cast_precision_loss)]
    pub fn resolve(&self, strategy: Strategy) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        match strategy {
            Strategy::First => self.first.map(|s| s.value),
            Strategy::Last => self.last.map(|s| s.value),
            Strategy::Min => self.min,
            Strategy::Max => self.max,
            Strategy::Mean => Some(self.sum / self.count as f64),
        }
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    pub const fn sum(&self) -> f64 {
        self.sum
    }
}

/// One `FIELD=STRATEGY` pair from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Override {
    pub field: Field,
    pub strategy: Strategy,
}

impl FromStr for Override {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((field, strategy)) = s.split_once('=') else {
            return Err(ConfigError::MalformedOverride(s.to_string()));
        };
        Ok(Self {
            field: field.parse()?,
            strategy: strategy.parse()?,
        })
    }
}

/// One strategy per aggregatable field. Starts from [`default_strategy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    strategies: BTreeMap<Field, Strategy>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        let strategies = Field::ALL
            .into_iter()
            .filter(|f| *f != Field::StartTime)
            .map(|f| (f, default_strategy(f)))
            .collect();
        Self { strategies }
    }
}

impl AggregationConfig {
    pub fn with_overrides<'a, I>(overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a Override>,
    {
        let mut config = Self::default();
        for o in overrides {
            config.set(o.field, o.strategy)?;
        }
        Ok(config)
    }

    pub fn set(&mut self, field: Field, strategy: Strategy) -> Result<(), ConfigError> {
        if field == Field::StartTime {
            return Err(ConfigError::NotAggregatable(field));
        }
        self.strategies.insert(field, strategy);
        Ok(())
    }

    pub fn strategy(&self, field: Field) -> Strategy {
        self.strategies
            .get(&field)
            .copied()
            .unwrap_or_else(|| default_strategy(field))
    }
}

/// Per-workout bucket map. Built, resolved, and dropped within one assembly pass.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    buckets: BTreeMap<BucketKey, BTreeMap<Field, AggregationState>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(live_data: &[RawSample], location_data: &[LocationSample]) -> Self {
        let mut acc = Self::new();
        for s in live_data {
            acc.observe(s);
        }
        for s in location_data {
            acc.observe(s);
        }
        acc
    }

    pub fn fold(&mut self, key: BucketKey, field: Field, at: i64, value: f64) {
        // Non-finite values must not open a bucket that would then resolve empty.
        if !value.is_finite() {
            return;
        }
        self.buckets
            .entry(key)
            .or_default()
            .entry(field)
            .or_default()
            .fold(at, value);
    }

    pub fn observe<S: Sample + ?Sized>(&mut self, sample: &S) {
        let key = assign(sample);
        let at = sample.start_time();
        for (field, value) in sample.values() {
            self.fold(key, field, at, value);
        }
    }

    pub fn state(&self, key: BucketKey, field: Field) -> Option<&AggregationState> {
        self.buckets.get(&key)?.get(&field)
    }

    pub fn buckets(
        &self,
    ) -> impl Iterator<Item = (&BucketKey, &BTreeMap<Field, AggregationState>)> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
