//! Errors raised while building the resampling configuration.

use crate::types::Field;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown field: {0:?}")]
    UnknownField(String),

    #[error("unknown aggregation strategy: {0:?} (expected first, last, min, max or mean)")]
    UnknownStrategy(String),

    #[error("malformed aggregation override {0:?} (expected FIELD=STRATEGY)")]
    MalformedOverride(String),

    #[error("field {0} cannot be aggregated")]
    NotAggregatable(Field),

    #[error("no output fields declared")]
    NoFields,
}
