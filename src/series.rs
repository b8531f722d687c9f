//! Merges every field-group's buckets into one relative-time table and renders it as CSV text.

use crate::aggregate::{Accumulator, AggregationConfig, AggregationState};
use crate::bucket::FieldGroup;
use crate::error::ConfigError;
use crate::types::{Field, LocationSample, RawSample};
use crate::utils::{format_number, round_to};
use std::collections::{BTreeMap, BTreeSet};

/// Which columns to emit, in order, and how each field is aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesConfig {
    fields: Vec<Field>,
    aggregation: AggregationConfig,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            fields: Field::DEFAULT_OUTPUT.to_vec(),
            aggregation: AggregationConfig::default(),
        }
    }
}

impl SeriesConfig {
    pub fn new(fields: Vec<Field>, aggregation: AggregationConfig) -> Result<Self, ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::NoFields);
        }
        Ok(Self {
            fields,
            aggregation,
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub const fn aggregation(&self) -> &AggregationConfig {
        &self.aggregation
    }
}

/// One resampled instant. Values are resolved but not yet rounded.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub bucket_start: i64,
    /// Whole seconds since the earliest bucket of the series.
    pub relative_time: i64,
    values: BTreeMap<Field, f64>,
}

impl OutputRow {
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            #[allow(clippy::cast_precision_loss)]
            Field::StartTime => Some(self.relative_time as f64),
            _ => self.values.get(&field).copied(),
        }
    }
}

/// Coalesces buckets by start time across groups, sorts them, and resolves each field.
pub fn assemble(acc: &Accumulator, aggregation: &AggregationConfig) -> Vec<OutputRow> {
    let mut merged: BTreeMap<i64, BTreeMap<Field, AggregationState>> = BTreeMap::new();
    for (key, fields) in acc.buckets() {
        let row = merged.entry(key.start).or_default();
        for (field, state) in fields {
            row.entry(*field).or_default().merge(state);
        }
    }

    let Some(&origin) = merged.keys().next() else {
        return Vec::new();
    };

    merged
        .into_iter()
        .map(|(start, fields)| OutputRow {
            bucket_start: start,
            relative_time: relative_seconds(start, origin),
            values: fields
                .into_iter()
                .filter_map(|(f, st)| st.resolve(aggregation.strategy(f)).map(|v| (f, v)))
                .collect(),
        })
        .collect()
}

/// Rounds half up to whole seconds; never negative.
const fn relative_seconds(start: i64, origin: i64) -> i64 {
    let delta = start.saturating_sub(origin);
    if delta <= 0 {
        return 0;
    }
    delta.saturating_add(500) / 1000
}

/// Header line plus one line per row; absent values are empty cells.
pub fn render(rows: &[OutputRow], fields: &[Field]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        fields
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in rows {
        let cells: Vec<String> = fields.iter().map(|&f| render_cell(row, f)).collect();
        lines.push(cells.join(","));
    }

    lines.join("\n")
}

fn render_cell(row: &OutputRow, field: Field) -> String {
    if field == Field::StartTime {
        return row.relative_time.to_string();
    }
    row.get(field)
        .map_or_else(String::new, |v| format_number(round_to(v, field.decimals())))
}

/// Full pipeline for one workout: bucket, fold, assemble, render.
pub fn live_data_csv(
    live_data: &[RawSample],
    location_data: &[LocationSample],
    config: &SeriesConfig,
) -> String {
    let acc = Accumulator::from_samples(live_data, location_data);
    let rows = assemble(&acc, config.aggregation());
    let groups: BTreeSet<FieldGroup> = acc.buckets().map(|(key, _)| key.group).collect();
    tracing::trace!(
        live = live_data.len(),
        location = location_data.len(),
        groups = %groups.iter().map(|g| g.name()).collect::<Vec<_>>().join(","),
        buckets = acc.len(),
        rows = rows.len(),
        "resampled live data"
    );
    render(&rows, config.fields())
}
