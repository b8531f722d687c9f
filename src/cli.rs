use crate::aggregate::{AggregationConfig, Override};
use crate::error::ConfigError;
use crate::output::Selection;
use crate::series::SeriesConfig;
use crate::types::Field;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "shealth-exporter",
    about = "Extract exercises data from Samsung Health export files"
)]
pub struct Cli {
    /// The Samsung Health export folder (or a .zip of it).
    #[arg(short, long, value_name = "EXPORT")]
    pub input: PathBuf,

    /// Output folder. Created if missing.
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Export every workout instead of only the most recent ones.
    #[arg(long, conflicts_with = "last")]
    pub all: bool,

    /// Number of most recent workouts to export.
    #[arg(short = 'n', long, default_value_t = 1, value_name = "N")]
    pub last: usize,

    /// Columns of the resampled live-data table, in order.
    #[arg(short, long, value_delimiter = ',', default_values_t = Field::DEFAULT_OUTPUT)]
    pub fields: Vec<Field>,

    /// Aggregation override, e.g. `heart_rate=max`. Repeatable.
    #[arg(short = 'a', long = "agg", value_name = "FIELD=STRATEGY")]
    pub agg: Vec<Override>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

impl Cli {
    pub const fn selection(&self) -> Selection {
        if self.all {
            Selection::All
        } else {
            Selection::Latest(self.last)
        }
    }

    pub fn series_config(&self) -> Result<SeriesConfig, ConfigError> {
        let aggregation = AggregationConfig::with_overrides(&self.agg)?;
        SeriesConfig::new(self.fields.clone(), aggregation)
    }
}
