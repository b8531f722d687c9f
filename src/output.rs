use crate::types::{CompressedWorkout, Exercise};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const EXERCISES_FILE: &str = "exercises.json";
pub const COMPRESSED_FILE: &str = "compressed_exercises.json";

/// Which workouts of a start-time-ordered list get written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    /// The `n` most recent.
    Latest(usize),
}

impl Selection {
    pub fn apply<T>(self, items: &[T]) -> &[T] {
        match self {
            Self::All => items,
            Self::Latest(n) => &items[items.len().saturating_sub(n)..],
        }
    }
}

/// Paths of the two generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub exercises: PathBuf,
    pub compressed: PathBuf,
}

/// Writes `exercises.json` and `compressed_exercises.json` into `output_dir`.
///
/// `Latest(1)` writes a bare object; every other selection writes an array,
/// even when it holds a single workout.
pub fn write_outputs(
    output_dir: &Path,
    exercises: &[Exercise],
    selection: Selection,
) -> Result<Written> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output dir: {}", output_dir.display()))?;

    let selected = selection.apply(exercises);
    let compressed: Vec<&CompressedWorkout> =
        selected.iter().map(|e| &e.compressed_workout).collect();

    let written = Written {
        exercises: output_dir.join(EXERCISES_FILE),
        compressed: output_dir.join(COMPRESSED_FILE),
    };
    let bare = selection == Selection::Latest(1);
    write_json(&written.exercises, selected, bare)?;
    write_json(&written.compressed, &compressed, bare)?;

    Ok(written)
}

fn write_json<T: Serialize>(path: &Path, items: &[T], bare: bool) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating file: {}", path.display()))?;
    let mut w = BufWriter::new(file);

    match items {
        [single] if bare => serde_json::to_writer_pretty(&mut w, single),
        _ => serde_json::to_writer_pretty(&mut w, items),
    }
    .with_context(|| format!("writing JSON: {}", path.display()))?;
    w.flush()
        .with_context(|| format!("flushing file: {}", path.display()))?;

    tracing::info!(path = %path.display(), items = items.len(), "generated");
    Ok(())
}
