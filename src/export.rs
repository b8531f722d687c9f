use crate::dlog;
use crate::series::SeriesConfig;
use crate::summary::reduce;
use crate::types::{
    Exercise, LIVE_DATA_KIND, LOCATION_DATA_KIND, LiveDataRecord, LocationSample, RawSample,
    WorkoutRecord,
};
use crate::utils::parse_start_time;
use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

static EXERCISE_CSV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^com\.samsung\.shealth\.exercise\.\d+\.csv$").expect("exercise csv regex")
});

const UUID_LEN: usize = 36;

/// Directory holding per-workout sidecar files, relative to the export root.
pub fn sidecar_root(export_dir: &Path) -> PathBuf {
    export_dir.join("jsons").join("com.samsung.shealth.exercise")
}

/// Finds `com.samsung.shealth.exercise.<digits>.csv` at the export root.
/// When several exist the newest (lexicographically last) wins.
pub fn find_exercise_csv(export_dir: &Path) -> Result<PathBuf> {
    let display = export_dir.display();
    if !export_dir.is_dir() {
        bail!("Export folder not found: {display}");
    }

    let mut candidates = Vec::new();
    for e in fs::read_dir(export_dir).with_context(|| format!("reading dir: {display}"))? {
        let e = e?;
        let name = e.file_name();
        let matches = name.to_str().is_some_and(|n| EXERCISE_CSV_RE.is_match(n));
        if matches && e.file_type()?.is_file() {
            candidates.push(e.path());
        }
    }
    candidates.sort();

    let Some(csv_path) = candidates.pop() else {
        bail!("Exercise CSV file not found in folder: {display}");
    };
    if !candidates.is_empty() {
        dlog!(
            "multiple exercise csv files, using {} (ignored {})",
            csv_path.display(),
            candidates.len()
        );
    }

    Ok(csv_path)
}

/// Reads the exercise CSV: one metadata line, one header line, then rows.
pub fn read_workouts(csv_path: &Path) -> Result<Vec<WorkoutRecord>> {
    let display = csv_path.display();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("opening CSV: {display}"))?;

    let mut records = reader.records();

    // Metadata line, e.g. `com.samsung.shealth.exercise,6310004,18`.
    if records.next().transpose().with_context(|| format!("reading CSV: {display}"))?.is_none() {
        return Ok(Vec::new());
    }

    let Some(headers) = records
        .next()
        .transpose()
        .with_context(|| format!("reading CSV header: {display}"))?
    else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let mut out = Vec::new();
    for (line, row) in records.enumerate() {
        let row = row.with_context(|| format!("reading CSV row {}: {display}", line + 1))?;
        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let columns = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, h)| (h.clone(), row.get(i).unwrap_or_default().to_string()))
            .collect::<BTreeMap<_, _>>();
        out.push(WorkoutRecord::new(columns));
    }

    Ok(out)
}

/// Splits `<uuid>.<kind>` into its two halves.
pub fn split_sidecar_name(name: &str) -> Option<(&str, &str)> {
    let uuid = name.get(..UUID_LEN)?;
    let kind = name.get(UUID_LEN..)?.strip_prefix('.')?;
    (!kind.is_empty()).then_some((uuid, kind))
}

/// Decodes a sidecar array element by element; malformed elements are skipped.
fn decode_each<T: DeserializeOwned>(uuid: &str, kind: &str, value: &JsonValue) -> Vec<T> {
    let Some(items) = value.as_array() else {
        tracing::warn!(uuid, kind, "sidecar is not a JSON array");
        return Vec::new();
    };

    let mut skipped = 0usize;
    let out = items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(v) => Some(v),
            Err(e) => {
                skipped += 1;
                dlog!("sidecar_bad_record uuid={uuid} kind={kind} err={e}");
                None
            }
        })
        .collect();

    if skipped > 0 {
        tracing::warn!(uuid, kind, skipped, "skipped malformed sidecar records");
    }
    out
}

/// Workout row plus whatever sidecars have been attached so far.
struct PendingExercise {
    workout: WorkoutRecord,
    sidecars: BTreeMap<String, JsonValue>,
    live_data: Vec<RawSample>,
    location_data: Vec<LocationSample>,
}

impl PendingExercise {
    const fn new(workout: WorkoutRecord) -> Self {
        Self {
            workout,
            sidecars: BTreeMap::new(),
            live_data: Vec::new(),
            location_data: Vec::new(),
        }
    }

    fn attach(&mut self, uuid: &str, kind: &str, value: JsonValue) {
        if kind == LIVE_DATA_KIND {
            let records: Vec<LiveDataRecord> = decode_each(uuid, kind, &value);
            self.live_data = records.iter().flat_map(LiveDataRecord::to_samples).collect();
            dlog!(
                "live_data uuid={uuid} records={} samples={}",
                records.len(),
                self.live_data.len()
            );
        } else if kind == LOCATION_DATA_KIND {
            self.location_data = decode_each(uuid, kind, &value);
            dlog!("location_data uuid={uuid} samples={}", self.location_data.len());
        }

        self.sidecars.insert(kind.to_string(), value);
    }

    fn finish(self, uuid: String, config: &SeriesConfig) -> Exercise {
        let compressed_workout =
            reduce(&self.workout, &self.live_data, &self.location_data, config);
        Exercise {
            uuid,
            start_time: self.workout.start_time().unwrap_or_default().to_string(),
            workout: self.workout,
            compressed_workout,
            sidecars: self.sidecars,
            live_data: self.live_data,
            location_data: self.location_data,
        }
    }
}

/// Loads every workout of the export, attaches its sidecars, and computes its summary.
///
/// The result is ordered by start time, oldest first.
pub fn load_exercises(export_dir: &Path, config: &SeriesConfig) -> Result<Vec<Exercise>> {
    let csv_path = find_exercise_csv(export_dir)?;
    let rows = read_workouts(&csv_path)
        .with_context(|| format!("Failed to read CSV file {}", csv_path.display()))?;
    tracing::info!(csv = %csv_path.display(), rows = rows.len(), "read exercise csv");

    let mut pending: BTreeMap<String, PendingExercise> = BTreeMap::new();
    for row in rows {
        let Some(uuid) = row.uuid().map(str::to_string) else {
            dlog!("csv_row_without_uuid start_time={:?}", row.start_time());
            continue;
        };
        if pending.insert(uuid.clone(), PendingExercise::new(row)).is_some() {
            dlog!("duplicate_uuid uuid={uuid} (keeping last row)");
        }
    }

    let root = sidecar_root(export_dir);
    if root.is_dir() {
        let attached = attach_sidecars(&root, &mut pending);
        tracing::info!(sidecars = attached, "attached sidecar files");
    } else {
        tracing::warn!(
            path = %root.display(),
            "sidecar directory missing; workouts have no live data"
        );
    }

    let mut out: Vec<Exercise> = pending
        .into_iter()
        .map(|(uuid, p)| p.finish(uuid, config))
        .collect();
    sort_by_start_time(&mut out);

    tracing::info!(workouts = out.len(), "loaded workouts");
    Ok(out)
}

/// Unreadable entries are logged and skipped; returns how many sidecars were attached.
fn attach_sidecars(root: &Path, pending: &mut BTreeMap<String, PendingExercise>) -> usize {
    let mut attached = 0usize;

    for entry in WalkDir::new(root).min_depth(2).max_depth(2).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    root = %root.display(),
                    err = %e,
                    "skipping unreadable sidecar entry"
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some((uuid, kind)) = split_sidecar_name(name) else {
            dlog!("sidecar_bad_name name={name}");
            continue;
        };
        let Some(exercise) = pending.get_mut(uuid) else {
            dlog!("{name} ignored because not linked with a workout");
            continue;
        };

        let path = entry.path();
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), err = %e, "skipping unreadable sidecar");
                continue;
            }
        };
        let value = match serde_json::from_slice::<JsonValue>(&bytes) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %path.display(), err = %e, "skipping unparseable sidecar");
                continue;
            }
        };

        exercise.attach(uuid, kind, value);
        attached += 1;
    }

    attached
}

/// Oldest first. Unparseable start times sort before everything else.
pub fn sort_by_start_time(exercises: &mut [Exercise]) {
    exercises.sort_by(|a, b| {
        let ka = (parse_start_time(&a.start_time), a.start_time.as_str());
        let kb = (parse_start_time(&b.start_time), b.start_time.as_str());
        ka.cmp(&kb)
    });
}
