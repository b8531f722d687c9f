use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing_subscriber::{EnvFilter, fmt};
use zip::ZipArchive;

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,shealth_exporter={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

/// Handle that keeps a tempdir alive if we extracted a ZIP.
pub struct ExportHandle {
    dir: PathBuf,
    _tmp: Option<TempDir>,
}

impl ExportHandle {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Accepts either:
/// - a directory holding the exercise CSV and `jsons/`
/// - a `.zip` file which we extract to a temp dir
pub fn open_export(path: &Path) -> Result<ExportHandle> {
    if path.is_dir() {
        tracing::info!(path = %path.display(), "using export directory");
        return Ok(ExportHandle {
            dir: path.to_path_buf(),
            _tmp: None,
        });
    }

    if path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("zip"))
        != Some(true)
    {
        bail!(
            "Export path must be a directory or a .zip file: {}",
            path.display()
        );
    }

    let zip_file = File::open(path).with_context(|| format!("opening zip: {}", path.display()))?;
    let mut zip =
        ZipArchive::new(zip_file).with_context(|| format!("reading zip: {}", path.display()))?;

    let tmp = tempfile::tempdir().context("creating tempdir for export zip")?;
    tracing::info!(
        zip = %path.display(),
        tmp = %tmp.path().display(),
        entries = zip.len(),
        "extracting export zip"
    );

    for i in 0..zip.len() {
        let mut f = zip.by_index(i).context("reading zip entry")?;

        // Prevent Zip Slip / path traversal.
        let Some(rel) = f.enclosed_name() else {
            tracing::warn!(name = %f.name(), "skipping unsafe zip entry path");
            continue;
        };

        let out_path = tmp.path().join(&rel);

        if f.is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("creating dir: {}", out_path.display()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating dir: {}", parent.display()))?;
        }

        let mut out = File::create(&out_path)
            .with_context(|| format!("creating file: {}", out_path.display()))?;
        io::copy(&mut f, &mut out)
            .with_context(|| format!("extracting file: {}", out_path.display()))?;
    }

    let root = if looks_like_export(tmp.path()) {
        tmp.path().to_path_buf()
    } else {
        // Common case: zip contains a single top-level dir.
        let mut dirs = Vec::new();
        for e in fs::read_dir(tmp.path()).context("reading extracted root dir")? {
            let e = e?;
            if e.file_type()?.is_dir() {
                dirs.push(e.path());
            }
        }

        match dirs.as_slice() {
            [only] if looks_like_export(only) => only.clone(),
            _ => bail!(
                "ZIP extracted but doesn't look like a Samsung Health export root: {}",
                tmp.path().display()
            ),
        }
    };

    tracing::info!(export_root = %root.display(), "export ready");

    Ok(ExportHandle {
        dir: root,
        _tmp: Some(tmp),
    })
}

pub fn looks_like_export(dir: &Path) -> bool {
    if dir.join("jsons").join("com.samsung.shealth.exercise").is_dir() {
        return true;
    }
    fs::read_dir(dir).is_ok_and(|entries| {
        entries.flatten().any(|e| {
            e.file_name().to_str().is_some_and(|n| {
                n.starts_with("com.samsung.shealth.exercise.") && n.ends_with(".csv")
            })
        })
    })
}

/// Parses export timestamps such as `2023-05-01 10:00:00.000`.
pub fn parse_start_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Shortest decimal form: `76` rather than `76.0`, and never `-0`.
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    v.to_string()
}
