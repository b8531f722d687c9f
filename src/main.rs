#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::Parser;
use shealth_exporter::{cli, export, output, utils};

#[macro_use]
extern crate shealth_exporter;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = cli.series_config()?;
    let selection = cli.selection();

    let export_handle = utils::open_export(&cli.input)?;
    dlog!(
        "mode=export input={} output={} selection={:?} fields={:?}",
        export_handle.dir().display(),
        cli.output.display(),
        selection,
        config.fields()
    );

    let exercises = export::load_exercises(export_handle.dir(), &config)?;
    if exercises.is_empty() {
        anyhow::bail!("No workouts found. Check that the folder/ZIP is a Samsung Health export.");
    }

    let written = output::write_outputs(&cli.output, &exercises, selection)?;
    dlog!(
        "done exercises={} compressed={}",
        written.exercises.display(),
        written.compressed.display()
    );

    Ok(())
}
