use clap::Parser;
use shealth_exporter::aggregate::Strategy;
use shealth_exporter::cli::Cli;
use shealth_exporter::error::ConfigError;
use shealth_exporter::output::Selection;
use shealth_exporter::types::Field;

#[test]
fn defaults() {
    let cli = Cli::try_parse_from(["shealth-exporter", "-i", "export", "-o", "out"]).unwrap();
    assert_eq!(cli.selection(), Selection::Latest(1));
    assert_eq!(cli.fields, Field::DEFAULT_OUTPUT.to_vec());

    let config = cli.series_config().unwrap();
    assert_eq!(config.fields(), &Field::DEFAULT_OUTPUT);
    assert_eq!(config.aggregation().strategy(Field::Distance), Strategy::Last);
}

#[test]
fn all_and_last_conflict() {
    let cli = Cli::try_parse_from(["shealth-exporter", "-i", "e", "-o", "o", "--all"]).unwrap();
    assert_eq!(cli.selection(), Selection::All);

    let cli = Cli::try_parse_from(["shealth-exporter", "-i", "e", "-o", "o", "-n", "3"]).unwrap();
    assert_eq!(cli.selection(), Selection::Latest(3));

    assert!(
        Cli::try_parse_from(["shealth-exporter", "-i", "e", "-o", "o", "--all", "-n", "3"])
            .is_err()
    );
}

#[test]
fn fields_and_overrides() {
    let cli = Cli::try_parse_from([
        "shealth-exporter",
        "-i",
        "e",
        "-o",
        "o",
        "-f",
        "time,latitude,longitude",
        "-a",
        "latitude=first",
        "--agg",
        "heart_rate=max",
    ])
    .unwrap();

    let config = cli.series_config().unwrap();
    assert_eq!(
        config.fields(),
        &[Field::StartTime, Field::Latitude, Field::Longitude]
    );
    assert_eq!(config.aggregation().strategy(Field::Latitude), Strategy::First);
    assert_eq!(config.aggregation().strategy(Field::HeartRate), Strategy::Max);
}

#[test]
fn bad_values_are_rejected() {
    assert!(
        Cli::try_parse_from(["shealth-exporter", "-i", "e", "-o", "o", "-f", "pulse"]).is_err()
    );
    assert!(
        Cli::try_parse_from(["shealth-exporter", "-i", "e", "-o", "o", "-a", "speed"]).is_err()
    );
    assert!(Cli::try_parse_from(["shealth-exporter", "-o", "o"]).is_err());

    let cli =
        Cli::try_parse_from(["shealth-exporter", "-i", "e", "-o", "o", "-a", "start_time=max"])
            .unwrap();
    assert_eq!(
        cli.series_config().unwrap_err(),
        ConfigError::NotAggregatable(Field::StartTime)
    );
}
