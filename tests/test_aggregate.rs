use shealth_exporter::aggregate::{
    Accumulator, AggregationConfig, AggregationState, Override, Strategy, default_strategy,
};
use shealth_exporter::bucket::{BucketKey, FieldGroup};
use shealth_exporter::error::ConfigError;
use shealth_exporter::types::{Field, RawSample};

fn folded(values: &[(i64, f64)]) -> AggregationState {
    let mut st = AggregationState::default();
    for &(at, v) in values {
        st.fold(at, v);
    }
    st
}

#[test]
fn empty_state_resolves_to_nothing() {
    let st = AggregationState::default();
    for s in [
        Strategy::First,
        Strategy::Last,
        Strategy::Min,
        Strategy::Max,
        Strategy::Mean,
    ] {
        assert_eq!(st.resolve(s), None);
    }
}

#[test]
fn mean_matches_direct_computation_in_any_order() {
    let values = [(1_000, 70.0), (2_000, 75.0), (3_000, 81.0), (4_000, 66.0)];
    let expected = values.iter().map(|(_, v)| v).sum::<f64>() / 4.0;

    let forward = folded(&values);
    let mut rev = values;
    rev.reverse();
    let backward = folded(&rev);

    assert_eq!(forward.resolve(Strategy::Mean), Some(expected));
    assert_eq!(backward.resolve(Strategy::Mean), Some(expected));
    assert_eq!(forward.count(), 4);
    assert!((forward.sum() - 292.0).abs() < 1e-9);
}

#[test]
fn first_and_last_follow_timestamps_not_arrival() {
    let st = folded(&[(3_000, 30.0), (1_000, 10.0), (4_000, 40.0), (2_000, 20.0)]);
    assert_eq!(st.resolve(Strategy::First), Some(10.0));
    assert_eq!(st.resolve(Strategy::Last), Some(40.0));
    assert_eq!(st.resolve(Strategy::Min), Some(10.0));
    assert_eq!(st.resolve(Strategy::Max), Some(40.0));
}

#[test]
fn equal_timestamps_keep_first_arrival_and_latest_arrival() {
    let st = folded(&[(1_000, 1.0), (1_000, 2.0), (1_000, 3.0)]);
    assert_eq!(st.resolve(Strategy::First), Some(1.0));
    assert_eq!(st.resolve(Strategy::Last), Some(3.0));
}

#[test]
fn single_value_bucket_is_idempotent() {
    let st = folded(&[(5_000, 12.34)]);
    for s in [Strategy::First, Strategy::Last, Strategy::Min, Strategy::Max] {
        assert_eq!(st.resolve(s), Some(12.34));
    }
}

#[test]
fn non_finite_values_are_ignored() {
    let st = folded(&[(1_000, f64::NAN), (2_000, 5.0), (3_000, f64::INFINITY)]);
    assert_eq!(st.count(), 1);
    assert_eq!(st.resolve(Strategy::Mean), Some(5.0));

    let mut acc = Accumulator::new();
    let key = BucketKey {
        group: FieldGroup::HeartRate,
        start: 0,
    };
    acc.fold(key, Field::HeartRate, 0, f64::NAN);
    assert!(acc.is_empty());
}

#[test]
fn merge_combines_two_windows() {
    let mut a = folded(&[(31_000, 100.0), (35_000, 110.0)]);
    let b = folded(&[(33_000, 90.0), (45_000, 150.0)]);
    a.merge(&b);

    assert_eq!(a.count(), 4);
    assert_eq!(a.resolve(Strategy::First), Some(100.0));
    assert_eq!(a.resolve(Strategy::Last), Some(150.0));
    assert_eq!(a.resolve(Strategy::Min), Some(90.0));
    assert_eq!(a.resolve(Strategy::Max), Some(150.0));
    assert_eq!(a.resolve(Strategy::Mean), Some(112.5));

    let mut empty = AggregationState::default();
    empty.merge(&b);
    assert_eq!(empty, b);
}

#[test]
fn default_table() {
    assert_eq!(default_strategy(Field::HeartRate), Strategy::Mean);
    assert_eq!(default_strategy(Field::Cadence), Strategy::Mean);
    assert_eq!(default_strategy(Field::Speed), Strategy::Mean);
    assert_eq!(default_strategy(Field::Distance), Strategy::Last);
    assert_eq!(default_strategy(Field::Calorie), Strategy::Last);
    assert_eq!(default_strategy(Field::PercentOfVo2Max), Strategy::Mean);
    assert_eq!(default_strategy(Field::Altitude), Strategy::Mean);
    assert_eq!(default_strategy(Field::Accuracy), Strategy::Mean);
}

#[test]
fn overrides_replace_only_named_fields() {
    let overrides: Vec<Override> = ["heart_rate=max", "distance = first"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let config = AggregationConfig::with_overrides(&overrides).unwrap();

    assert_eq!(config.strategy(Field::HeartRate), Strategy::Max);
    assert_eq!(config.strategy(Field::Distance), Strategy::First);
    assert_eq!(config.strategy(Field::Speed), Strategy::Mean);
    assert_eq!(config.strategy(Field::Calorie), Strategy::Last);
}

#[test]
fn override_parse_errors() {
    assert_eq!(
        "heart_rate".parse::<Override>(),
        Err(ConfigError::MalformedOverride("heart_rate".to_string()))
    );
    assert_eq!(
        "pulse=max".parse::<Override>(),
        Err(ConfigError::UnknownField("pulse".to_string()))
    );
    assert_eq!(
        "speed=median".parse::<Override>(),
        Err(ConfigError::UnknownStrategy("median".to_string()))
    );

    let time: Override = "time=max".parse().unwrap();
    assert_eq!(
        AggregationConfig::with_overrides(&[time]),
        Err(ConfigError::NotAggregatable(Field::StartTime))
    );
}

#[test]
fn accumulator_keeps_groups_apart() {
    let samples = [
        RawSample::HeartRate {
            start_time: 1_000,
            heart_rate: 72.0,
        },
        RawSample::HeartRate {
            start_time: 3_000,
            heart_rate: 80.0,
        },
        RawSample::DistanceOnly {
            start_time: 2_000,
            distance: 10.0,
        },
    ];
    let acc = Accumulator::from_samples(&samples, &[]);
    assert_eq!(acc.len(), 2);

    let hr = acc
        .state(
            BucketKey {
                group: FieldGroup::HeartRate,
                start: 0,
            },
            Field::HeartRate,
        )
        .unwrap();
    assert_eq!(hr.count(), 2);
    assert_eq!(hr.resolve(Strategy::Mean), Some(76.0));

    let dist = acc
        .state(
            BucketKey {
                group: FieldGroup::DistanceOnly,
                start: 0,
            },
            Field::Distance,
        )
        .unwrap();
    assert_eq!(dist.resolve(Strategy::Last), Some(10.0));
}
