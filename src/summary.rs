use crate::series::{SeriesConfig, live_data_csv};
use crate::types::{CompressedWorkout, LocationSample, RawSample, WorkoutRecord};

/// Projects the workout row onto the compact summary and attaches the resampled series.
///
/// Blank or non-numeric columns become `None` rather than zero, so a workout
/// without altitude data is distinguishable from a flat one.
pub fn reduce(
    workout: &WorkoutRecord,
    live_data: &[RawSample],
    location_data: &[LocationSample],
    config: &SeriesConfig,
) -> CompressedWorkout {
    CompressedWorkout {
        start_time: workout.start_time().unwrap_or_default().to_string(),
        end_time: workout.end_time().unwrap_or_default().to_string(),
        duration: workout.number("duration"),
        distance: workout.number("distance"),
        calories: workout.number("calorie"),
        mean_hr: workout.number("mean_heart_rate"),
        max_hr: workout.number("max_heart_rate"),
        min_hr: workout.number("min_heart_rate"),
        mean_speed: workout.number("mean_speed"),
        max_speed: workout.number("max_speed"),
        mean_cadence: workout.number("mean_cadence"),
        max_cadence: workout.number("max_cadence"),
        altitude_gain: workout.number("altitude_gain"),
        altitude_loss: workout.number("altitude_loss"),
        live_data: live_data_csv(live_data, location_data, config),
    }
}
