use crate::engine::common::error::EngineError;
use crate::engine::common::structs::{EchoEvent, MeasurementResult};

type Result<T> = std::result::Result<T, EngineError>;

/// Derives the speed of sound and the attenuation from two successive reflections
/// travelling an extra `2 * path_length` between them.
///
/// # Errors
/// Will return `Err(EngineError::InvalidMeasurement)` if the second echo does not arrive
/// after the first or either amplitude is not positive, and `Err(EngineError::InvalidSpec)`
/// for a non-positive path length.
pub fn acoustic_properties(
    first: &EchoEvent,
    second: &EchoEvent,
    path_length: f64,
) -> Result<MeasurementResult> {
    if !(path_length > 0.0 && path_length.is_finite()) {
        Err(EngineError::InvalidSpec(format!(
            "path length must be positive, got {path_length}"
        )))?
    }
    let time_of_flight = second.arrival_time - first.arrival_time;
    if !(time_of_flight > 0.0) {
        Err(EngineError::InvalidMeasurement(format!(
            "second echo at {:e} s does not follow first echo at {:e} s",
            second.arrival_time, first.arrival_time
        )))?
    }
    if !(first.amplitude > 0.0 && second.amplitude > 0.0) {
        Err(EngineError::InvalidMeasurement(format!(
            "echo amplitudes must be positive, got {} and {}",
            first.amplitude, second.amplitude
        )))?
    }

    let velocity = 2.0 * path_length / time_of_flight;
    let attenuation = -(first.amplitude / second.amplitude).ln() / (2.0 * path_length);
    Ok(MeasurementResult {
        arrival_time_1: first.arrival_time,
        arrival_time_2: second.arrival_time,
        amplitude_1: first.amplitude,
        amplitude_2: second.amplitude,
        velocity,
        attenuation,
    })
}
