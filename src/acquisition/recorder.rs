//! One complete measurement cycle against the rig.
use crate::acquisition::{TemperatureSensor, WaveformSource};
use crate::calibration::fluids::{fluid_properties, FluidProperties};
use crate::engine::common::structs::{MeasurementParams, MeasurementResult};
use crate::engine::pipeline::measure;
use crate::error::EchopropError;
use crate::utils::config::EngineConfig;
use chrono::{DateTime, Local};
use tracing::info;

/// Settings shared by every cycle of a recording session.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSettings {
    /// Number of captures the source averages per acquisition
    pub averages: u32,
    pub params: MeasurementParams,
    pub config: EngineConfig,
    /// Reference fluid whose tabulated properties are stored with each record
    pub fluid: Option<String>,
}

impl Default for RecordSettings {
    fn default() -> Self {
        RecordSettings {
            averages: 64,
            params: MeasurementParams::default(),
            config: EngineConfig::default(),
            fluid: None,
        }
    }
}

/// One row of a measurement log.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub timestamp: DateTime<Local>,
    /// Mean of the readings taken before and after the acquisition (degrees C)
    pub temperature: f64,
    pub auxiliary_voltage: f64,
    pub result: MeasurementResult,
    /// Tabulated properties of the reference fluid at `temperature`
    pub fluid: Option<FluidProperties>,
}

/// Runs one acquisition and measurement.
///
/// The temperature is read immediately before and after the acquisition and the two
/// readings are averaged.
///
/// # Errors
/// Will return `Err` if either collaborator fails, the engine rejects the waveform, or
/// the reference fluid is not registered.
pub fn record_once<S, T>(
    source: &mut S,
    sensor: &mut T,
    settings: &RecordSettings,
) -> Result<MeasurementRecord, EchopropError>
where
    S: WaveformSource + ?Sized,
    T: TemperatureSensor + ?Sized,
{
    let before = sensor.read_temperature()?;
    let acquisition = source.acquire(settings.averages)?;
    let after = sensor.read_temperature()?;
    let temperature = (before + after) / 2.0;
    let timestamp = Local::now();

    let measurement = measure(&acquisition.waveform, &settings.params, &settings.config)?;
    let fluid = match &settings.fluid {
        Some(name) => Some(fluid_properties(temperature, name)?),
        None => None,
    };

    info!(
        temperature,
        velocity = measurement.result.velocity,
        attenuation = measurement.result.attenuation,
        "recorded measurement"
    );

    Ok(MeasurementRecord {
        timestamp,
        temperature,
        auxiliary_voltage: acquisition.auxiliary_voltage,
        result: measurement.result,
        fluid,
    })
}
