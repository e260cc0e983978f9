//! Capability interfaces for the measurement rig.
//!
//! The engine never talks to hardware. An oscilloscope/pulser adapter implements
//! [`WaveformSource`], a thermometer adapter implements [`TemperatureSensor`], and
//! [`recorder`] and [`worker`] drive them around the engine. [`synthetic`] provides
//! software stand-ins for both.

pub mod recorder;
pub mod synthetic;
pub mod worker;

use crate::engine::common::waveform::Waveform;
use thiserror::Error;

/// Failures reported by acquisition collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcquisitionError {
    /// The device is not connected or stopped responding
    #[error("device not connected: {0}")]
    NotConnected(String),

    /// The device returned data that cannot be used
    #[error("acquisition failed: {0}")]
    Failed(String),

    /// A temperature reading could not be taken
    #[error("temperature read failed: {0}")]
    Temperature(String),
}

/// One averaged capture from the rig.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub waveform: Waveform,
    /// Voltage on the auxiliary channel (e.g. a PT1000 bridge), recorded alongside the echo
    pub auxiliary_voltage: f64,
}

/// Something that can fire the pulser and return an averaged echo waveform.
pub trait WaveformSource {
    /// Capture `averages` records and return their mean.
    fn acquire(&mut self, averages: u32) -> Result<Acquisition, AcquisitionError>;
}

/// Something that reads the sample temperature in degrees Celsius.
pub trait TemperatureSensor {
    fn read_temperature(&mut self) -> Result<f64, AcquisitionError>;
}

impl<T: WaveformSource + ?Sized> WaveformSource for Box<T> {
    fn acquire(&mut self, averages: u32) -> Result<Acquisition, AcquisitionError> {
        (**self).acquire(averages)
    }
}

impl<T: TemperatureSensor + ?Sized> TemperatureSensor for Box<T> {
    fn read_temperature(&mut self) -> Result<f64, AcquisitionError> {
        (**self).read_temperature()
    }
}
