use crate::engine::common::waveform::Waveform;
use serde::{Deserialize, Serialize};

/// Per-acquisition settings supplied by the caller alongside the waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementParams {
    /// Carrier frequency of the tone burst (Hz)
    pub carrier_frequency: f64,
    /// Number of cycles in the tone burst
    pub cycles: u32,
    /// Apply the band-pass filter before searching for echoes
    pub filter: bool,
    /// Upsample to the configured rate before searching for echoes
    pub upsample: bool,
    /// Start of the first-echo search window (s)
    pub cutoff_time: f64,
}

impl Default for MeasurementParams {
    fn default() -> Self {
        MeasurementParams {
            carrier_frequency: 2.0e6,
            cycles: 5,
            filter: true,
            upsample: true,
            cutoff_time: 1.10e-4,
        }
    }
}

/// Half-open search interval `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakWindow {
    pub start: f64,
    pub end: f64,
}

impl PeakWindow {
    pub fn new(start: f64, end: f64) -> PeakWindow {
        PeakWindow { start, end }
    }

    /// Window running from `start` to the end of the record.
    pub fn from_start(start: f64) -> PeakWindow {
        PeakWindow {
            start,
            end: f64::INFINITY,
        }
    }

    /// Window following a located echo, shifted by `offset` and `width` seconds long.
    pub fn after(arrival_time: f64, offset: f64, width: f64) -> PeakWindow {
        let start = arrival_time + offset;
        PeakWindow {
            start,
            end: start + width,
        }
    }
}

/// A located reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoEvent {
    /// Sample index of the peak in the searched waveform
    pub index: usize,
    /// Sub-sample arrival time (s)
    pub arrival_time: f64,
    /// Amplitude of the peak sample
    pub amplitude: f64,
}

/// Velocity and attenuation derived from two reflections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub arrival_time_1: f64,
    pub arrival_time_2: f64,
    pub amplitude_1: f64,
    pub amplitude_2: f64,
    /// Speed of sound (m/s)
    pub velocity: f64,
    /// Attenuation (1/m)
    pub attenuation: f64,
}

impl MeasurementResult {
    pub fn time_of_flight(&self) -> f64 {
        self.arrival_time_2 - self.arrival_time_1
    }
}

/// Result of a full engine run together with the processed waveform it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub result: MeasurementResult,
    pub first_echo: EchoEvent,
    pub second_echo: EchoEvent,
    pub waveform: Waveform,
}
