//! Software stand-ins for the rig, used by tests, benches and the demo mode of the CLI.
use crate::acquisition::{Acquisition, AcquisitionError, TemperatureSensor, WaveformSource};
use crate::engine::common::error::EngineError;
use crate::engine::common::waveform::Waveform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// A reflection in a synthetic record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    /// Time of the envelope maximum, which coincides with a carrier crest (s)
    pub arrival_time: f64,
    pub amplitude: f64,
}

impl Pulse {
    pub fn new(arrival_time: f64, amplitude: f64) -> Pulse {
        Pulse {
            arrival_time,
            amplitude,
        }
    }
}

/// Gaussian-enveloped tone bursts on a uniform time base.
///
/// The envelope standard deviation is a quarter of the burst length
/// (`cycles / carrier_frequency`) and the envelope is cut to zero beyond one burst
/// length either side of the arrival time.
#[derive(Debug, Clone)]
pub struct SyntheticEcho {
    sample_rate: f64,
    len: usize,
    start_time: f64,
    carrier_frequency: f64,
    cycles: u32,
    pulses: Vec<Pulse>,
    noise_amplitude: f64,
    rng: StdRng,
    auxiliary_voltage: f64,
}

impl SyntheticEcho {
    pub fn new(sample_rate: f64, len: usize, carrier_frequency: f64, cycles: u32) -> SyntheticEcho {
        SyntheticEcho {
            sample_rate,
            len,
            start_time: 0.0,
            carrier_frequency,
            cycles,
            pulses: vec![],
            noise_amplitude: 0.0,
            rng: StdRng::seed_from_u64(0),
            auxiliary_voltage: 0.0,
        }
    }

    pub fn with_pulse(mut self, pulse: Pulse) -> SyntheticEcho {
        self.pulses.push(pulse);
        self
    }

    pub fn with_start_time(mut self, start_time: f64) -> SyntheticEcho {
        self.start_time = start_time;
        self
    }

    /// Adds uniform noise in `[-amplitude, amplitude)` from a seeded generator.
    pub fn with_noise(mut self, amplitude: f64, seed: u64) -> SyntheticEcho {
        self.noise_amplitude = amplitude;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_auxiliary_voltage(mut self, voltage: f64) -> SyntheticEcho {
        self.auxiliary_voltage = voltage;
        self
    }

    fn burst_length(&self) -> f64 {
        self.cycles as f64 / self.carrier_frequency
    }

    /// Noise-free signal value at time `t`
    pub fn signal_at(&self, t: f64) -> f64 {
        let burst = self.burst_length();
        let sigma = burst / 4.0;
        self.pulses
            .iter()
            .filter(|p| (t - p.arrival_time).abs() <= burst)
            .map(|p| {
                let dt = t - p.arrival_time;
                let envelope = (-dt * dt / (2.0 * sigma * sigma)).exp();
                p.amplitude * envelope * (2.0 * PI * self.carrier_frequency * dt).cos()
            })
            .sum()
    }

    /// The noise-free record.
    pub fn waveform(&self) -> Result<Waveform, EngineError> {
        let samples = (0..self.len)
            .map(|i| self.signal_at(self.start_time + i as f64 / self.sample_rate))
            .collect();
        Waveform::from_sample_rate(samples, self.sample_rate, self.start_time)
    }

    /// The record with a fresh noise realisation averaged `averages` times.
    fn averaged(&mut self, averages: u32) -> Result<Waveform, EngineError> {
        let clean = self.waveform()?;
        if self.noise_amplitude == 0.0 {
            return Ok(clean);
        }
        let count = averages.max(1);
        let mut noise = vec![0.0; clean.len()];
        for _ in 0..count {
            for n in noise.iter_mut() {
                *n += self.rng.gen_range(-self.noise_amplitude..self.noise_amplitude);
            }
        }
        let samples = clean
            .amplitude()
            .iter()
            .zip(noise)
            .map(|(s, n)| s + n / count as f64)
            .collect();
        Waveform::new(clean.time().to_vec(), samples)
    }
}

impl WaveformSource for SyntheticEcho {
    fn acquire(&mut self, averages: u32) -> Result<Acquisition, AcquisitionError> {
        let waveform = self
            .averaged(averages)
            .map_err(|e| AcquisitionError::Failed(e.to_string()))?;
        Ok(Acquisition {
            waveform,
            auxiliary_voltage: self.auxiliary_voltage,
        })
    }
}

/// A sensor that always reads the same temperature.
#[derive(Debug, Clone, Copy)]
pub struct FixedTemperature(pub f64);

impl TemperatureSensor for FixedTemperature {
    fn read_temperature(&mut self) -> Result<f64, AcquisitionError> {
        Ok(self.0)
    }
}

/// A sensor whose reading changes by `step` degrees on every read, as in a cooling sweep.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureRamp {
    current: f64,
    step: f64,
}

impl TemperatureRamp {
    pub fn new(start: f64, step: f64) -> TemperatureRamp {
        TemperatureRamp {
            current: start,
            step,
        }
    }
}

impl TemperatureSensor for TemperatureRamp {
    fn read_temperature(&mut self) -> Result<f64, AcquisitionError> {
        let reading = self.current;
        self.current += self.step;
        Ok(reading)
    }
}
