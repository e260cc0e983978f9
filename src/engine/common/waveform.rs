use crate::engine::common::error::EngineError;

type Result<T> = std::result::Result<T, EngineError>;

/// Amplitude samples on a uniform time base.
///
/// The time step is taken from the first two time values and is assumed
/// constant over the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    time: Vec<f64>,
    amplitude: Vec<f64>,
}

impl Waveform {
    /// Pairs a time base with its amplitude samples.
    ///
    /// # Errors
    /// Will return `Err` if the two vectors differ in length, hold fewer than two
    /// samples, or the time step is not a positive finite number.
    pub fn new(time: Vec<f64>, amplitude: Vec<f64>) -> Result<Waveform> {
        if time.len() != amplitude.len() {
            Err(EngineError::InvalidWaveform(format!(
                "time base has {} samples but amplitude has {}",
                time.len(),
                amplitude.len()
            )))?
        }
        if time.len() < 2 {
            Err(EngineError::InvalidWaveform(
                "at least two samples are needed to derive a time step".to_string(),
            ))?
        }
        let dt = time[1] - time[0];
        if !dt.is_finite() || dt <= 0.0 {
            Err(EngineError::InvalidWaveform(format!(
                "time step must be positive, got {dt:e}"
            )))?
        }
        Ok(Waveform { time, amplitude })
    }

    /// Builds the time base `start + i / sample_rate` for the given samples.
    ///
    /// # Errors
    /// Will return `Err` if the sample rate is not positive or fewer than two samples are given.
    pub fn from_sample_rate(amplitude: Vec<f64>, sample_rate: f64, start: f64) -> Result<Waveform> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            Err(EngineError::InvalidWaveform(format!(
                "sample rate must be positive, got {sample_rate:e}"
            )))?
        }
        let time = (0..amplitude.len())
            .map(|i| start + i as f64 / sample_rate)
            .collect();
        Waveform::new(time, amplitude)
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    pub fn len(&self) -> usize {
        self.amplitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitude.is_empty()
    }

    /// Sample interval in seconds
    pub fn dt(&self) -> f64 {
        self.time[1] - self.time[0]
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        1.0 / self.dt()
    }

    pub fn start_time(&self) -> f64 {
        self.time[0]
    }

    /// Index of the sample whose time is closest to `t`, clamped to `[0, len]`.
    ///
    /// Times past the end of the record map to `len`, so the result can be used
    /// as an exclusive slice bound.
    pub fn index_at(&self, t: f64) -> usize {
        let offset = (t - self.time[0]) / self.dt();
        if offset.is_nan() || offset <= 0.0 {
            0
        } else if offset >= self.len() as f64 {
            self.len()
        } else {
            offset.round() as usize
        }
    }

    /// Replaces the amplitudes while keeping the time base.
    pub(crate) fn with_amplitude(&self, amplitude: Vec<f64>) -> Waveform {
        Waveform {
            time: self.time.clone(),
            amplitude,
        }
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.time, self.amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = Waveform::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidWaveform(_)));
    }

    #[test]
    fn rejects_non_increasing_time() {
        assert!(Waveform::new(vec![1.0, 1.0], vec![0.0, 0.0]).is_err());
        assert!(Waveform::new(vec![1.0, 0.5], vec![0.0, 0.0]).is_err());
        assert!(Waveform::new(vec![0.0], vec![0.0]).is_err());
    }

    #[test]
    fn index_at_rounds_and_clamps() {
        let wf = Waveform::from_sample_rate(vec![0.0; 10], 1.0e6, 5.0e-6).unwrap();
        assert_eq!(wf.index_at(0.0), 0);
        assert_eq!(wf.index_at(5.0e-6), 0);
        assert_eq!(wf.index_at(7.4e-6), 2);
        assert_eq!(wf.index_at(7.6e-6), 3);
        assert_eq!(wf.index_at(1.0), 10);
        assert_eq!(wf.index_at(f64::INFINITY), 10);
    }

    #[test]
    fn sample_rate_from_time_base() {
        let wf = Waveform::from_sample_rate(vec![0.0; 4], 50.0e6, 0.0).unwrap();
        assert!((wf.sample_rate() - 50.0e6).abs() < 1.0e-3);
    }
}
