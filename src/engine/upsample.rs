//! Band-limited interpolation by zero-padding the spectrum.
use crate::engine::common::error::EngineError;
use crate::engine::common::waveform::Waveform;
use is_close::is_close;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use tracing::warn;

type Result<T> = std::result::Result<T, EngineError>;

/// Target sample rate for spectral upsampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpsampleSpec {
    /// Target sample rate (Hz)
    pub target_rate: f64,
}

impl Default for UpsampleSpec {
    fn default() -> Self {
        UpsampleSpec { target_rate: 1.0e9 }
    }
}

impl UpsampleSpec {
    pub fn new(target_rate: f64) -> UpsampleSpec {
        UpsampleSpec { target_rate }
    }

    /// Ratio of the target rate to `native_rate`, or `None` when upsampling does not apply.
    pub fn factor(&self, native_rate: f64) -> Option<f64> {
        if native_rate > 0.0 && self.target_rate >= native_rate {
            Some(self.target_rate / native_rate)
        } else {
            None
        }
    }
}

/// Resamples the spectrum of `samples` from `n` to `m` bins and returns the real part
/// of the inverse transform, scaled by `factor`.
///
/// Bins `[0, n/2)` keep their position, bins `[n/2, n)` are moved to the end of the
/// longer spectrum so that bin `n-1-k` lands on `m-1-k`. Everything in between is zero.
fn spectral_resample(samples: &[f64], m: usize, factor: f64) -> Vec<f64> {
    let n = samples.len();
    let mut planner = FftPlanner::<f64>::new();

    let mut spectrum: Vec<Complex<f64>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut spectrum);

    let half = n / 2;
    let mut padded = vec![Complex::new(0.0, 0.0); m];
    padded[..half].copy_from_slice(&spectrum[..half]);
    padded[m - (n - half)..].copy_from_slice(&spectrum[half..]);

    planner.plan_fft_inverse(m).process(&mut padded);

    // the inverse transform is unnormalised; 1/m then the amplitude correction
    let scale = factor / m as f64;
    padded.iter().map(|c| c.re * scale).collect()
}

/// Interpolates the waveform onto a uniform grid at the target rate.
///
/// The output has `floor(factor * len)` samples starting at the input's first time value.
/// When the target rate is below the native rate the waveform is returned unchanged.
///
/// # Errors
/// Will return `Err(EngineError::InvalidSpec)` if the target rate is not a positive number.
pub fn upsample(waveform: &Waveform, spec: &UpsampleSpec) -> Result<Waveform> {
    if !spec.target_rate.is_finite() || spec.target_rate <= 0.0 {
        Err(EngineError::InvalidSpec(format!(
            "upsampling target rate must be positive, got {}",
            spec.target_rate
        )))?
    }
    let native_rate = waveform.sample_rate();
    let factor = match spec.factor(native_rate) {
        Some(f) => f,
        None => {
            warn!(
                native_rate,
                target_rate = spec.target_rate,
                "target rate below native rate, skipping upsampling"
            );
            return Ok(waveform.clone());
        }
    };
    if is_close!(factor, 1.0) {
        return Ok(waveform.clone());
    }

    // the native rate comes from a subtraction of time values, so an integer
    // product may land a hair below the integer
    let exact = factor * waveform.len() as f64;
    let m = if (exact - exact.round()).abs() < 1.0e-9 * exact {
        exact.round() as usize
    } else {
        exact.floor() as usize
    };
    let samples = spectral_resample(waveform.amplitude(), m, factor);
    Waveform::from_sample_rate(samples, spec.target_rate, waveform.start_time())
}
