//! Butterworth band-pass conditioning around the carrier frequency.
use crate::engine::common::error::EngineError;
use crate::engine::common::waveform::Waveform;
use crate::utils::config::FilterConfig;
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

type Result<T> = std::result::Result<T, EngineError>;

/// Band edges (Hz) and order of a digital Butterworth band-pass filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub low_cutoff: f64,
    pub high_cutoff: f64,
    pub order: usize,
}

impl FilterSpec {
    pub fn new(low_cutoff: f64, high_cutoff: f64, order: usize) -> FilterSpec {
        FilterSpec {
            low_cutoff,
            high_cutoff,
            order,
        }
    }

    /// Pass band `[low_factor * f, high_factor * f]` around the carrier `f`.
    pub fn for_carrier(carrier_frequency: f64, config: &FilterConfig) -> FilterSpec {
        FilterSpec {
            low_cutoff: config.low_factor * carrier_frequency,
            high_cutoff: config.high_factor * carrier_frequency,
            order: config.order,
        }
    }

    /// Band edges normalised to the Nyquist frequency.
    ///
    /// # Errors
    /// Will return `Err` if either cutoff is non-positive, the band is empty or inverted,
    /// or a cutoff reaches the Nyquist frequency.
    fn normalised_band(&self, sample_rate: f64) -> Result<(f64, f64)> {
        if self.order == 0 {
            Err(EngineError::InvalidSpec(
                "filter order must be at least 1".to_string(),
            ))?
        }
        if !(self.low_cutoff > 0.0 && self.high_cutoff > 0.0) {
            Err(EngineError::InvalidSpec(format!(
                "cutoffs must be positive, got [{}, {}] Hz",
                self.low_cutoff, self.high_cutoff
            )))?
        }
        if self.high_cutoff <= self.low_cutoff {
            Err(EngineError::InvalidSpec(format!(
                "high cutoff {} Hz must exceed low cutoff {} Hz",
                self.high_cutoff, self.low_cutoff
            )))?
        }
        let nyquist = 0.5 * sample_rate;
        let low = self.low_cutoff / nyquist;
        let high = self.high_cutoff / nyquist;
        if !(low < 1.0 && high < 1.0) {
            Err(EngineError::InvalidSpec(format!(
                "cutoffs [{}, {}] Hz must lie below the Nyquist frequency {} Hz",
                self.low_cutoff, self.high_cutoff, nyquist
            )))?
        }
        Ok((low, high))
    }

    /// Transfer function coefficients `(b, a)` for the given sample rate.
    ///
    /// The analog Butterworth prototype is shifted to the band with the low-pass to
    /// band-pass transform, then mapped to the z-plane with the pre-warped bilinear
    /// transform. Both vectors have `2 * order + 1` entries and `a[0] == 1`.
    pub fn coefficients(&self, sample_rate: f64) -> Result<(Vec<f64>, Vec<f64>)> {
        let (low, high) = self.normalised_band(sample_rate)?;
        let n = self.order;

        // bilinear transform constant for a normalised sample rate of 2
        let fs2 = 4.0;
        let warped_low = fs2 * (PI * low / 2.0).tan();
        let warped_high = fs2 * (PI * high / 2.0).tan();
        let bandwidth = warped_high - warped_low;
        let centre_sq = warped_low * warped_high;

        let prototype = (0..n).map(|k| {
            let m = 2.0 * k as f64 + 1.0 - n as f64;
            -Complex::from_polar(1.0, PI * m / (2.0 * n as f64))
        });

        let mut analog_poles = Vec::with_capacity(2 * n);
        for p in prototype {
            let scaled = p * (bandwidth / 2.0);
            let disc = (scaled * scaled - centre_sq).sqrt();
            analog_poles.push(scaled + disc);
            analog_poles.push(scaled - disc);
        }

        // n analog zeros at the origin map to z = 1, the n zeros at infinity to z = -1
        let mut zeros = vec![Complex::new(1.0, 0.0); n];
        zeros.extend(std::iter::repeat(Complex::new(-1.0, 0.0)).take(n));

        let poles: Vec<Complex<f64>> = analog_poles
            .iter()
            .map(|&p| (fs2 + p) / (fs2 - p))
            .collect();
        let denom = analog_poles
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, &p| acc * (fs2 - p));
        let gain = (Complex::new((bandwidth * fs2).powi(n as i32), 0.0) / denom).re;

        let b = poly(&zeros).iter().map(|c| gain * c.re).collect();
        let a = poly(&poles).iter().map(|c| c.re).collect();
        Ok((b, a))
    }
}

/// Expands monic polynomial coefficients, highest power first, from its roots.
fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &r in roots {
        let mut next = vec![Complex::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * r;
        }
        coeffs = next;
    }
    coeffs
}

/// Runs the recursion `a[0] y[n] = sum(b[k] x[n-k]) - sum(a[k] y[n-k])` from rest
/// (direct form II transposed).
pub(crate) fn lfilter(b: &[f64], a: &[f64], x: &[f64]) -> Vec<f64> {
    let n = b.len().max(a.len());
    let a0 = a[0];
    let b: Vec<f64> = (0..n).map(|i| b.get(i).copied().unwrap_or(0.0) / a0).collect();
    let a: Vec<f64> = (0..n).map(|i| a.get(i).copied().unwrap_or(0.0) / a0).collect();
    let mut state = vec![0.0; n];

    x.iter()
        .map(|&xn| {
            let yn = b[0] * xn + state[0];
            for i in 1..n {
                state[i - 1] = b[i] * xn + state[i] - a[i] * yn;
            }
            yn
        })
        .collect()
}

/// Applies the band-pass filter to the waveform, keeping its time base and length.
///
/// # Errors
/// Will return `Err(EngineError::InvalidSpec)` if the filter cannot be realised at the
/// waveform's sample rate.
pub fn bandpass(waveform: &Waveform, spec: &FilterSpec) -> Result<Waveform> {
    let (b, a) = spec.coefficients(waveform.sample_rate())?;
    Ok(waveform.with_amplitude(lfilter(&b, &a, waveform.amplitude())))
}
