use crate::engine::common::error::EngineError;
use crate::engine::common::structs::EchoEvent;
use crate::engine::common::waveform::Waveform;

type Result<T> = std::result::Result<T, EngineError>;

/// Refines the arrival time of the peak at sample `index` from its two neighbours.
///
/// With `m1`, `m2` the slopes either side of the peak and `M = (m2 - m1) / (2 dT)`,
/// the arrival time is `t[index - 1] - m1 / M`.
///
/// # Errors
/// Will return `Err(EngineError::InvalidWaveform)` if `index` has no neighbour on either
/// side, or `Err(EngineError::DegenerateCurvature)` if the three samples are collinear.
pub fn refine_arrival_time(waveform: &Waveform, index: usize) -> Result<f64> {
    if index < 1 || index + 1 >= waveform.len() {
        Err(EngineError::InvalidWaveform(format!(
            "peak index {index} needs a neighbour on both sides in {} samples",
            waveform.len()
        )))?
    }
    let y = waveform.amplitude();
    let dt = waveform.dt();

    let m1 = (y[index] - y[index - 1]) / dt;
    let m2 = (y[index + 1] - y[index]) / dt;
    let curvature = (m2 - m1) / (2.0 * dt);
    if curvature == 0.0 || !curvature.is_finite() {
        Err(EngineError::DegenerateCurvature { index })?
    }
    Ok(waveform.time()[index - 1] - m1 / curvature)
}

/// Builds the echo event for the peak at `index`.
pub fn echo_event(waveform: &Waveform, index: usize) -> Result<EchoEvent> {
    Ok(EchoEvent {
        index,
        arrival_time: refine_arrival_time(waveform, index)?,
        amplitude: waveform.amplitude()[index],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampled(f: impl Fn(f64) -> f64, len: usize, dt: f64) -> Waveform {
        let samples = (0..len).map(|i| f(i as f64 * dt)).collect();
        Waveform::from_sample_rate(samples, 1.0 / dt, 0.0).unwrap()
    }

    #[test]
    fn symmetric_peak_lands_on_sample() {
        let dt = 1.0e-9;
        let wf = sampled(|t| 1.0 - ((t - 5.0e-9) / 1.0e-9).powi(2), 11, dt);
        let t = refine_arrival_time(&wf, 5).unwrap();
        assert!((t - 5.0e-9).abs() < 1.0e-15);
    }

    #[test]
    fn off_grid_peak_within_half_a_sample() {
        let dt = 1.0e-9;
        for offset in [-0.4, -0.2, 0.1, 0.3] {
            let centre = (5.0 + offset) * dt;
            let wf = sampled(|t| 2.0 - ((t - centre) / dt).powi(2), 11, dt);
            let t = refine_arrival_time(&wf, 5).unwrap();
            assert!((t - centre).abs() <= 0.5 * dt + 1.0e-18, "offset {offset}: {t}");
        }
    }

    #[test]
    fn offset_follows_slope_and_curvature() {
        // y = [0, 3, 2] at dT = 1: m1 = 3, m2 = -1, M = -2, t = 0 + 1.5
        let wf = Waveform::new(vec![0.0, 1.0, 2.0], vec![0.0, 3.0, 2.0]).unwrap();
        assert_eq!(refine_arrival_time(&wf, 1).unwrap(), 1.5);
    }

    #[test]
    fn collinear_samples_are_degenerate() {
        let wf = Waveform::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(
            refine_arrival_time(&wf, 1),
            Err(EngineError::DegenerateCurvature { index: 1 })
        );
        let flat = Waveform::new(vec![0.0, 1.0, 2.0], vec![1.0, 1.0, 1.0]).unwrap();
        assert!(matches!(
            refine_arrival_time(&flat, 1),
            Err(EngineError::DegenerateCurvature { .. })
        ));
    }

    #[test]
    fn edge_indices_are_rejected() {
        let wf = Waveform::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap();
        assert!(matches!(
            refine_arrival_time(&wf, 0),
            Err(EngineError::InvalidWaveform(_))
        ));
        assert!(matches!(
            refine_arrival_time(&wf, 2),
            Err(EngineError::InvalidWaveform(_))
        ));
    }

    #[test]
    fn event_carries_peak_amplitude() {
        let wf = Waveform::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap();
        let event = echo_event(&wf, 1).unwrap();
        assert_eq!(event.index, 1);
        assert_eq!(event.amplitude, 1.0);
        assert_eq!(event.arrival_time, 1.0);
    }
}
