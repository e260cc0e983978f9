//! Echo peak search within a time window.
use crate::engine::common::error::EngineError;
use crate::engine::common::structs::PeakWindow;
use crate::engine::common::waveform::Waveform;
use itertools::Itertools;

type Result<T> = std::result::Result<T, EngineError>;

/// Height and spacing constraints for accepting a local maximum as an echo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSearch {
    /// Minimum peak height as a fraction of the window maximum
    pub threshold_fraction: f64,
    /// Minimum distance between accepted peaks (samples)
    pub min_separation: usize,
}

impl PeakSearch {
    pub fn new(threshold_fraction: f64, min_separation: usize) -> PeakSearch {
        PeakSearch {
            threshold_fraction,
            min_separation,
        }
    }

    /// Separation of `ceil(factor * fs * cycles / f)` samples, i.e. `factor` burst lengths.
    ///
    /// # Errors
    /// Will return `Err(EngineError::InvalidSpec)` if the carrier frequency, cycle count
    /// or factor is not positive.
    pub fn for_burst(
        threshold_fraction: f64,
        separation_factor: f64,
        sample_rate: f64,
        cycles: u32,
        carrier_frequency: f64,
    ) -> Result<PeakSearch> {
        if !(carrier_frequency > 0.0 && carrier_frequency.is_finite()) {
            Err(EngineError::InvalidSpec(format!(
                "carrier frequency must be positive, got {carrier_frequency}"
            )))?
        }
        if cycles == 0 {
            Err(EngineError::InvalidSpec(
                "tone burst must have at least one cycle".to_string(),
            ))?
        }
        if !(separation_factor > 0.0) {
            Err(EngineError::InvalidSpec(format!(
                "separation factor must be positive, got {separation_factor}"
            )))?
        }
        let separation = (separation_factor * sample_rate * cycles as f64 / carrier_frequency).ceil();
        Ok(PeakSearch {
            threshold_fraction,
            min_separation: (separation as usize).max(1),
        })
    }
}

/// Indices of local maxima in `samples` that clear the height threshold and are at least
/// `min_separation` apart, in ascending order.
///
/// A local maximum is strictly greater than both neighbours, so the first and last
/// samples never qualify. When two candidates are too close the higher one wins, and
/// between equal heights the earlier one wins.
pub fn find_peaks(samples: &[f64], search: &PeakSearch) -> Vec<usize> {
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let height = search.threshold_fraction * max;

    let candidates: Vec<usize> = samples
        .iter()
        .tuple_windows()
        .enumerate()
        .filter(|&(_, (prev, cur, next))| cur > prev && cur > next && *cur > height)
        .map(|(i, _)| i + 1)
        .collect();

    // highest first; the sort is stable so equal heights stay in scan order
    let mut priority: Vec<usize> = (0..candidates.len()).collect();
    priority.sort_by(|&i, &j| samples[candidates[j]].total_cmp(&samples[candidates[i]]));

    let mut keep = vec![true; candidates.len()];
    for i in priority {
        if !keep[i] {
            continue;
        }
        let pos = candidates[i];
        let mut k = i;
        while k > 0 && pos - candidates[k - 1] < search.min_separation {
            k -= 1;
            keep[k] = false;
        }
        let mut k = i + 1;
        while k < candidates.len() && candidates[k] - pos < search.min_separation {
            keep[k] = false;
            k += 1;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect()
}

/// Searches the part of the waveform inside `window` and returns the accepted peak
/// indices, relative to the full waveform.
///
/// # Errors
/// Will return `Err(EngineError::NoPeakFound)` if the window holds no acceptable peak,
/// or `Err(EngineError::InvalidWaveform)` if the waveform is shorter than three samples.
pub fn locate_peaks(
    waveform: &Waveform,
    window: &PeakWindow,
    search: &PeakSearch,
) -> Result<Vec<usize>> {
    if waveform.len() < 3 {
        Err(EngineError::InvalidWaveform(format!(
            "peak search needs at least 3 samples, got {}",
            waveform.len()
        )))?
    }
    let start = waveform.index_at(window.start);
    let end = waveform.index_at(window.end);
    if end <= start {
        Err(EngineError::NoPeakFound {
            start: window.start,
            end: window.end,
        })?
    }
    let peaks: Vec<usize> = find_peaks(&waveform.amplitude()[start..end], search)
        .into_iter()
        .map(|i| i + start)
        .collect();
    if peaks.is_empty() {
        Err(EngineError::NoPeakFound {
            start: window.start,
            end: window.end,
        })?
    }
    Ok(peaks)
}

/// Earliest accepted peak in the window.
pub fn first_peak(waveform: &Waveform, window: &PeakWindow, search: &PeakSearch) -> Result<usize> {
    Ok(locate_peaks(waveform, window, search)?[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_local_maxima_only() {
        let samples = [0.0, 1.0, 1.0, 0.0, 2.0, 0.0, 3.0];
        let peaks = find_peaks(&samples, &PeakSearch::new(0.1, 1));
        assert_eq!(peaks, vec![4]);
    }

    #[test]
    fn threshold_is_relative_to_window_maximum() {
        let samples = [0.0, 0.5, 0.0, 10.0, 0.0, 1.5, 0.0];
        assert_eq!(find_peaks(&samples, &PeakSearch::new(0.1, 1)), vec![3, 5]);
        assert_eq!(find_peaks(&samples, &PeakSearch::new(0.2, 1)), vec![3]);
    }

    #[test]
    fn higher_peak_suppresses_close_neighbours() {
        let samples = [0.0, 2.0, 0.0, 5.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0, 0.0];
        // 1 and 5 lie within 3 samples of 3; 9 is 6 away
        assert_eq!(find_peaks(&samples, &PeakSearch::new(0.1, 3)), vec![3, 9]);
        assert_eq!(find_peaks(&samples, &PeakSearch::new(0.1, 2)), vec![1, 3, 5, 9]);
    }

    #[test]
    fn equal_heights_keep_earliest() {
        let samples = [0.0, 4.0, 0.0, 4.0, 0.0];
        assert_eq!(find_peaks(&samples, &PeakSearch::new(0.1, 3)), vec![1]);
    }

    #[test]
    fn separation_from_burst_length() {
        let search = PeakSearch::for_burst(0.1, 3.0, 1.0e9, 5, 2.0e6).unwrap();
        assert_eq!(search.min_separation, 7500);
        let search = PeakSearch::for_burst(0.1, 3.0, 50.0e6, 3, 1.5e6).unwrap();
        assert_eq!(search.min_separation, 300);
        assert!(PeakSearch::for_burst(0.1, 3.0, 50.0e6, 0, 1.5e6).is_err());
        assert!(PeakSearch::for_burst(0.1, 3.0, 50.0e6, 5, 0.0).is_err());
    }

    #[test]
    fn window_restricts_search_and_indices_are_global() {
        let mut samples = vec![0.0; 100];
        samples[20] = 5.0;
        samples[60] = 1.0;
        let wf = Waveform::from_sample_rate(samples, 1.0e6, 0.0).unwrap();
        let search = PeakSearch::new(0.1, 1);

        let peaks = locate_peaks(&wf, &PeakWindow::from_start(0.0), &search).unwrap();
        assert_eq!(peaks, vec![20, 60]);
        // the small echo clears the threshold once the large one is outside the window
        let peaks = locate_peaks(&wf, &PeakWindow::new(40.0e-6, 80.0e-6), &search).unwrap();
        assert_eq!(peaks, vec![60]);
        assert_eq!(first_peak(&wf, &PeakWindow::from_start(30.0e-6), &search).unwrap(), 60);
    }

    #[test]
    fn all_zero_window_has_no_peak() {
        let wf = Waveform::from_sample_rate(vec![0.0; 64], 1.0e6, 0.0).unwrap();
        let err = locate_peaks(&wf, &PeakWindow::from_start(0.0), &PeakSearch::new(0.1, 1)).unwrap_err();
        assert!(matches!(err, EngineError::NoPeakFound { .. }));
    }

    #[test]
    fn window_past_the_record_has_no_peak() {
        let wf = Waveform::from_sample_rate(vec![0.0, 1.0, 0.0], 1.0e6, 0.0).unwrap();
        let err = locate_peaks(&wf, &PeakWindow::new(1.0, 2.0), &PeakSearch::new(0.1, 1)).unwrap_err();
        assert!(matches!(err, EngineError::NoPeakFound { .. }));
    }
}
