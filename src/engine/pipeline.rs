//! Full echo measurement: conditioning, two-window peak search, timing and properties.
use crate::engine::common::error::EngineError;
use crate::engine::common::structs::{Measurement, MeasurementParams, PeakWindow};
use crate::engine::common::waveform::Waveform;
use crate::engine::filter::{bandpass, FilterSpec};
use crate::engine::peaks::{first_peak, PeakSearch};
use crate::engine::properties::acoustic_properties;
use crate::engine::timing::echo_event;
use crate::engine::upsample::{upsample, UpsampleSpec};
use crate::utils::config::EngineConfig;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::debug;

type Result<T> = std::result::Result<T, EngineError>;

/// Filters and upsamples the waveform as requested by `params`.
///
/// # Errors
/// Will return `Err(EngineError::InvalidSpec)` if the filter or upsampling settings cannot be
/// applied at the waveform's sample rate.
pub fn condition(
    waveform: &Waveform,
    params: &MeasurementParams,
    config: &EngineConfig,
) -> Result<Waveform> {
    let mut processed = waveform.clone();
    if params.filter {
        let spec = FilterSpec::for_carrier(params.carrier_frequency, &config.filter);
        debug!(
            low = spec.low_cutoff,
            high = spec.high_cutoff,
            order = spec.order,
            "band-pass filtering"
        );
        processed = bandpass(&processed, &spec)?;
    }
    if params.upsample {
        let native_rate = processed.sample_rate();
        processed = upsample(&processed, &UpsampleSpec::new(config.upsample_rate))?;
        debug!(
            native_rate,
            target_rate = config.upsample_rate,
            samples = processed.len(),
            "upsampled"
        );
    }
    Ok(processed)
}

/// Derives velocity and attenuation from a single acquired waveform.
///
/// The first echo is the earliest accepted peak after `params.cutoff_time`; the second is
/// searched in the window the configuration places after the first echo's arrival time.
///
/// # Errors
/// Will return `Err` if the configuration is invalid, either echo cannot be found, the
/// timing interpolation is degenerate, or the echoes give a non-physical result.
pub fn measure(
    waveform: &Waveform,
    params: &MeasurementParams,
    config: &EngineConfig,
) -> Result<Measurement> {
    config.validate()?;
    let processed = condition(waveform, params, config)?;

    let search = PeakSearch::for_burst(
        config.threshold_fraction,
        config.separation_factor,
        processed.sample_rate(),
        params.cycles,
        params.carrier_frequency,
    )?;

    let first_window = PeakWindow::from_start(params.cutoff_time);
    let first_echo = echo_event(&processed, first_peak(&processed, &first_window, &search)?)?;
    debug!(
        index = first_echo.index,
        arrival_time = first_echo.arrival_time,
        amplitude = first_echo.amplitude,
        "first echo"
    );

    let second_window = PeakWindow::after(
        first_echo.arrival_time,
        config.second_window_offset,
        config.second_window_width,
    );
    let second_echo = echo_event(&processed, first_peak(&processed, &second_window, &search)?)?;
    debug!(
        index = second_echo.index,
        arrival_time = second_echo.arrival_time,
        amplitude = second_echo.amplitude,
        "second echo"
    );

    let result = acoustic_properties(&first_echo, &second_echo, config.path_length)?;
    Ok(Measurement {
        result,
        first_echo,
        second_echo,
        waveform: processed,
    })
}

/// Measures a collection of waveforms with shared settings in parallel.
///
/// # Errors
/// Will return the first `Err` encountered, in input order.
pub fn par_measure(
    waveforms: &[Waveform],
    params: &MeasurementParams,
    config: &EngineConfig,
) -> Result<Vec<Measurement>> {
    let results: Vec<Result<Measurement>> = waveforms
        .par_iter()
        .map(|wf| measure(wf, params, config))
        .collect();

    let mut measurements = vec![];
    for res in results {
        match res {
            Ok(x) => measurements.push(x),
            Err(e) => Err(e)?,
        }
    }
    Ok(measurements)
}
