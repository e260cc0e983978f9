//! Ultrasonic pulse-echo processing: band-pass conditioning, spectral upsampling,
//! two-window echo search with sub-sample timing, and the velocity and attenuation
//! derived from the two echoes. Reference-fluid density and viscosity tables are
//! provided for validating a rig against known oils.
pub mod acquisition;
pub mod calibration;
pub mod engine;
pub mod error;
pub mod utils;

pub use crate::calibration::fluids::{fluid_properties, FluidProperties};
pub use crate::engine::common::error::EngineError;
pub use crate::engine::common::structs::{MeasurementParams, MeasurementResult};
pub use crate::engine::common::waveform::Waveform;
pub use crate::engine::pipeline::{condition, measure, par_measure};
pub use crate::utils::config::EngineConfig;

#[cfg(feature = "python")]
mod python {
    use crate::calibration::fluids;
    use crate::engine::common::structs::MeasurementParams;
    use crate::engine::common::waveform::Waveform;
    use crate::engine::pipeline::{condition, measure};
    use crate::utils::config::EngineConfig;
    use numpy::{PyArray1, PyReadonlyArray1};
    use pyo3::prelude::*;

    type Arrays<'py> = (Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>);

    fn to_waveform(time: PyReadonlyArray1<'_, f64>, data: PyReadonlyArray1<'_, f64>) -> PyResult<Waveform> {
        Ok(Waveform::new(
            time.as_array().to_vec(),
            data.as_array().to_vec(),
        )?)
    }

    /// Band-pass filters and/or upsamples a waveform, returning the new time base and samples.
    #[pyfunction]
    #[pyo3(name = "signal_process")]
    #[pyo3(
        text_signature = "(time: np.ndarray, data: np.ndarray, filter: bool, upsample: bool, frequency: float, /)"
    )]
    fn signal_process_py<'py>(
        py: Python<'py>,
        time: PyReadonlyArray1<'py, f64>,
        data: PyReadonlyArray1<'py, f64>,
        filter: bool,
        upsample: bool,
        frequency: f64,
    ) -> PyResult<Arrays<'py>> {
        let waveform = to_waveform(time, data)?;
        let params = MeasurementParams {
            carrier_frequency: frequency,
            filter,
            upsample,
            ..Default::default()
        };
        let (t, y) = condition(&waveform, &params, &EngineConfig::default())?.into_parts();
        Ok((
            PyArray1::from_vec_bound(py, t),
            PyArray1::from_vec_bound(py, y),
        ))
    }

    /// Locates both echoes in an already processed waveform.
    ///
    /// Returns `(arrival_time_1, arrival_time_2, amplitude_1, amplitude_2, velocity, attenuation)`.
    #[pyfunction]
    #[pyo3(name = "results_cal")]
    #[pyo3(
        text_signature = "(time: np.ndarray, data: np.ndarray, frequency: float, cycles: int, cutoff: float, /)"
    )]
    fn results_cal_py<'py>(
        time: PyReadonlyArray1<'py, f64>,
        data: PyReadonlyArray1<'py, f64>,
        frequency: f64,
        cycles: u32,
        cutoff: f64,
    ) -> PyResult<(f64, f64, f64, f64, f64, f64)> {
        let waveform = to_waveform(time, data)?;
        let params = MeasurementParams {
            carrier_frequency: frequency,
            cycles,
            filter: false,
            upsample: false,
            cutoff_time: cutoff,
        };
        let r = measure(&waveform, &params, &EngineConfig::default())?.result;
        Ok((
            r.arrival_time_1,
            r.arrival_time_2,
            r.amplitude_1,
            r.amplitude_2,
            r.velocity,
            r.attenuation,
        ))
    }

    /// Density (kg/m3) and kinematic viscosity (cSt) of a reference fluid.
    #[pyfunction]
    #[pyo3(name = "fluid_properties")]
    #[pyo3(text_signature = "(temperature: float, fluid: str, /)")]
    fn fluid_properties_py(temperature: f64, fluid: &str) -> PyResult<(f64, f64)> {
        let props = fluids::fluid_properties(temperature, fluid)?;
        Ok((props.density, props.kinematic_viscosity))
    }

    /// Functions for ultrasonic echo processing.
    #[pymodule]
    fn echoprop(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(signal_process_py, m)?)?;
        m.add_function(wrap_pyfunction!(results_cal_py, m)?)?;
        m.add_function(wrap_pyfunction!(fluid_properties_py, m)?)?;

        Ok(())
    }
}
