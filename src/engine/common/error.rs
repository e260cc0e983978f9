#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

/// Enum of the possible error variants that may be encountered while deriving
/// velocity and attenuation from a waveform
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Represents a bad filter, upsampling or engine configuration
    #[error("invalid settings: {0}")]
    InvalidSpec(String),

    /// Represents a waveform that cannot be processed (too short, bad time base, bad index)
    #[error("invalid waveform: {0}")]
    InvalidWaveform(String),

    /// No local maximum met the height and separation constraints in the search window
    #[error("no peak found between {start:e} s and {end:e} s")]
    NoPeakFound { start: f64, end: f64 },

    /// The curvature around a peak is zero, so the sub-sample offset is undefined
    #[error("degenerate curvature at sample {index}")]
    DegenerateCurvature { index: usize },

    /// Represents a non-physical time-of-flight or amplitude
    #[error("invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// The requested reference fluid is not in the registry
    #[error("unknown fluid '{0}'")]
    UnknownFluid(String),
}

#[cfg(feature = "python")]
impl From<EngineError> for PyErr {
    fn from(value: EngineError) -> Self {
        let msg = value.to_string();
        PyValueError::new_err(msg)
    }
}
