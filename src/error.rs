use crate::acquisition::AcquisitionError;
use crate::engine::common::error::EngineError;
use crate::utils::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchopropError {
    /// The engine rejected the waveform or settings
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// Unable to load the rig configuration
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The rig failed to deliver a waveform or temperature
    #[error("{0}")]
    Acquisition(#[from] AcquisitionError),
}
