//! Error types for the odrive CLI

use odrive_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("No device selected: pass --port <PATH> or --simulate")]
    NoDevice,

    #[error("Serial support is not compiled in; rebuild with the `serial` feature")]
    SerialUnavailable,

    #[error("axis{axis} did not return to idle within {timeout_seconds} s")]
    StateTimeout { axis: u32, timeout_seconds: f32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
