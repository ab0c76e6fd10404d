use packed_struct::PackingError;
use thiserror::Error;

use super::transport::TransportError;

/// Possible errors when building, sending or decoding DualSense reports
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    ParameterOutOfRange {
        field: String,
        value: u8,
        min: u8,
        max: u8,
    },
    #[error("unrecognized report with id `{report_id:#04x}` and size `{size}`")]
    UnrecognizedReport { report_id: u8, size: usize },
    #[error("invalid report length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("unable to pack report: {0:?}")]
    Packing(#[from] PackingError),
    #[error("{0}")]
    DeviceNotFound(String),
    #[error("controller is not connected via Bluetooth")]
    NotBluetooth,
}

impl DriverError {
    /// Returns true if the error came from the underlying transport rather
    /// than from the given parameters or from the shape of a report. Only
    /// these errors are worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Returns a [DriverError::ParameterOutOfRange] if the given value is outside
/// of the inclusive range `min..=max`.
pub fn check_range(field: &str, value: u8, min: u8, max: u8) -> Result<(), DriverError> {
    if value < min || value > max {
        return Err(DriverError::ParameterOutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}
