use std::time::Duration;

use hidapi::HidDevice;
use thiserror::Error;

/// Errors that can occur while talking to the device
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("timeout waiting for report")]
    Timeout,
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),
}

/// Byte-level access to an opened controller. Implementations only move
/// bytes; framing and checksums are handled by the caller.
pub trait Transport {
    /// Write a complete output report
    fn write(&self, buf: &[u8]) -> Result<(), TransportError>;

    /// Read a single input report of at most `max_len` bytes, waiting up to
    /// `timeout`. An empty result means nothing arrived in time.
    fn read_timeout(&self, max_len: usize, timeout: Duration) -> Result<Vec<u8>, TransportError>;

    /// Request the feature report with the given id
    fn read_feature(&self, report_id: u8, len: usize) -> Result<Vec<u8>, TransportError>;
}

impl Transport for HidDevice {
    fn write(&self, buf: &[u8]) -> Result<(), TransportError> {
        let bytes_written = HidDevice::write(self, buf)?;
        log::trace!("Wrote {bytes_written} of {} bytes", buf.len());
        Ok(())
    }

    fn read_timeout(&self, max_len: usize, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0; max_len];
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let bytes_read = HidDevice::read_timeout(self, &mut buf[..], timeout_ms)?;
        buf.truncate(bytes_read);
        Ok(buf)
    }

    fn read_feature(&self, report_id: u8, len: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0; len];
        if let Some(id) = buf.first_mut() {
            *id = report_id;
        }
        let bytes_read = self.get_feature_report(&mut buf[..])?;
        buf.truncate(bytes_read);
        Ok(buf)
    }
}
