pub mod crc;
pub mod driver;
pub mod error;
pub mod hid_report;
pub mod transport;
pub mod trigger;

#[cfg(test)]
mod driver_test;
#[cfg(test)]
mod trigger_test;
