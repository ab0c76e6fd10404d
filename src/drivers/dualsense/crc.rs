//! CRC32 signing used by DualSense Bluetooth reports.
//!
//! Bluetooth reports carry a little-endian CRC32 in their last 4 bytes. The
//! checksum is seeded with a single byte that depends on the report class
//! before the report bytes themselves are accumulated.

/// Seed byte for input reports
pub const INPUT_CRC32_SEED: u8 = 0xA1;
/// Seed byte for output reports
pub const OUTPUT_CRC32_SEED: u8 = 0xA2;
/// Seed byte for feature reports
pub const FEATURE_CRC32_SEED: u8 = 0xA3;

/// Size of the CRC trailer
pub const CRC32_SIZE: usize = 4;

/// Compute the seeded CRC32 of the given data. The seed byte and the data
/// share one running accumulator.
pub fn sign(seed: u8, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[seed]);
    hasher.update(data);
    hasher.finalize()
}

/// Sign everything but the last 4 bytes of the given report and write the
/// checksum into them.
pub fn stamp(seed: u8, buf: &mut [u8]) {
    if buf.len() < CRC32_SIZE {
        return;
    }
    let offset = buf.len() - CRC32_SIZE;
    let crc = sign(seed, &buf[..offset]);
    buf[offset..].copy_from_slice(&crc.to_le_bytes());
}

/// Returns true if the trailing 4 bytes of the given report match the
/// checksum of the preceding bytes.
pub fn validate(seed: u8, buf: &[u8]) -> bool {
    if buf.len() < CRC32_SIZE {
        return false;
    }
    let offset = buf.len() - CRC32_SIZE;
    let mut trailer = [0u8; CRC32_SIZE];
    trailer.copy_from_slice(&buf[offset..]);
    sign(seed, &buf[..offset]) == u32::from_le_bytes(trailer)
}
