use std::time::{Duration, Instant};

use crate::udev::device::{parse_hex_id, UdevDevice};

#[test]
fn test_parse_hex_id() {
    assert_eq!(parse_hex_id("054c"), 0x054c);
    assert_eq!(parse_hex_id("0x0ce6\n"), 0x0ce6);
    assert_eq!(parse_hex_id(""), 0);
    assert_eq!(parse_hex_id("zz"), 0);
}

#[test]
fn test_from_devnode() {
    let device = UdevDevice::from_devnode("/dev/input", "event12");
    assert_eq!(device.devnode(), "/dev/input/event12");
    assert_eq!(device.sysname(), "event12");
    assert!(device.is_event_node());

    let device = UdevDevice::from_devnode("/dev/input", "js0");
    assert!(!device.is_event_node());
    assert!(!device.is_dualsense());
}

#[test]
fn test_missing_device() {
    let device = UdevDevice::from_devnode("/dev/input", "event65535");
    assert_eq!(device.id_vendor(), 0);
    assert_eq!(device.id_product(), 0);
    assert_eq!(device.uniq(), "");
    assert!(!device.is_dualsense());
}

#[tokio::test]
async fn test_wait_initialized_gives_up() {
    // A node udev has not processed yet reads like a missing one
    let device = UdevDevice::from_devnode("/dev/input", "event65535");
    assert!(!device.is_initialized());

    let start = Instant::now();
    let ready = device.wait_initialized(3, Duration::from_millis(10)).await;
    assert!(!ready);
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert!(!device.is_dualsense());
}
