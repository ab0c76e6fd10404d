use std::{cell::RefCell, error::Error, time::Duration};

use crate::drivers::dualsense::{
    crc,
    driver::{
        is_dualsense, normalize_mac_address, serial_matches, ConnectionType, Driver, SpeakerRoute,
        UNKNOWN_MAC_ADDRESS,
    },
    error::DriverError,
    hid_report::PowerState,
    transport::{Transport, TransportError},
    trigger::{TriggerEffect, TriggerTarget},
};

/// Transport that records every write and replays canned reports
#[derive(Default)]
struct MockTransport {
    writes: RefCell<Vec<Vec<u8>>>,
    input: Vec<u8>,
    feature: Vec<u8>,
}

impl Transport for MockTransport {
    fn write(&self, buf: &[u8]) -> Result<(), TransportError> {
        self.writes.borrow_mut().push(buf.to_vec());
        Ok(())
    }

    fn read_timeout(&self, max_len: usize, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let len = self.input.len().min(max_len);
        Ok(self.input[..len].to_vec())
    }

    fn read_feature(&self, report_id: u8, len: usize) -> Result<Vec<u8>, TransportError> {
        assert_eq!(report_id, 0x20);
        let len = self.feature.len().min(len);
        Ok(self.feature[..len].to_vec())
    }
}

fn usb_driver() -> Driver<MockTransport> {
    Driver::new(MockTransport::default(), ConnectionType::Usb, UNKNOWN_MAC_ADDRESS)
}

fn bt_driver() -> Driver<MockTransport> {
    Driver::new(
        MockTransport::default(),
        ConnectionType::Bluetooth,
        "A0:B1:C2:D3:E4:F5",
    )
}

/// Returns the control block of the last written USB report
fn last_usb_block(driver: &Driver<MockTransport>) -> Vec<u8> {
    let writes = driver.transport().writes.borrow();
    let buf = writes.last().expect("no report written");
    assert_eq!(buf.len(), 63);
    assert_eq!(buf[0], 0x02);
    buf[1..48].to_vec()
}

/// Returns the control block of the last written Bluetooth report
fn last_bt_block(driver: &Driver<MockTransport>) -> Vec<u8> {
    let writes = driver.transport().writes.borrow();
    let buf = writes.last().expect("no report written");
    assert_eq!(buf.len(), 78);
    assert_eq!(buf[0], 0x31);
    assert_eq!(buf[2], 0x10);
    assert!(crc::validate(crc::OUTPUT_CRC32_SEED, buf));
    buf[3..50].to_vec()
}

fn write_count(driver: &Driver<MockTransport>) -> usize {
    driver.transport().writes.borrow().len()
}

#[test]
fn test_lightbar_color() -> Result<(), Box<dyn Error>> {
    let mut driver = usb_driver();
    driver.set_lightbar_color(255, 128, 0, 128)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[0], 0x00);
    assert_eq!(block[1], 0x04);
    assert_eq!(block[44..47], [128, 64, 0]);

    driver.set_lightbar_color(10, 20, 30, 255)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[44..47], [10, 20, 30]);

    Ok(())
}

#[test]
fn test_lightbar_enabled() -> Result<(), Box<dyn Error>> {
    let mut driver = bt_driver();
    driver.set_lightbar_enabled(true)?;
    let block = last_bt_block(&driver);
    assert_eq!(block[38], 0x02);
    assert_eq!(block[41], 1);

    driver.set_lightbar_enabled(false)?;
    let block = last_bt_block(&driver);
    assert_eq!(block[38], 0x02);
    assert_eq!(block[41], 2);

    Ok(())
}

#[test]
fn test_player_leds() -> Result<(), Box<dyn Error>> {
    let mut driver = usb_driver();
    let expected = [0, 0b00100, 0b01010, 0b10101, 0b11011, 0b11111];
    for (number, pattern) in expected.iter().enumerate() {
        driver.set_player_leds(number as u8)?;
        let block = last_usb_block(&driver);
        assert_eq!(block[1], 0x10);
        assert_eq!(block[43], *pattern);
    }

    let result = driver.set_player_leds(6);
    assert!(matches!(
        result,
        Err(DriverError::ParameterOutOfRange { value: 6, .. })
    ));
    assert_eq!(write_count(&driver), expected.len());

    Ok(())
}

#[test]
fn test_microphone() -> Result<(), Box<dyn Error>> {
    let mut driver = usb_driver();
    driver.set_microphone_enabled(false)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[1], 0x02);
    assert_eq!(block[9], 0x10);

    driver.set_microphone_enabled(true)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[1], 0x02);
    assert_eq!(block[9], 0x00);

    driver.set_microphone_led(true)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[1], 0x01);
    assert_eq!(block[8], 1);

    driver.set_microphone_led(false)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[1], 0x01);
    assert_eq!(block[8], 0);

    Ok(())
}

#[test]
fn test_speaker() -> Result<(), Box<dyn Error>> {
    let mut driver = usb_driver();
    let routes = [
        (SpeakerRoute::Internal, 0x30),
        (SpeakerRoute::Headphone, 0x00),
        (SpeakerRoute::MonoHeadphone, 0x10),
        (SpeakerRoute::Both, 0x20),
    ];
    for (route, audio_flags) in routes {
        driver.set_speaker(route)?;
        let block = last_usb_block(&driver);
        assert_eq!(block[0], 0x80);
        assert_eq!(block[7], audio_flags, "{route:?}");
    }

    Ok(())
}

#[test]
fn test_volume() -> Result<(), Box<dyn Error>> {
    let mut driver = usb_driver();
    driver.set_volume(255)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[0], 0x30);
    assert_eq!(block[4], 0x7f);
    assert_eq!(block[5], 0x64);

    driver.set_volume(128)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[4], 63);
    assert_eq!(block[5], 50);

    driver.set_volume(0)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[0], 0x30);
    assert_eq!(block[4], 0);
    assert_eq!(block[5], 0);

    Ok(())
}

#[test]
fn test_attenuation() -> Result<(), Box<dyn Error>> {
    let mut driver = usb_driver();
    driver.set_attenuation(5, 2)?;
    let block = last_usb_block(&driver);
    assert_eq!(block[1], 0x40);
    assert_eq!(block[36], 0x25);

    assert!(driver.set_attenuation(8, 0).is_err());
    assert!(driver.set_attenuation(0, 8).is_err());
    assert_eq!(write_count(&driver), 1);

    Ok(())
}

#[test]
fn test_trigger_effect() -> Result<(), Box<dyn Error>> {
    let mut driver = bt_driver();
    let effect = TriggerEffect::Weapon {
        start: 2,
        end: 5,
        strength: 3,
    };
    driver.set_trigger_effect(TriggerTarget::Both, &effect)?;
    let block = last_bt_block(&driver);
    assert_eq!(block[0], 0x0c);
    assert_eq!(block[10], 0x25);
    assert_eq!(block[11..21], [0x24, 0, 0x02, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(block[21], 0x25);
    assert_eq!(block[22..32], block[11..21]);

    driver.set_trigger_effect(TriggerTarget::Right, &TriggerEffect::Off)?;
    let block = last_bt_block(&driver);
    assert_eq!(block[0], 0x04);
    assert_eq!(block[10], 0x05);

    Ok(())
}

#[test]
fn test_invalid_trigger_never_writes() {
    let mut driver = bt_driver();
    let effect = TriggerEffect::Bow {
        start: 0,
        end: 1,
        strength: 9,
        snap_force: 1,
    };
    let result = driver.set_trigger_effect(TriggerTarget::Left, &effect);
    assert!(matches!(
        result,
        Err(DriverError::ParameterOutOfRange { value: 9, .. })
    ));
    assert_eq!(write_count(&driver), 0);

    // The rejected command did not consume a sequence number
    let report = driver.new_report();
    assert_eq!(report.seq_number(), Some(0));
}

#[test]
fn test_bluetooth_sequence_advances_per_command() -> Result<(), Box<dyn Error>> {
    let mut driver = bt_driver();
    for _ in 0..3 {
        driver.set_volume(10)?;
    }
    let writes = driver.transport().writes.borrow();
    let seqs: Vec<u8> = writes.iter().map(|buf| buf[1] >> 4).collect();
    assert_eq!(seqs, vec![0, 1, 2]);

    Ok(())
}

#[test]
fn test_battery() -> Result<(), Box<dyn Error>> {
    let mut input = vec![0; 64];
    input[0] = 0x01;
    input[53] = 0x15;
    let transport = MockTransport {
        input,
        ..Default::default()
    };
    let driver = Driver::new(transport, ConnectionType::Usb, UNKNOWN_MAC_ADDRESS)
        .with_read_timeout(Duration::from_millis(10));
    let battery = driver.battery()?;
    assert_eq!(battery.capacity, 55);
    assert_eq!(battery.status, PowerState::Charging);

    Ok(())
}

#[test]
fn test_battery_timeout() {
    let driver = usb_driver();
    let err = driver.battery().expect_err("read should time out");
    assert!(err.is_transport());
    assert!(matches!(
        err,
        DriverError::Transport(TransportError::Timeout)
    ));
}

#[test]
fn test_firmware_info() -> Result<(), Box<dyn Error>> {
    let mut feature = vec![0; 64];
    feature[0] = 0x20;
    feature[28..32].copy_from_slice(&0x0100_0218u32.to_le_bytes());
    crc::stamp(crc::FEATURE_CRC32_SEED, &mut feature);
    let transport = MockTransport {
        feature,
        ..Default::default()
    };
    let driver = Driver::new(transport, ConnectionType::Bluetooth, UNKNOWN_MAC_ADDRESS);
    let info = driver.firmware_info()?;
    assert_eq!(info.firmware_version, 0x0100_0218);

    let transport = MockTransport {
        feature: vec![0x20; 20],
        ..Default::default()
    };
    let driver = Driver::new(transport, ConnectionType::Usb, UNKNOWN_MAC_ADDRESS);
    let result = driver.firmware_info();
    assert!(matches!(
        result,
        Err(DriverError::InvalidLength {
            expected: 64,
            actual: 20
        })
    ));

    Ok(())
}

#[test]
fn test_serial_matches() {
    assert!(serial_matches("a0:b1:c2:d3:e4:f5", "A0:B1:C2:D3:E4:F5"));
    assert!(serial_matches("a0:b1:c2:d3:e4:f5", "a0:b1:c2:d3:e4:f5"));
    assert!(!serial_matches("a0:b1:c2:d3:e4:f5", "a0:b1:c2:d3:e4:f6"));

    // Serials that are not MAC addresses stay distinct
    assert!(serial_matches("ABC123", "ABC123"));
    assert!(!serial_matches("ABC123", "abc123"));
    assert!(!serial_matches("ABC123", "XYZ789"));
    assert!(!serial_matches("ABC123", UNKNOWN_MAC_ADDRESS));
    assert!(!serial_matches("", UNKNOWN_MAC_ADDRESS));
}

#[test]
fn test_mac_address() {
    assert_eq!(
        normalize_mac_address("a0:b1:c2:d3:e4:f5"),
        "A0:B1:C2:D3:E4:F5"
    );
    assert_eq!(normalize_mac_address(""), UNKNOWN_MAC_ADDRESS);
    assert_eq!(normalize_mac_address("12345"), UNKNOWN_MAC_ADDRESS);

    let driver = bt_driver();
    assert_eq!(driver.mac_address(), "A0:B1:C2:D3:E4:F5");
    assert_eq!(driver.connection(), ConnectionType::Bluetooth);
}

#[test]
fn test_is_dualsense() {
    assert!(is_dualsense(0x054c, 0x0ce6));
    assert!(is_dualsense(0x054c, 0x0df2));
    assert!(!is_dualsense(0x054c, 0x09cc));
    assert!(!is_dualsense(0x28de, 0x0ce6));
}
