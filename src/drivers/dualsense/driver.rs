use std::{fmt::Display, time::Duration};

use hidapi::{HidApi, HidDevice};
use packed_struct::prelude::*;
use serde::Serialize;

use super::{
    crc,
    error::{check_range, DriverError},
    hid_report::{
        BatteryStatus, FirmwareInfo, LightbarSetup, MuteLight, OutputReport,
        PackedInputStatusReport, SequenceCounter,
    },
    transport::{Transport, TransportError},
    trigger::{TriggerEffect, TriggerTarget},
};

// Source: https://github.com/torvalds/linux/blob/master/drivers/hid/hid-playstation.c
pub const DS5_EDGE_NAME: &str = "DualSense Edge";
pub const DS5_EDGE_PID: u16 = 0x0df2;

pub const DS5_NAME: &str = "DualSense";
pub const DS5_VID: u16 = 0x054c;
pub const DS5_PID: u16 = 0x0ce6;

pub const PIDS: [u16; 2] = [DS5_EDGE_PID, DS5_PID];

pub const FEATURE_REPORT_FIRMWARE_INFO: u8 = 0x20;
pub const FEATURE_REPORT_FIRMWARE_INFO_SIZE: usize = 64;

pub const INPUT_REPORT_USB: u8 = 0x01;
pub const INPUT_REPORT_USB_SIZE: usize = 64;
pub const INPUT_REPORT_BT: u8 = 0x31;
pub const INPUT_REPORT_BT_SIZE: usize = 78;
pub const OUTPUT_REPORT_USB: u8 = 0x02;
pub const OUTPUT_REPORT_USB_SIZE: usize = 63;
pub const OUTPUT_REPORT_BT: u8 = 0x31;
pub const OUTPUT_REPORT_BT_SIZE: usize = 78;
pub const OUTPUT_REPORT_BT_TAG: u8 = 0x10;

/// Placeholder address for devices that do not report a usable serial
pub const UNKNOWN_MAC_ADDRESS: &str = "00:00:00:00:00:00";

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(1000);

// Player indicator patterns for 0 to 5 players, lit from the center out
pub const PLAYER_LED_PATTERNS: [u8; 6] = [0, 0b00100, 0b01010, 0b10101, 0b11011, 0b11111];

pub const MAX_HEADPHONE_VOLUME: u16 = 0x7f;
pub const MAX_SPEAKER_VOLUME: u16 = 0x64;

/// How the controller is attached to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Usb,
    Bluetooth,
}

impl Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            ConnectionType::Usb => "usb",
            ConnectionType::Bluetooth => "bluetooth",
        };
        write!(f, "{}", value)
    }
}

/// Audio output routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerRoute {
    Internal,
    Headphone,
    MonoHeadphone,
    Both,
}

impl SpeakerRoute {
    /// Value of the output path selection bits
    pub fn output_path(&self) -> u8 {
        match self {
            SpeakerRoute::Headphone => 0,
            SpeakerRoute::MonoHeadphone => 1,
            SpeakerRoute::Both => 2,
            SpeakerRoute::Internal => 3,
        }
    }
}

/// A DualSense controller found during enumeration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub serial: String,
    pub connection: ConnectionType,
    pub product: &'static str,
    pub path: String,
}

impl From<&hidapi::DeviceInfo> for DeviceInfo {
    fn from(info: &hidapi::DeviceInfo) -> Self {
        let connection = if info.interface_number() == -1 {
            ConnectionType::Bluetooth
        } else {
            ConnectionType::Usb
        };
        let product = if info.product_id() == DS5_EDGE_PID {
            DS5_EDGE_NAME
        } else {
            DS5_NAME
        };
        Self {
            serial: normalize_mac_address(info.serial_number().unwrap_or_default()),
            connection,
            product,
            path: info.path().to_string_lossy().to_string(),
        }
    }
}

/// Returns the upper-cased MAC address, or [UNKNOWN_MAC_ADDRESS] if the
/// given serial is not a MAC address.
pub fn normalize_mac_address(serial: &str) -> String {
    if serial.len() != UNKNOWN_MAC_ADDRESS.len() {
        return UNKNOWN_MAC_ADDRESS.to_string();
    }
    serial.to_uppercase()
}

/// Returns true if the device serial is the one asked for. MAC addresses
/// compare case-insensitively, any other serial must match exactly.
pub fn serial_matches(serial: &str, wanted: &str) -> bool {
    let is_mac = |value: &str| value.len() == UNKNOWN_MAC_ADDRESS.len();
    if is_mac(serial) && is_mac(wanted) {
        return serial.eq_ignore_ascii_case(wanted);
    }
    serial == wanted
}

/// Returns true if the given vendor and product id belong to a DualSense
pub fn is_dualsense(vid: u16, pid: u16) -> bool {
    vid == DS5_VID && PIDS.contains(&pid)
}

/// List all connected DualSense controllers
pub fn list_devices(api: &HidApi) -> Vec<DeviceInfo> {
    api.device_list()
        .filter(|info| is_dualsense(info.vendor_id(), info.product_id()))
        .map(DeviceInfo::from)
        .collect()
}

/// Session with a single DualSense controller. Every command builds a fresh
/// output report where only the fields relevant to the command are set.
pub struct Driver<T: Transport = HidDevice> {
    transport: T,
    connection: ConnectionType,
    sequence: SequenceCounter,
    mac_address: String,
    read_timeout: Duration,
}

impl Driver<HidDevice> {
    /// Open the controller with the given serial, or the first controller
    /// found if no serial is given.
    pub fn open(api: &HidApi, serial: Option<&str>) -> Result<Self, DriverError> {
        let found = api
            .device_list()
            .filter(|info| is_dualsense(info.vendor_id(), info.product_id()))
            .find(|info| match serial {
                Some(wanted) => serial_matches(info.serial_number().unwrap_or_default(), wanted),
                None => true,
            });
        let Some(info) = found else {
            let msg = match serial {
                Some(serial) => format!("Device with serial '{serial}' not found"),
                None => "No DualSense controller found".to_string(),
            };
            return Err(DriverError::DeviceNotFound(msg));
        };

        let device_info = DeviceInfo::from(info);
        log::debug!(
            "Opening {} {} at {}",
            device_info.product,
            device_info.serial,
            device_info.path
        );
        let device = info.open_device(api).map_err(TransportError::from)?;

        Ok(Self::new(
            device,
            device_info.connection,
            device_info.serial.as_str(),
        ))
    }
}

impl<T: Transport> Driver<T> {
    pub fn new(transport: T, connection: ConnectionType, mac_address: &str) -> Self {
        Self {
            transport,
            connection,
            sequence: SequenceCounter::new(),
            mac_address: mac_address.to_string(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set how long to wait for input reports
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn connection(&self) -> ConnectionType {
        self.connection
    }

    pub fn mac_address(&self) -> &str {
        self.mac_address.as_str()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build a new zeroed output report for this session
    pub fn new_report(&mut self) -> OutputReport {
        OutputReport::new(self.connection, &mut self.sequence)
    }

    /// Sign and send the given output report
    pub fn write_report(&self, report: &mut OutputReport) -> Result<(), DriverError> {
        let buf = report.pack_signed()?;
        if let Some(seq_number) = report.seq_number() {
            log::trace!("Writing output report with sequence number {seq_number}");
        }
        log::trace!("Writing output report: {buf:02x?}");
        self.transport.write(&buf)?;
        Ok(())
    }

    /// Turn the lightbar on or off
    pub fn set_lightbar_enabled(&mut self, enabled: bool) -> Result<(), DriverError> {
        log::debug!("Setting lightbar enabled: {enabled}");
        let mut report = self.new_report();
        let state = report.state_mut();
        state.allow_lightbar_setup = true;
        state.lightbar_setup = if enabled {
            LightbarSetup::LightOn
        } else {
            LightbarSetup::LightOut
        };
        self.write_report(&mut report)
    }

    /// Set the lightbar color, with each channel scaled by the given brightness
    pub fn set_lightbar_color(
        &mut self,
        r: u8,
        g: u8,
        b: u8,
        brightness: u8,
    ) -> Result<(), DriverError> {
        log::debug!("Setting lightbar color to: {r}, {g}, {b} with brightness {brightness}");
        let scale = |c: u8| (brightness as u16 * c as u16 / 255) as u8;
        let mut report = self.new_report();
        let state = report.state_mut();
        state.allow_led_color = true;
        state.led_red = scale(r);
        state.led_green = scale(g);
        state.led_blue = scale(b);
        self.write_report(&mut report)
    }

    /// Light up the player indicators for the given player number (0-5)
    pub fn set_player_leds(&mut self, number: u8) -> Result<(), DriverError> {
        check_range("player_leds", number, 0, 5)?;
        log::debug!("Setting player LEDs to: {number}");
        let mut report = self.new_report();
        let state = report.state_mut();
        state.allow_player_indicators = true;
        state.player_leds = PLAYER_LED_PATTERNS[number as usize];
        self.write_report(&mut report)
    }

    /// Mute or unmute the microphone
    pub fn set_microphone_enabled(&mut self, enabled: bool) -> Result<(), DriverError> {
        log::debug!("Setting microphone enabled: {enabled}");
        let mut report = self.new_report();
        let state = report.state_mut();
        state.allow_power_save_control = true;
        state.mic_mute = !enabled;
        self.write_report(&mut report)
    }

    /// Turn the microphone mute LED on or off
    pub fn set_microphone_led(&mut self, enabled: bool) -> Result<(), DriverError> {
        log::debug!("Setting microphone LED: {enabled}");
        let mut report = self.new_report();
        let state = report.state_mut();
        state.allow_mute_light = true;
        state.mute_light_mode = if enabled { MuteLight::On } else { MuteLight::Off };
        self.write_report(&mut report)
    }

    /// Select where audio is played
    pub fn set_speaker(&mut self, route: SpeakerRoute) -> Result<(), DriverError> {
        log::debug!("Setting speaker route to: {route:?}");
        let mut report = self.new_report();
        let state = report.state_mut();
        state.allow_audio_control = true;
        state.output_path_select = Integer::from_primitive(route.output_path());
        self.write_report(&mut report)
    }

    /// Set the headphone and speaker volume from a 0-255 value
    pub fn set_volume(&mut self, volume: u8) -> Result<(), DriverError> {
        log::debug!("Setting volume to: {volume}");
        let mut report = self.new_report();
        let state = report.state_mut();
        state.allow_headphone_volume = true;
        state.allow_speaker_volume = true;
        state.volume_headphones = (volume as u16 * MAX_HEADPHONE_VOLUME / 255) as u8;
        state.volume_speakers = (volume as u16 * MAX_SPEAKER_VOLUME / 255) as u8;
        self.write_report(&mut report)
    }

    /// Reduce rumble and trigger vibration strength (0-7, higher is weaker)
    pub fn set_attenuation(&mut self, rumble: u8, trigger: u8) -> Result<(), DriverError> {
        check_range("rumble", rumble, 0, 7)?;
        check_range("trigger", trigger, 0, 7)?;
        log::debug!("Setting attenuation to: rumble {rumble}, trigger {trigger}");
        let mut report = self.new_report();
        let state = report.state_mut();
        state.allow_vibration_attenuation = true;
        state.rumble_attenuation = Integer::from_primitive(rumble);
        state.trigger_attenuation = Integer::from_primitive(trigger);
        self.write_report(&mut report)
    }

    /// Configure the adaptive trigger effect on the given trigger(s)
    pub fn set_trigger_effect(
        &mut self,
        target: TriggerTarget,
        effect: &TriggerEffect,
    ) -> Result<(), DriverError> {
        let plan = effect.encode()?;
        log::debug!("Setting {target:?} trigger effect: {effect:?}");
        let mut report = self.new_report();
        plan.apply(target, report.state_mut());
        self.write_report(&mut report)
    }

    /// Read an input report and return the battery state
    pub fn battery(&self) -> Result<BatteryStatus, DriverError> {
        let buf = self
            .transport
            .read_timeout(INPUT_REPORT_BT_SIZE, self.read_timeout)?;
        if buf.is_empty() {
            return Err(TransportError::Timeout.into());
        }
        log::trace!("Got input report: {buf:02x?}");
        let report = PackedInputStatusReport::unpack(self.connection, &buf)?;
        Ok(report.battery())
    }

    /// Request the firmware feature report
    pub fn firmware_info(&self) -> Result<FirmwareInfo, DriverError> {
        let buf = self.transport.read_feature(
            FEATURE_REPORT_FIRMWARE_INFO,
            FEATURE_REPORT_FIRMWARE_INFO_SIZE,
        )?;
        log::trace!("Got firmware report: {buf:02x?}");
        if self.connection == ConnectionType::Bluetooth
            && !crc::validate(crc::FEATURE_CRC32_SEED, &buf)
        {
            log::debug!("Firmware report checksum does not match");
        }
        FirmwareInfo::decode(&buf)
    }
}
