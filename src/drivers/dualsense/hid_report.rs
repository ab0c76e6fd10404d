//! Structures derived from the great work of the community of the Game Controller
//! Collective Wiki and the Linux hid-playstation driver.
//! Source: https://controllers.fandom.com/wiki/Sony_DualSense
//! Source: https://github.com/torvalds/linux/blob/master/drivers/hid/hid-playstation.c
use std::fmt::Display;

use packed_struct::prelude::*;
use packed_struct::PackedStructSlice;
use serde::Serialize;

use super::crc;
use super::driver::*;
use super::error::DriverError;

/// Rotating 4-bit sequence number embedded in every Bluetooth output report.
/// It is owned by a single device session and advanced once per report.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct SequenceCounter(u8);

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current sequence number and advance the counter, wrapping
    /// from 15 back to 0.
    pub fn next(&mut self) -> u8 {
        let value = self.0;
        self.0 = (self.0 + 1) % 16;
        value
    }
}

#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum MuteLight {
    #[default]
    Off = 0,
    On = 1,
    Breathing = 2,
    DoNothing = 3,
    NoAction4 = 4,
    NoAction5 = 5,
    NoAction6 = 6,
    NoAction7 = 7,
}

#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum LightbarSetup {
    #[default]
    Nothing = 0,
    LightOn = 1,
    LightOut = 2,
}

#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum LightBrightness {
    #[default]
    Bright = 0,
    Mid = 1,
    Dim = 2,
    NoAction3 = 3,
    NoAction4 = 4,
    NoAction5 = 5,
    NoAction6 = 6,
    NoAction7 = 7,
}

/// The feature control block shared by the USB and Bluetooth output reports.
/// Each field is only applied by the firmware if its `allow_*` flag is set.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "47")]
pub struct PackedControlBlock {
    // byte 0
    #[packed_field(bits = "0")]
    pub allow_audio_control: bool,
    #[packed_field(bits = "1")]
    pub allow_mic_volume: bool,
    #[packed_field(bits = "2")]
    pub allow_speaker_volume: bool,
    #[packed_field(bits = "3")]
    pub allow_headphone_volume: bool,
    #[packed_field(bits = "4")]
    pub allow_left_trigger_ffb: bool,
    #[packed_field(bits = "5")]
    pub allow_right_trigger_ffb: bool,
    #[packed_field(bits = "6")]
    pub allow_haptics_select: bool,
    #[packed_field(bits = "7")]
    pub allow_compatible_vibration: bool,

    // byte 1
    #[packed_field(bits = "8")]
    pub allow_audio_control2: bool,
    #[packed_field(bits = "9")]
    pub allow_vibration_attenuation: bool,
    #[packed_field(bits = "10")]
    pub allow_haptic_low_pass_filter: bool,
    #[packed_field(bits = "11")]
    pub allow_player_indicators: bool,
    #[packed_field(bits = "12")]
    pub release_leds: bool,
    #[packed_field(bits = "13")]
    pub allow_led_color: bool, // Enable RGB lightbar section
    #[packed_field(bits = "14")]
    pub allow_power_save_control: bool, // Enable byte 9
    #[packed_field(bits = "15")]
    pub allow_mute_light: bool, // Enable setting MuteLightMode

    // byte 2-6
    #[packed_field(bytes = "2")]
    pub motor_right: u8,
    #[packed_field(bytes = "3")]
    pub motor_left: u8,
    #[packed_field(bytes = "4")]
    pub volume_headphones: u8, // 0x00 - 0x7f
    #[packed_field(bytes = "5")]
    pub volume_speakers: u8,
    #[packed_field(bytes = "6")]
    pub volume_mic: u8, // 0x00 - 0x40

    // byte 7
    #[packed_field(bits = "56..=57", endian = "lsb")]
    pub input_path_select: Integer<u8, packed_bits::Bits<2>>, // 0 CHAT ASR, 1 CHAT_CHAT, 2 ASR_ASR
    #[packed_field(bits = "58..=59", endian = "lsb")]
    pub output_path_select: Integer<u8, packed_bits::Bits<2>>, // 0 L_R_X, 1 L_L_X, 2 L_L_R, 3 X_X_R
    #[packed_field(bits = "60")]
    pub noise_cancel_enable: bool,
    #[packed_field(bits = "61")]
    pub echo_cancel_enable: bool,
    #[packed_field(bits = "62..=63", endian = "lsb")]
    pub mic_select: Integer<u8, packed_bits::Bits<2>>, // 0 auto, 1 internal, 2 external

    // byte 8
    #[packed_field(bytes = "8", ty = "enum")]
    pub mute_light_mode: MuteLight,

    // byte 9
    #[packed_field(bits = "72")]
    pub haptic_mute: bool,
    #[packed_field(bits = "73")]
    pub headphone_mute: bool,
    #[packed_field(bits = "74")]
    pub audio_mute: bool,
    #[packed_field(bits = "75")]
    pub mic_mute: bool,
    #[packed_field(bits = "76")]
    pub audio_power_save: bool,
    #[packed_field(bits = "77")]
    pub haptic_power_save: bool,
    #[packed_field(bits = "78")]
    pub motion_power_save: bool,
    #[packed_field(bits = "79")]
    pub touch_power_save: bool,

    // byte 10-31
    #[packed_field(bytes = "10")]
    pub right_trigger_mode: u8,
    #[packed_field(bytes = "11..=20")]
    pub right_trigger_params: [u8; 10],
    #[packed_field(bytes = "21")]
    pub left_trigger_mode: u8,
    #[packed_field(bytes = "22..=31")]
    pub left_trigger_params: [u8; 10],

    // byte 32-35
    #[packed_field(bytes = "32..=35")]
    pub _reserved_0: [u8; 4],

    // byte 36
    #[packed_field(bits = "288..=291", endian = "lsb")]
    pub trigger_attenuation: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "292..=295", endian = "lsb")]
    pub rumble_attenuation: Integer<u8, packed_bits::Bits<4>>,

    // byte 37
    #[packed_field(bits = "296..=298", endian = "lsb")]
    pub _unkn_audio_control_2: Integer<u8, packed_bits::Bits<3>>,
    #[packed_field(bits = "299")]
    pub beamforming_enable: bool,
    #[packed_field(bits = "300")]
    pub _unkn_audio_control_2_bit: bool,
    #[packed_field(bits = "301..=303", endian = "lsb")]
    pub speaker_pre_gain: Integer<u8, packed_bits::Bits<3>>,

    // byte 38
    #[packed_field(bits = "304..=308", endian = "lsb")]
    pub _unkn_flag2: Integer<u8, packed_bits::Bits<5>>,
    #[packed_field(bits = "309")]
    pub enable_improved_rumble_emulation: bool,
    #[packed_field(bits = "310")]
    pub allow_lightbar_setup: bool,
    #[packed_field(bits = "311")]
    pub allow_led_brightness: bool,

    // byte 39-40
    #[packed_field(bytes = "39..=40")]
    pub _reserved_1: [u8; 2],

    // byte 41-43
    #[packed_field(bytes = "41", ty = "enum")]
    pub lightbar_setup: LightbarSetup,
    #[packed_field(bytes = "42", ty = "enum")]
    pub led_brightness: LightBrightness,
    #[packed_field(bytes = "43")]
    pub player_leds: u8, // bits 0-4, one per indicator from left to right

    // byte 44-46
    #[packed_field(bytes = "44")]
    pub led_red: u8,
    #[packed_field(bytes = "45")]
    pub led_green: u8,
    #[packed_field(bytes = "46")]
    pub led_blue: u8,
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "63")]
pub struct UsbPackedOutputReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8, // Report ID (always 0x02)

    // byte 1-47
    #[packed_field(bytes = "1..=47")]
    pub state: PackedControlBlock,

    // byte 48-62
    #[packed_field(bytes = "48..=62")]
    pub _reserved: [u8; 15],
}

impl Default for UsbPackedOutputReport {
    fn default() -> Self {
        Self {
            report_id: OUTPUT_REPORT_USB,
            state: Default::default(),
            _reserved: Default::default(),
        }
    }
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "78")]
pub struct BluetoothPackedOutputReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8, // Report ID (always 0x31)

    // byte 1
    #[packed_field(bits = "8..=11", endian = "lsb")]
    pub seq_number: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "12..=15", endian = "lsb")]
    pub seq_tag: Integer<u8, packed_bits::Bits<4>>, // Always zero

    // byte 2
    #[packed_field(bytes = "2")]
    pub tag: u8, // Always 0x10

    // byte 3-49
    #[packed_field(bytes = "3..=49")]
    pub state: PackedControlBlock,

    // byte 50-73
    #[packed_field(bytes = "50..=73")]
    pub _reserved: [u8; 24],

    // byte 74-77
    #[packed_field(bytes = "74..=77", endian = "lsb")]
    pub crc32: Integer<u32, packed_bits::Bits<32>>,
}

impl Default for BluetoothPackedOutputReport {
    fn default() -> Self {
        Self {
            report_id: OUTPUT_REPORT_BT,
            seq_number: Default::default(),
            seq_tag: Default::default(),
            tag: OUTPUT_REPORT_BT_TAG,
            state: Default::default(),
            _reserved: Default::default(),
            crc32: Default::default(),
        }
    }
}

/// DualSense output report for USB and Bluetooth. Reports are built fresh
/// for every command with all fields zeroed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum OutputReport {
    Usb(UsbPackedOutputReport),
    Bluetooth(BluetoothPackedOutputReport),
}

impl OutputReport {
    /// Create a new zeroed output report for the given connection. Building a
    /// Bluetooth report consumes the next sequence number.
    pub fn new(connection: ConnectionType, sequence: &mut SequenceCounter) -> Self {
        match connection {
            ConnectionType::Usb => Self::Usb(UsbPackedOutputReport::default()),
            ConnectionType::Bluetooth => {
                let seq_number = sequence.next();
                Self::Bluetooth(BluetoothPackedOutputReport {
                    seq_number: Integer::from_primitive(seq_number),
                    ..Default::default()
                })
            }
        }
    }

    /// Parse a packed output report, using the report id and size to
    /// determine which connection it was built for.
    pub fn unpack(buf: &[u8]) -> Result<Self, DriverError> {
        let Some(&report_id) = buf.first() else {
            return Err(DriverError::UnrecognizedReport {
                report_id: 0,
                size: 0,
            });
        };
        match (report_id, buf.len()) {
            (OUTPUT_REPORT_USB, OUTPUT_REPORT_USB_SIZE) => {
                let report = UsbPackedOutputReport::unpack_from_slice(buf)?;
                Ok(Self::Usb(report))
            }
            (OUTPUT_REPORT_BT, OUTPUT_REPORT_BT_SIZE) => {
                let report = BluetoothPackedOutputReport::unpack_from_slice(buf)?;
                Ok(Self::Bluetooth(report))
            }
            (report_id, size) => Err(DriverError::UnrecognizedReport { report_id, size }),
        }
    }

    /// Returns the connection type this report is framed for
    pub fn connection(&self) -> ConnectionType {
        match self {
            OutputReport::Usb(_) => ConnectionType::Usb,
            OutputReport::Bluetooth(_) => ConnectionType::Bluetooth,
        }
    }

    /// Returns the report id of the report
    pub fn report_id(&self) -> u8 {
        match self {
            OutputReport::Usb(report) => report.report_id,
            OutputReport::Bluetooth(report) => report.report_id,
        }
    }

    /// Returns the sequence number for Bluetooth reports
    pub fn seq_number(&self) -> Option<u8> {
        match self {
            OutputReport::Usb(_) => None,
            OutputReport::Bluetooth(report) => Some(report.seq_number.to_primitive()),
        }
    }

    /// Return the underlying control block. Both USB and Bluetooth reports
    /// share the same control block.
    pub fn state(&self) -> &PackedControlBlock {
        match self {
            OutputReport::Usb(report) => &report.state,
            OutputReport::Bluetooth(report) => &report.state,
        }
    }

    /// Return a mutable reference to the underlying control block.
    pub fn state_mut(&mut self) -> &mut PackedControlBlock {
        match self {
            OutputReport::Usb(ref mut report) => &mut report.state,
            OutputReport::Bluetooth(ref mut report) => &mut report.state,
        }
    }

    /// Pack the report into bytes ready to be written to the device.
    /// Bluetooth reports are signed with a CRC32 over every byte preceding
    /// the trailer.
    pub fn pack_signed(&mut self) -> Result<Vec<u8>, PackingError> {
        match self {
            OutputReport::Usb(report) => Ok(report.pack()?.to_vec()),
            OutputReport::Bluetooth(report) => {
                let mut buf = report.pack()?;
                crc::stamp(crc::OUTPUT_CRC32_SEED, &mut buf);
                *report = BluetoothPackedOutputReport::unpack(&buf)?;
                Ok(buf.to_vec())
            }
        }
    }
}

impl Display for OutputReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputReport::Usb(data) => {
                write!(f, "{}", data)
            }
            OutputReport::Bluetooth(data) => {
                write!(f, "{}", data)
            }
        }
    }
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "64")]
pub struct UsbPackedInputStatusReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8, // Report ID (always 0x01)

    // byte 1-52
    #[packed_field(bytes = "1..=52")]
    pub _input_state: [u8; 52], // Sticks, buttons, motion and touch data

    // byte 53
    #[packed_field(bits = "424..=427", endian = "lsb")]
    pub charging_status: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "428..=431", endian = "lsb")]
    pub battery_capacity: Integer<u8, packed_bits::Bits<4>>, // 0x00 - 0x0A

    // byte 54-63
    #[packed_field(bytes = "54..=63")]
    pub _unkn_0: [u8; 10],
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "78")]
pub struct BluetoothPackedInputStatusReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8, // Report ID (always 0x31)

    // byte 1
    #[packed_field(bits = "8..=11", endian = "lsb")]
    pub seq_number: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "12..=13", endian = "lsb")]
    pub _unkn_0: Integer<u8, packed_bits::Bits<2>>,
    /// Present for mic data
    #[packed_field(bits = "14")]
    pub has_mic: bool,
    /// Present for packets with state data
    #[packed_field(bits = "15")]
    pub has_hid: bool,

    // byte 2-53
    #[packed_field(bytes = "2..=53")]
    pub _input_state: [u8; 52],

    // byte 54
    #[packed_field(bits = "432..=435", endian = "lsb")]
    pub charging_status: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "436..=439", endian = "lsb")]
    pub battery_capacity: Integer<u8, packed_bits::Bits<4>>,

    // byte 55-73
    #[packed_field(bytes = "55..=73")]
    pub _unkn_1: [u8; 19],

    // byte 74-77
    #[packed_field(bytes = "74..=77", endian = "lsb")]
    pub crc32: Integer<u32, packed_bits::Bits<32>>,
}

/// DualSense input report status section for USB and Bluetooth
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PackedInputStatusReport {
    Usb(UsbPackedInputStatusReport),
    Bluetooth(BluetoothPackedInputStatusReport),
}

impl PackedInputStatusReport {
    /// Unpack an input report read from a device with the given connection.
    /// The report id and size must match what that connection produces.
    pub fn unpack(connection: ConnectionType, buf: &[u8]) -> Result<Self, DriverError> {
        let report_id = buf.first().copied().unwrap_or_default();
        let size = buf.len();
        match (connection, report_id, size) {
            (ConnectionType::Usb, INPUT_REPORT_USB, INPUT_REPORT_USB_SIZE) => {
                log::trace!("Got USB input report");
                let data = UsbPackedInputStatusReport::unpack_from_slice(buf)?;
                Ok(Self::Usb(data))
            }
            (ConnectionType::Bluetooth, INPUT_REPORT_BT, INPUT_REPORT_BT_SIZE) => {
                log::trace!("Got Bluetooth input report");
                if !crc::validate(crc::INPUT_CRC32_SEED, buf) {
                    log::debug!("Bluetooth input report checksum does not match");
                }
                let data = BluetoothPackedInputStatusReport::unpack_from_slice(buf)?;
                Ok(Self::Bluetooth(data))
            }
            _ => Err(DriverError::UnrecognizedReport { report_id, size }),
        }
    }

    /// Decode the battery state from the report
    pub fn battery(&self) -> BatteryStatus {
        let (charging_status, capacity) = match self {
            PackedInputStatusReport::Usb(report) => (
                report.charging_status.to_primitive(),
                report.battery_capacity.to_primitive(),
            ),
            PackedInputStatusReport::Bluetooth(report) => (
                report.charging_status.to_primitive(),
                report.battery_capacity.to_primitive(),
            ),
        };
        BatteryStatus::new(charging_status, capacity)
    }
}

/// Charging state reported by the controller
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerState {
    Discharging,
    Charging,
    Full,
    NotCharging,
    Unknown,
}

impl From<u8> for PowerState {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Discharging,
            0x01 => Self::Charging,
            0x02 => Self::Full,
            // Voltage or temperature out of range, temperature error
            0x0A | 0x0B => Self::NotCharging,
            _ => Self::Unknown,
        }
    }
}

impl Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            PowerState::Discharging => "discharging",
            PowerState::Charging => "charging",
            PowerState::Full => "full",
            PowerState::NotCharging => "not-charging",
            PowerState::Unknown => "unknown",
        };
        write!(f, "{}", value)
    }
}

/// Battery capacity in percent along with the charging state
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct BatteryStatus {
    pub capacity: u8,
    pub status: PowerState,
}

impl BatteryStatus {
    /// Build the battery status from the two nibbles of the status byte.
    /// Each unit of capacity corresponds to 10%: 0 = 0-9%, 1 = 10-19%, ..
    /// and 10 = 100%.
    pub fn new(charging_status: u8, capacity: u8) -> Self {
        let status = PowerState::from(charging_status);
        let capacity = match status {
            PowerState::Discharging | PowerState::Charging => {
                capacity.saturating_mul(10).saturating_add(5).min(100)
            }
            PowerState::Full => 100,
            PowerState::NotCharging | PowerState::Unknown => 0,
        };
        Self { capacity, status }
    }
}

impl Display for BatteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.capacity, self.status)
    }
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "64")]
pub struct FirmwareInfoPackedReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8, // Report ID (always 0x20)

    // byte 1-19
    #[packed_field(bytes = "1..=11")]
    pub build_date: [u8; 11],
    #[packed_field(bytes = "12..=19")]
    pub build_time: [u8; 8],

    // byte 20-23
    #[packed_field(bytes = "20..=21", endian = "lsb")]
    pub fw_type: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "22..=23", endian = "lsb")]
    pub sw_series: Integer<u16, packed_bits::Bits<16>>,

    // byte 24-31
    // 0x00FF0000 variation, 0x0000FF00 generation
    #[packed_field(bytes = "24..=27", endian = "lsb")]
    pub hardware_info: Integer<u32, packed_bits::Bits<32>>,
    #[packed_field(bytes = "28..=31", endian = "lsb")]
    pub firmware_version: Integer<u32, packed_bits::Bits<32>>, // 0xAABBCCCC AA.BB.CCCC

    // byte 32-43
    #[packed_field(bytes = "32..=43")]
    pub device_info: [u8; 12],

    // byte 44-47
    #[packed_field(bytes = "44..=45", endian = "lsb")]
    pub update_version: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "46")]
    pub update_image_info: u8,
    #[packed_field(bytes = "47")]
    pub _update_unkn: u8,

    // byte 48-59
    #[packed_field(bytes = "48..=51", endian = "lsb")]
    pub sbl_fw_version: Integer<u32, packed_bits::Bits<32>>,
    #[packed_field(bytes = "52..=55", endian = "lsb")]
    pub venom_fw_version: Integer<u32, packed_bits::Bits<32>>,
    #[packed_field(bytes = "56..=59", endian = "lsb")]
    pub spider_dsp_fw_version: Integer<u32, packed_bits::Bits<32>>,

    // byte 60-63
    #[packed_field(bytes = "60..=63", endian = "lsb")]
    pub crc32: Integer<u32, packed_bits::Bits<32>>,
}

/// Version and build information reported by the controller firmware.
/// Values are surfaced as-is without any validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirmwareInfo {
    pub build_date: String,
    pub build_time: String,
    pub firmware_type: u16,
    pub software_series: u16,
    pub hardware_info: u32,
    pub firmware_version: u32,
    pub sbl_firmware_version: u32,
    pub venom_firmware_version: u32,
    pub spider_dsp_firmware_version: u32,
    pub update_version: u16,
    pub update_image_info: u8,
    pub device_info: [u8; 12],
}

impl FirmwareInfo {
    /// Decode the firmware feature report. The buffer must be exactly
    /// [FEATURE_REPORT_FIRMWARE_INFO_SIZE] bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, DriverError> {
        if buf.len() != FEATURE_REPORT_FIRMWARE_INFO_SIZE {
            return Err(DriverError::InvalidLength {
                expected: FEATURE_REPORT_FIRMWARE_INFO_SIZE,
                actual: buf.len(),
            });
        }
        let report = FirmwareInfoPackedReport::unpack_from_slice(buf)?;
        Ok(report.into())
    }

    /// Hardware variation from the hardware info bitfield
    pub fn hardware_variation(&self) -> u8 {
        ((self.hardware_info & 0x00FF_0000) >> 16) as u8
    }

    /// Hardware generation from the hardware info bitfield
    pub fn hardware_generation(&self) -> u8 {
        ((self.hardware_info & 0x0000_FF00) >> 8) as u8
    }
}

impl From<FirmwareInfoPackedReport> for FirmwareInfo {
    fn from(report: FirmwareInfoPackedReport) -> Self {
        Self {
            build_date: packed_string(&report.build_date),
            build_time: packed_string(&report.build_time),
            firmware_type: report.fw_type.to_primitive(),
            software_series: report.sw_series.to_primitive(),
            hardware_info: report.hardware_info.to_primitive(),
            firmware_version: report.firmware_version.to_primitive(),
            sbl_firmware_version: report.sbl_fw_version.to_primitive(),
            venom_firmware_version: report.venom_fw_version.to_primitive(),
            spider_dsp_firmware_version: report.spider_dsp_fw_version.to_primitive(),
            update_version: report.update_version.to_primitive(),
            update_image_info: report.update_image_info,
            device_info: report.device_info,
        }
    }
}

impl Display for FirmwareInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Hardware: {:x}", self.hardware_info)?;
        writeln!(f, "Build date: {} {}", self.build_date, self.build_time)?;
        writeln!(
            f,
            "Firmware: {:x} (type {})",
            self.firmware_version, self.firmware_type
        )?;
        writeln!(
            f,
            "Fw version: {} {} {}",
            self.sbl_firmware_version, self.venom_firmware_version, self.spider_dsp_firmware_version
        )?;
        writeln!(f, "Sw series: {}", self.software_series)?;
        write!(f, "Update version: {:04x}", self.update_version)
    }
}

/// Read a fixed-size, possibly NUL-terminated string field
fn packed_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).to_string()
}
