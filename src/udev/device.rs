use std::{error::Error, path::Path, time::Duration};

use crate::drivers::dualsense::driver::is_dualsense;

/// Base sysfs path for input class devices
const SYSFS_INPUT_PATH: &str = "/sys/class/input";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UdevDevice {
    devnode: String,
    syspath: String,
    sysname: String,
}

impl UdevDevice {
    /// Returns a UdevDevice object from the given base path and name.
    /// e.g. UdevDevice::from_devnode("/dev/input", "event12");
    pub fn from_devnode(base_path: &str, name: &str) -> Self {
        Self {
            devnode: format!("{base_path}/{name}"),
            syspath: format!("{SYSFS_INPUT_PATH}/{name}"),
            sysname: name.to_string(),
        }
    }

    /// returns a udev::Device from the stored syspath.
    pub fn get_device(&self) -> Result<::udev::Device, Box<dyn Error + Send + Sync>> {
        match ::udev::Device::from_syspath(Path::new(self.syspath.as_str())) {
            Ok(device) => Ok(device),
            Err(e) => Err(e.into()),
        }
    }

    pub fn devnode(&self) -> String {
        self.devnode.clone()
    }

    pub fn sysname(&self) -> String {
        self.sysname.clone()
    }

    /// Returns true for evdev event nodes (e.g. "event12")
    pub fn is_event_node(&self) -> bool {
        self.sysname.starts_with("event")
    }

    pub fn id_product(&self) -> u16 {
        let Ok(device) = self.get_device() else {
            return 0;
        };
        parse_hex_id(get_attribute_from_tree(&device, "id/product").as_str())
    }

    pub fn id_vendor(&self) -> u16 {
        let Ok(device) = self.get_device() else {
            return 0;
        };
        parse_hex_id(get_attribute_from_tree(&device, "id/vendor").as_str())
    }

    /// Unique identifier of the input device. DualSense controllers report
    /// their MAC address here.
    pub fn uniq(&self) -> String {
        let Ok(device) = self.get_device() else {
            return "".to_string();
        };
        get_attribute_from_tree(&device, "uniq")
    }

    /// Returns true if udev classified the device as a joystick
    pub fn is_joystick(&self) -> bool {
        let Ok(device) = self.get_device() else {
            return false;
        };
        device
            .property_value("ID_INPUT_JOYSTICK")
            .map(|value| value == "1")
            .unwrap_or(false)
    }

    /// Returns true once udev has processed the device and its properties
    /// can be read.
    pub fn is_initialized(&self) -> bool {
        let Ok(device) = self.get_device() else {
            return false;
        };
        device.is_initialized()
    }

    /// Poll until udev has processed the device, checking up to `attempts`
    /// times with `delay` between checks. Returns false if the device never
    /// became ready.
    pub async fn wait_initialized(&self, attempts: usize, delay: Duration) -> bool {
        for attempt in 0..attempts {
            if self.is_initialized() {
                return true;
            }
            log::trace!(
                "Waiting for udev to initialize {} (attempt {})",
                self.devnode,
                attempt + 1
            );
            tokio::time::sleep(delay).await;
        }
        self.is_initialized()
    }

    /// Returns true if this is the joystick event node of a DualSense
    pub fn is_dualsense(&self) -> bool {
        self.is_event_node()
            && self.is_joystick()
            && is_dualsense(self.id_vendor(), self.id_product())
    }
}

/// Parse a hexadecimal id attribute such as "054c" or "0x054c"
pub fn parse_hex_id(value: &str) -> u16 {
    let value = value.trim();
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    u16::from_str_radix(stripped, 16).unwrap_or(0)
}

/// Gets an attribute from the first device in the device tree to match the attribute.
pub fn get_attribute_from_tree(device: &::udev::Device, attribute: &str) -> String {
    let attr = match device.attribute_value(attribute) {
        Some(attr) => attr,
        None => {
            if let Some(parent) = device.parent() {
                return get_attribute_from_tree(&parent, attribute);
            } else {
                return "".to_string();
            };
        }
    };
    attr.to_string_lossy().to_string()
}
