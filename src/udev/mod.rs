#[cfg(test)]
pub mod device_test;

pub mod device;

use std::error::Error;

use udev::Enumerator;

use self::device::UdevDevice;

/// Base path of input device nodes
pub const INPUT_DEVICE_PATH: &str = "/dev/input";

/// Returns the event nodes of all DualSense controllers currently present.
pub fn discover_devices() -> Result<Vec<UdevDevice>, Box<dyn Error>> {
    let mut enumerator = Enumerator::new()?;
    enumerator.match_subsystem("input")?;
    enumerator.match_property("ID_INPUT_JOYSTICK", "1")?;

    log::debug!("Started udev input enumerator.");

    let devices = enumerator
        .scan_devices()?
        .filter_map(|device| {
            let name = device.sysname().to_str()?.to_string();
            device.devnode()?;
            Some(UdevDevice::from_devnode(INPUT_DEVICE_PATH, name.as_str()))
        })
        .filter(|device| device.is_dualsense())
        .collect();

    Ok(devices)
}
