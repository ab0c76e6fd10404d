use std::collections::HashMap;
use std::error::Error;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::mpsc;

use crate::udev::{self, device::UdevDevice, INPUT_DEVICE_PATH};
use crate::watcher::{self, WatchEvent};

/// Environment variable holding the serial of the controller that triggered
/// the command
pub const DEVICE_ENV_VAR: &str = "DS_DEV";

/// Time between checks for udev to finish processing a new device node
const UDEV_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Number of checks before a new device node is given up on
const UDEV_SETTLE_ATTEMPTS: usize = 50;

const BUFFER_SIZE: usize = 64;

/// Commands to run when controllers are connected or disconnected
#[derive(Debug, Clone, Default)]
pub struct MonitorOptions {
    pub add: Option<String>,
    pub remove: Option<String>,
    pub wait: bool,
}

/// Watch for DualSense controllers being connected or disconnected and run
/// the configured commands. Controllers already connected are reported as
/// added on start.
pub async fn handle_monitor(options: MonitorOptions) -> Result<(), Box<dyn Error>> {
    let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
    let watch_path = INPUT_DEVICE_PATH.to_string();
    let watch_task = tokio::task::spawn_blocking(move || watcher::watch(watch_path, tx));

    // Serials of known controllers by event node name. Removed nodes can no
    // longer be queried.
    let mut devices: HashMap<String, String> = HashMap::new();

    for device in udev::discover_devices()? {
        let serial = device.uniq();
        log::info!("Found controller {serial} at {}", device.devnode());
        devices.insert(device.sysname(), serial.clone());
        notify(options.add.as_deref(), serial.as_str(), options.wait).await;
    }

    while let Some(event) = rx.recv().await {
        handle_event(&options, &mut devices, event).await;
    }

    watch_task.await?;
    Err("Device watcher stopped".into())
}

/// Update the known controllers for the given watch event and run the
/// matching command.
pub async fn handle_event(
    options: &MonitorOptions,
    devices: &mut HashMap<String, String>,
    event: WatchEvent,
) {
    match event {
        WatchEvent::Create { name, base_path } => {
            let device = UdevDevice::from_devnode(base_path.as_str(), name.as_str());
            if !device.is_event_node() {
                return;
            }
            // The node shows up before udev has tagged it as a joystick
            if !device.wait_initialized(UDEV_SETTLE_ATTEMPTS, UDEV_SETTLE_DELAY).await {
                log::warn!("Timed out waiting for udev to process {}", device.devnode());
                return;
            }
            if !device.is_dualsense() {
                log::trace!("Ignoring device {}", device.devnode());
                return;
            }
            let serial = device.uniq();
            log::info!("Controller {serial} connected at {}", device.devnode());
            devices.insert(name, serial.clone());
            notify(options.add.as_deref(), serial.as_str(), options.wait).await;
        }
        WatchEvent::Delete { name, .. } => {
            let Some(serial) = devices.remove(&name) else {
                return;
            };
            log::info!("Controller {serial} disconnected");
            notify(options.remove.as_deref(), serial.as_str(), options.wait).await;
        }
    }
}

/// Run the given command, logging any failure to start it
async fn notify(command: Option<&str>, serial: &str, wait: bool) {
    if let Err(e) = run_command(command, serial, wait).await {
        log::error!("Failed to run command for {serial}: {e}");
    }
}

/// Run the given shell command with the controller serial in [DEVICE_ENV_VAR].
/// Returns the exit status when waiting for the command to finish.
pub async fn run_command(
    command: Option<&str>,
    serial: &str,
    wait: bool,
) -> Result<Option<ExitStatus>, Box<dyn Error>> {
    let Some(command) = command else {
        return Ok(None);
    };
    log::debug!("Running '{command}' for {serial}");

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command).env(DEVICE_ENV_VAR, serial);

    if !wait {
        cmd.spawn()?;
        return Ok(None);
    }

    let status = cmd.status().await?;
    if !status.success() {
        log::warn!("Command '{command}' exited with {status}");
    }
    Ok(Some(status))
}
