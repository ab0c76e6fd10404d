pub mod monitor;
pub mod trigger;


use std::error::Error;
use std::fmt::Display;

use clap::{Parser, Subcommand, ValueEnum};
use hidapi::HidApi;
use monitor::{handle_monitor, MonitorOptions};
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};
use trigger::{TriggerCommand, TriggerSide};

use crate::bluetooth;
use crate::config::Config;
use crate::drivers::dualsense::driver::{list_devices, ConnectionType, Driver, SpeakerRoute};
use crate::drivers::dualsense::error::DriverError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Serial (MAC address) of the controller to use
    #[arg(short, long)]
    pub device: Option<String>,
    /// List the connected controllers
    #[arg(short, long)]
    pub list: bool,
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Turn off the controller (Bluetooth only)
    PowerOff,
    /// Get the controller battery level
    Battery,
    /// Get the controller firmware info
    Info {
        /// Print the info as JSON
        #[arg(long, action)]
        json: bool,
    },
    /// Control the lightbar
    Lightbar {
        #[command(subcommand)]
        cmd: LightbarCommand,
    },
    /// Light up the player indicators for the given player number (0-5)
    PlayerLeds { number: u8 },
    /// Enable or disable the microphone
    Microphone { state: Toggle },
    /// Turn the microphone LED on or off
    MicrophoneLed { state: Toggle },
    /// Select where audio is played
    Speaker { route: Speaker },
    /// Set the audio volume (0-255)
    Volume { volume: u8 },
    /// Reduce rumble and trigger vibration strength (0-7 each)
    Attenuation { rumble: u8, trigger: u8 },
    /// Configure the adaptive triggers
    Trigger {
        side: TriggerSide,
        #[command(subcommand)]
        effect: TriggerCommand,
    },
    /// Run commands when controllers are connected or disconnected. The
    /// controller serial is available to the commands as $DS_DEV.
    Monitor {
        /// Command to run when a controller is connected
        #[arg(long)]
        add: Option<String>,
        /// Command to run when a controller is disconnected
        #[arg(long)]
        remove: Option<String>,
        /// Wait for each command to finish before handling the next event
        #[arg(long, action)]
        wait: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum LightbarCommand {
    /// Turn the lightbar on
    On,
    /// Turn the lightbar off
    Off,
    /// Set the lightbar color
    Color {
        red: u8,
        green: u8,
        blue: u8,
        /// Brightness applied to each color channel (0-255)
        brightness: Option<u8>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(value: Toggle) -> Self {
        matches!(value, Toggle::On)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Speaker {
    /// Internal speaker only
    Internal,
    /// Headphone jack only
    Headphone,
    /// Left channel of the headphone jack only
    Monoheadphone,
    /// Internal speaker and headphone jack
    Both,
}

impl From<Speaker> for SpeakerRoute {
    fn from(value: Speaker) -> Self {
        match value {
            Speaker::Internal => Self::Internal,
            Speaker::Headphone => Self::Headphone,
            Speaker::Monoheadphone => Self::MonoHeadphone,
            Speaker::Both => Self::Both,
        }
    }
}

impl Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Speaker::Internal => "internal",
            Speaker::Headphone => "headphone",
            Speaker::Monoheadphone => "monoheadphone",
            Speaker::Both => "both",
        };
        write!(f, "{}", value)
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Connection")]
    connection: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Path")]
    path: String,
}

pub async fn main_cli(args: Args) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    if args.list {
        return handle_list();
    }
    let Some(cmd) = args.cmd else {
        return Err("No command given, see --help".into());
    };

    // Monitoring does not use a device session
    let cmd = match cmd {
        Commands::Monitor { add, remove, wait } => {
            let defaults = config.monitor.clone().unwrap_or_default();
            let options = MonitorOptions {
                add: add.or(defaults.add),
                remove: remove.or(defaults.remove),
                wait: wait || defaults.wait.unwrap_or(false),
            };
            return handle_monitor(options).await;
        }
        cmd => cmd,
    };

    let api = HidApi::new().map_err(|e| DriverError::Transport(e.into()))?;
    let serial = args.device.or(config.device.clone());
    let mut driver =
        Driver::open(&api, serial.as_deref())?.with_read_timeout(config.read_timeout());

    match cmd {
        Commands::PowerOff => {
            if driver.connection() != ConnectionType::Bluetooth {
                return Err(DriverError::NotBluetooth.into());
            }
            bluetooth::disconnect(driver.mac_address()).await?;
        }
        Commands::Battery => {
            let battery = driver.battery()?;
            println!("{battery}");
        }
        Commands::Info { json } => {
            let info = driver.firmware_info()?;
            log::debug!(
                "Hardware variation {:#04x}, generation {:#04x}",
                info.hardware_variation(),
                info.hardware_generation()
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{info}");
            }
        }
        Commands::Lightbar { cmd } => match cmd {
            LightbarCommand::On => driver.set_lightbar_enabled(true)?,
            LightbarCommand::Off => driver.set_lightbar_enabled(false)?,
            LightbarCommand::Color {
                red,
                green,
                blue,
                brightness,
            } => {
                let brightness = brightness.unwrap_or(config.lightbar_brightness());
                driver.set_lightbar_color(red, green, blue, brightness)?
            }
        },
        Commands::PlayerLeds { number } => driver.set_player_leds(number)?,
        Commands::Microphone { state } => driver.set_microphone_enabled(state.into())?,
        Commands::MicrophoneLed { state } => driver.set_microphone_led(state.into())?,
        Commands::Speaker { route } => driver.set_speaker(route.into())?,
        Commands::Volume { volume } => driver.set_volume(volume)?,
        Commands::Attenuation { rumble, trigger } => driver.set_attenuation(rumble, trigger)?,
        Commands::Trigger { side, effect } => {
            let effect = effect.into_effect()?;
            driver.set_trigger_effect(side.into(), &effect)?;
        }
        Commands::Monitor { .. } => (),
    }

    Ok(())
}

/// Print a table of all connected controllers
fn handle_list() -> Result<(), Box<dyn Error>> {
    let api = HidApi::new().map_err(|e| DriverError::Transport(e.into()))?;
    let devices = list_devices(&api);
    if devices.is_empty() {
        println!("No devices found");
        return Ok(());
    }

    let rows: Vec<DeviceRow> = devices
        .into_iter()
        .map(|device| DeviceRow {
            serial: device.serial,
            connection: device.connection.to_string(),
            product: device.product.to_string(),
            path: device.path,
        })
        .collect();
    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("DualSense Controllers"));
    println!("{table}");

    Ok(())
}
