use std::env;
use std::process::ExitCode;

use clap::Parser;

use crate::cli::{main_cli, Args};
use crate::drivers::dualsense::error::DriverError;

mod bluetooth;
mod cli;
mod config;
mod drivers;
mod udev;
mod watcher;

/// Exit status for failures talking to the device
const EXIT_IO_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "warn".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::debug!("Starting dualsensectl v{}", VERSION);

    let args = Args::parse();
    match main_cli(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            let is_io_error = e
                .downcast_ref::<DriverError>()
                .is_some_and(|e| e.is_transport());
            if is_io_error {
                ExitCode::from(EXIT_IO_ERROR)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
