//! Disconnecting controllers through BlueZ.
//!
//! A Bluetooth controller powers itself off once the host drops the link, so
//! powering off is done by asking BlueZ to disconnect the device whose
//! address matches the controller serial.
use std::collections::HashMap;

use thiserror::Error;
use zbus::fdo::{self, ObjectManagerProxy};
use zbus::names::OwnedInterfaceName;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};
use zbus::{Connection, Proxy};


pub const BLUEZ_SERVICE: &str = "org.bluez";
pub const BLUEZ_DEVICE_INTERFACE: &str = "org.bluez.Device1";

/// Objects exported by BlueZ with their interfaces and properties
pub type ManagedObjects =
    HashMap<OwnedObjectPath, HashMap<OwnedInterfaceName, HashMap<String, OwnedValue>>>;

#[derive(Error, Debug)]
pub enum BluetoothError {
    #[error("no Bluetooth device with address {0} is known to BlueZ")]
    DeviceNotFound(String),
    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),
    #[error("D-Bus error: {0}")]
    Fdo(#[from] fdo::Error),
}

/// Find the BlueZ device object with the given address
pub fn find_device_path(objects: &ManagedObjects, address: &str) -> Option<OwnedObjectPath> {
    objects.iter().find_map(|(path, interfaces)| {
        let properties = interfaces
            .iter()
            .find(|(name, _)| name.as_str() == BLUEZ_DEVICE_INTERFACE)
            .map(|(_, properties)| properties)?;
        let value = properties.get("Address")?;
        match &**value {
            Value::Str(addr) if addr.as_str().eq_ignore_ascii_case(address) => Some(path.clone()),
            _ => None,
        }
    })
}

/// Disconnect the Bluetooth device with the given address
pub async fn disconnect(address: &str) -> Result<(), BluetoothError> {
    let connection = Connection::system().await?;
    let manager = ObjectManagerProxy::builder(&connection)
        .destination(BLUEZ_SERVICE)?
        .path("/")?
        .build()
        .await?;
    let objects = manager.get_managed_objects().await?;

    let Some(path) = find_device_path(&objects, address) else {
        return Err(BluetoothError::DeviceNotFound(address.to_string()));
    };
    log::debug!("Disconnecting {address} at {}", path.as_str());

    let device = Proxy::new(
        &connection,
        BLUEZ_SERVICE,
        path.as_str(),
        BLUEZ_DEVICE_INTERFACE,
    )
    .await?;
    device.call_method("Disconnect", &()).await?;

    Ok(())
}
