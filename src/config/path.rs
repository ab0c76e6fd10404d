//! Module for searching for dualsensectl config files

use std::path::PathBuf;

/// Name of the config file in each config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// System-wide config directory used after the user config directory
const SYSTEM_CONFIG_PATH: &str = "/etc/dualsensectl";

/// Returns the user config directory (e.g. "~/.config/dualsensectl")
pub fn get_user_config_path() -> Option<PathBuf> {
    let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("dualsensectl") else {
        log::warn!("Unable to determine user config path.");
        return None;
    };
    Some(base_dirs.get_config_home())
}

/// Returns a list of config file paths in load order.
/// E.g. ["~/.config/dualsensectl/config.yaml", "/etc/dualsensectl/config.yaml"]
pub fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = get_user_config_path() {
        paths.push(path.join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG_PATH).join(CONFIG_FILE_NAME));

    paths
}
