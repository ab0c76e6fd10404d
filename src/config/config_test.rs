use std::{error::Error, time::Duration};

use crate::config::{path, Config, LoadError, MonitorConfig};

#[test]
fn test_load_config() -> Result<(), Box<dyn Error>> {
    let content = r#"
device: "A0:B1:C2:D3:E4:F5"
read_timeout_ms: 250
lightbar_brightness: 128
monitor:
  add: "notify-send connected $DS_DEV"
  wait: true
"#;
    let config = Config::from_yaml(content.to_string())?;
    assert_eq!(config.device.as_deref(), Some("A0:B1:C2:D3:E4:F5"));
    assert_eq!(config.read_timeout(), Duration::from_millis(250));
    assert_eq!(config.lightbar_brightness(), 128);
    assert_eq!(
        config.monitor,
        Some(MonitorConfig {
            add: Some("notify-send connected $DS_DEV".to_string()),
            remove: None,
            wait: Some(true),
        })
    );

    Ok(())
}

#[test]
fn test_default_config() -> Result<(), Box<dyn Error>> {
    let config = Config::from_yaml("{}".to_string())?;
    assert_eq!(config, Config::default());
    assert_eq!(config.read_timeout(), Duration::from_millis(1000));
    assert_eq!(config.lightbar_brightness(), 255);

    Ok(())
}

#[test]
fn test_invalid_config() {
    let result = Config::from_yaml("read_timeout_ms: soon".to_string());
    assert!(matches!(result, Err(LoadError::DeserializeError(_))));

    let result = Config::from_yaml_path(std::path::Path::new("/nonexistent/config.yaml"));
    assert!(matches!(result, Err(LoadError::IoError(_))));
}

#[test]
fn test_config_from_file() -> Result<(), Box<dyn Error>> {
    let path = std::env::temp_dir().join(format!("dualsensectl-test-{}.yaml", std::process::id()));
    std::fs::write(&path, "lightbar_brightness: 64\n")?;
    let config = Config::from_yaml_path(&path);
    std::fs::remove_file(&path)?;
    assert_eq!(config?.lightbar_brightness(), 64);

    Ok(())
}

#[test]
fn test_config_paths() {
    let paths = path::get_config_paths();
    let last = paths.last().map(|p| p.to_string_lossy().to_string());
    assert_eq!(last.as_deref(), Some("/etc/dualsensectl/config.yaml"));
    assert!(paths
        .iter()
        .all(|p| p.ends_with(path::CONFIG_FILE_NAME)));
}
