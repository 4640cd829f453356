use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load the configuration file if one was given, otherwise use defaults
pub fn load_or_default(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}

/// CLI arguments that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub packet_delay_ms: Option<u64>,
    pub packet_size: Option<usize>,
    pub max_nodes: Option<usize>,
    pub log_level: Option<String>,
}

/// Apply CLI overrides to a configuration
pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(dir) = &overrides.data_dir {
        info!("Overriding data directory: {:?}", dir);
        config.storage.data_dir = dir.clone();
    }

    if let Some(ms) = overrides.packet_delay_ms {
        info!("Overriding packet delay: {}ms", ms);
        config.simulation.packet_delay = Duration::from_millis(ms);
    }

    if let Some(size) = overrides.packet_size {
        config.simulation.packet_size = size;
    }

    if let Some(max_nodes) = overrides.max_nodes {
        config.simulation.max_nodes = max_nodes;
    }

    if let Some(level) = &overrides.log_level {
        config.general.log_level = Some(level.clone());
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let yaml = r#"
general:
  log_level: debug
simulation:
  max_nodes: 10
  packet_size: 16
  packet_delay: "5ms"
storage:
  data_dir: "sim"
  network_file: "net.txt"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.general.log_level.as_deref(), Some("debug"));
        assert_eq!(config.simulation.max_nodes, 10);
        assert_eq!(config.simulation.packet_size, 16);
        assert_eq!(config.simulation.packet_delay, Duration::from_millis(5));
        assert_eq!(config.network_path(), PathBuf::from("sim/net.txt"));
        assert_eq!(config.dot_path(), PathBuf::from("sim/network.dot"));
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "simulation:\n  packet_size: 0\n").unwrap();
        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load_config(Path::new("/definitely/not/here.yaml")).is_err());
        assert_eq!(load_or_default(None).unwrap(), Config::default());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let overrides = CliOverrides {
            data_dir: Some(PathBuf::from("/tmp/other")),
            packet_delay_ms: Some(0),
            packet_size: Some(4),
            max_nodes: None,
            log_level: Some("warn".to_string()),
        };

        apply_cli_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/other"));
        assert_eq!(config.simulation.packet_delay, Duration::ZERO);
        assert_eq!(config.simulation.packet_size, 4);
        assert_eq!(config.simulation.max_nodes, 100);
        assert_eq!(config.general.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut config = Config::default();
        let overrides = CliOverrides {
            max_nodes: Some(0),
            ..CliOverrides::default()
        };
        assert!(apply_cli_overrides(&mut config, &overrides).is_err());
    }
}
