//! Monitor configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const CONFIG_FILE: &str = "monitors.json";

/// Tuning knobs for the content monitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// How long to wait before a package change is re-evaluated, in
    /// milliseconds. Lets the platform settle transient intermediate
    /// states (a package briefly reported disabled mid-upgrade) before
    /// the index is touched.
    pub package_settle_delay_ms: u64,

    /// Capacity of the package event queue drained by the receiver task.
    pub package_event_queue: usize,

    /// Whether registration starts the asynchronous print-services load
    /// on platforms that support printing.
    pub load_print_services: bool,
}

impl MonitorConfig {
    /// Load configuration from `data_dir`, creating the default file if
    /// none exists yet.
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            info!("Loading monitor config from {:?}", config_path);
            let json = fs::read_to_string(&config_path)?;
            let config = serde_json::from_str(&json)?;
            Ok(config)
        } else {
            warn!("No monitor config found, creating default at {:?}", config_path);
            let config = Self::default();
            config.save(data_dir)?;
            Ok(config)
        }
    }

    /// Save configuration to `data_dir`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let config_path = data_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, json)?;
        Ok(())
    }

    pub fn package_settle_delay(&self) -> Duration {
        Duration::from_millis(self.package_settle_delay_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            package_settle_delay_ms: 2000,
            package_event_queue: 64,
            load_print_services: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.package_settle_delay(), Duration::from_millis(2000));
        assert_eq!(config.package_event_queue, 64);
        assert!(config.load_print_services);
    }

    #[test]
    fn load_creates_default_then_round_trips() {
        let dir = TempDir::new().unwrap();

        let created = MonitorConfig::load_from(dir.path()).unwrap();
        assert_eq!(created.package_settle_delay_ms, 2000);
        assert!(dir.path().join(CONFIG_FILE).exists());

        let mut edited = created;
        edited.package_settle_delay_ms = 250;
        edited.save(dir.path()).unwrap();

        let reloaded = MonitorConfig::load_from(dir.path()).unwrap();
        assert_eq!(reloaded.package_settle_delay_ms, 250);
    }
}
