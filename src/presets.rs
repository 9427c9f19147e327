use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use log::{info, warn};

use crate::display::NotchFilters;
use crate::make_waves::SimulationConfig;

pub const DEFAULT_CONFIG_PATH: &str = "spectrograph.yaml";

// Everything the harness reads at startup. Missing fields fall back to defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub notch: NotchFilters,
    pub simulation: SimulationConfig,
    // Pause between processing cycles
    pub cycle_interval_ms: u64,
    // Pause between OSD frames
    pub render_interval_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            notch: NotchFilters::default(),
            simulation: SimulationConfig::default(),
            cycle_interval_ms: 20,
            render_interval_ms: 100,
        }
    }
}

// Loads and saves the YAML configuration file
pub struct ConfigFile {
    pub config: AnalyzerConfig,
    file_path: PathBuf,
}

impl ConfigFile {
    /// Reads `file_path`, or writes a default configuration there when the
    /// file does not exist yet.
    pub fn load_or_create(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();
        let config = if file_path.exists() {
            info!("Loading configuration from {}", file_path.display());
            let yaml_str = fs::read_to_string(&file_path)?;
            let config: AnalyzerConfig = serde_yaml::from_str(&yaml_str)
                .map_err(|e| anyhow!("Failed to parse {}: {}", file_path.display(), e))?;
            validate(&config);
            config
        } else {
            info!("No configuration found at {}. Creating it with defaults.", file_path.display());
            let manager = Self { config: AnalyzerConfig::default(), file_path };
            manager.save()?;
            return Ok(manager);
        };

        Ok(Self { config, file_path })
    }

    pub fn save(&self) -> Result<()> {
        let yaml_str = serde_yaml::to_string(&self.config)?;
        fs::write(&self.file_path, yaml_str)?;
        info!("Configuration saved to {}", self.file_path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

// Suspicious but usable values only get a warning
fn validate(config: &AnalyzerConfig) {
    for (i, slot) in config.notch.slots.iter().enumerate() {
        if slot.is_active() && slot.cutoff_hz >= slot.center_hz {
            warn!("Notch {} cutoff {} Hz is not below its centre {} Hz", i + 1, slot.cutoff_hz, slot.center_hz);
        }
    }
    if config.cycle_interval_ms == 0 {
        warn!("cycle_interval_ms is 0, the processing thread will spin");
    }
}
