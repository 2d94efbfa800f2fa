// Licensed under the Apache-2.0 license

use anyhow::{Context, Result};
use ate_host_frames::SPI_CONSOLE_FRAME_SIZE;
use perso_tlv::{UnpackLimits, UnpackPolicy, Unpacker, SEED_MAX_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name searched for by [`PersoToolConfig::load_default`].
pub const CONFIG_FILE_NAME: &str = "perso-tool.toml";

/// perso-tool configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersoToolConfig {
    pub frames: FramesConfig,
    pub unpack: UnpackConfig,
    pub log: LogConfig,
}

/// Console framing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramesConfig {
    pub capacity: usize,
    pub max_frames: usize,
}

/// Blob unpack limits and postconditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnpackConfig {
    pub max_tbs_certs: usize,
    pub max_certs: usize,
    pub max_seeds: usize,
    pub seed_max_size: usize,
    pub require_signature: bool,
    pub require_tbs_cert: bool,
    pub reject_zero_device_id: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of off, error, warn, info, debug, trace.
    pub level: String,
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            capacity: SPI_CONSOLE_FRAME_SIZE,
            max_frames: 20,
        }
    }
}

impl Default for UnpackConfig {
    fn default() -> Self {
        let limits = UnpackLimits::default();
        let policy = UnpackPolicy::default();
        Self {
            max_tbs_certs: limits.max_tbs_certs,
            max_certs: limits.max_certs,
            max_seeds: limits.max_seeds,
            seed_max_size: SEED_MAX_SIZE,
            require_signature: policy.require_signature,
            require_tbs_cert: policy.require_tbs_cert,
            reject_zero_device_id: policy.reject_zero_device_id,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl UnpackConfig {
    pub fn limits(&self) -> UnpackLimits {
        UnpackLimits {
            max_tbs_certs: self.max_tbs_certs,
            max_certs: self.max_certs,
            max_seeds: self.max_seeds,
            seed_max_size: self.seed_max_size,
        }
    }

    pub fn policy(&self) -> UnpackPolicy {
        UnpackPolicy {
            require_signature: self.require_signature,
            require_tbs_cert: self.require_tbs_cert,
            reject_zero_device_id: self.reject_zero_device_id,
        }
    }

    pub fn unpacker(&self) -> Unpacker {
        Unpacker::new(self.limits(), self.policy())
    }
}

impl PersoToolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: PersoToolConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Load `perso-tool.toml` from the current directory or one of its parents
    pub fn load_default() -> Result<Self> {
        Self::load_from_dir(&std::env::current_dir()?)
    }

    /// Searches `start` and its parents, falling back to defaults.
    pub fn load_from_dir(start: &Path) -> Result<Self> {
        let mut current_dir = Some(start);
        while let Some(dir) = current_dir {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                log::debug!("using config {:?}", config_path);
                return Self::from_file(config_path);
            }
            current_dir = dir.parent();
        }
        Ok(Self::default())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        std::fs::write(path.as_ref(), contents)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;

        Ok(())
    }

    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.log
            .level
            .parse()
            .with_context(|| format!("Invalid log level {:?}", self.log.level))
    }
}
