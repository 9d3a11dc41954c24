//! Configuration management for vole-emu.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (VOLE_EMU_MEMORY_SIZE, etc.)
//! 2. Project-local config file (`./vole-emu.toml`)
//! 3. User config file (`~/.config/vole-emu/config.toml`)
//! 4. Built-in defaults (the classic 256-byte, 16-register machine)
//!
//! # Config File Format
//!
//! ```toml
//! # vole-emu.toml
//!
//! # Memory capacity in bytes
//! memory_size = 256
//!
//! # Number of general-purpose registers
//! register_count = 16
//!
//! # Stop after this many cycles; 0 means run until halt
//! max_cycles = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global cached configuration.
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Default memory capacity of the standard machine.
pub const DEFAULT_MEMORY_SIZE: usize = 256;

/// Default register count of the standard machine.
pub const DEFAULT_REGISTER_COUNT: usize = 16;

/// vole-emu configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Memory capacity in bytes.
    pub memory_size: Option<usize>,

    /// Number of general-purpose registers.
    pub register_count: Option<usize>,

    /// Cycle guard for non-terminating programs (0 = unlimited).
    pub max_cycles: Option<u64>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Project-local `vole-emu.toml`
    /// 3. User config `~/.config/vole-emu/config.toml`
    /// 4. Defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load user config first (lowest priority of file configs)
        if let Some(user_config) = Self::load_user_config() {
            config.merge(user_config);
        }

        // Load project-local config (higher priority)
        if let Some(local_config) = Self::load_local_config() {
            config.merge(local_config);
        }

        // Environment variables override everything
        config.apply_env_overrides();

        config
    }

    /// Get the cached global configuration.
    ///
    /// Loads configuration on first call and caches it.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| {
            let config = Self::load();
            log::debug!("Loaded configuration: {:?}", config);
            config
        })
    }

    /// Memory capacity, defaulting to the standard 256 bytes.
    pub fn memory_size(&self) -> usize {
        self.memory_size.unwrap_or(DEFAULT_MEMORY_SIZE)
    }

    /// Register count, defaulting to the standard 16.
    pub fn register_count(&self) -> usize {
        self.register_count.unwrap_or(DEFAULT_REGISTER_COUNT)
    }

    /// Cycle guard, defaulting to 0 (run until halt).
    pub fn max_cycles(&self) -> u64 {
        self.max_cycles.unwrap_or(0)
    }

    /// Load user configuration from ~/.config/vole-emu/config.toml
    fn load_user_config() -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        let config_path = config_dir.join("vole-emu").join("config.toml");
        Self::load_from_file(&config_path)
    }

    /// Load project-local configuration from ./vole-emu.toml
    fn load_local_config() -> Option<Self> {
        Self::load_from_file(Path::new("vole-emu.toml"))
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    fn merge(&mut self, other: Self) {
        if other.memory_size.is_some() {
            self.memory_size = other.memory_size;
        }
        if other.register_count.is_some() {
            self.register_count = other.register_count;
        }
        if other.max_cycles.is_some() {
            self.max_cycles = other.max_cycles;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Some(size) = Self::env_number::<usize>("VOLE_EMU_MEMORY_SIZE") {
            self.memory_size = Some(size);
        }
        if let Some(count) = Self::env_number::<usize>("VOLE_EMU_REGISTER_COUNT") {
            self.register_count = Some(count);
        }
        if let Some(limit) = Self::env_number::<u64>("VOLE_EMU_MAX_CYCLES") {
            self.max_cycles = Some(limit);
        }
    }

    fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
        let value = std::env::var(name).ok()?;
        match value.parse() {
            Ok(parsed) => {
                log::info!("Using {} from environment: {}", name, value);
                Some(parsed)
            }
            Err(_) => {
                log::warn!("Ignoring non-numeric {}: {}", name, value);
                None
            }
        }
    }

    /// Get the path to the user config file (for display/creation).
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vole-emu").join("config.toml"))
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# vole-emu configuration
# Place this file at ~/.config/vole-emu/config.toml or ./vole-emu.toml

# Memory capacity in bytes (default 256)
# memory_size = 256

# Number of general-purpose registers (default 16)
# register_count = 16

# Stop after this many cycles; 0 means run until halt (default 0)
# max_cycles = 0
"#
        .to_string()
    }
}
