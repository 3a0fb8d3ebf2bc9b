//! # Cart Configuration
//!
//! Where the cart is stored and how amounts are displayed.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_CART_KEY=my-cart                                        │
//! │     STOREFRONT_STORAGE_BACKEND=memory                                  │
//! │     STOREFRONT_DATA_DIR=/var/lib/storefront                            │
//! │     STOREFRONT_CURRENCY_SYMBOL=R$                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cart/cart.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.storefront.cart/cart.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     key "tiendanube-cart", file backend, ARS "$" 2 decimals            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! key = "tiendanube-cart"
//! backend = "file"        # file | memory
//! data_dir = "/path/override"
//!
//! [display]
//! currency_code = "ARS"
//! currency_symbol = "$"
//! currency_decimals = 2
//! ```

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use storefront_core::validation::validate_storage_key;
use storefront_core::{Money, DEFAULT_STORAGE_KEY};

use crate::engine::CartEngine;
use crate::error::{ConfigError, ConfigResult};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Largest supported number of displayed decimals.
pub const MAX_CURRENCY_DECIMALS: u32 = 4;

// =============================================================================
// Storage Backend
// =============================================================================

/// Which [`KeyValueStore`] backs the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per key in the data directory.
    #[default]
    File,

    /// Nothing survives the process. Useful for kiosks and tests.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "disk" => Ok(StorageBackend::File),
            "memory" | "mem" | "none" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "Unknown storage backend: '{}'. Valid options: file, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key the cart snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// Backing store.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Overrides the platform data directory for the file backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_storage_key(),
            backend: StorageBackend::default(),
            data_dir: None,
        }
    }
}

// =============================================================================
// Display Settings
// =============================================================================

/// How amounts are rendered for people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// ISO 4217 code.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Digits after the decimal point (0-4).
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u32,
}

fn default_currency_code() -> String {
    "ARS".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_decimals() -> u32 {
    2
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl CartConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_storage_key(&self.storage.key)?;

        if self.display.currency_decimals > MAX_CURRENCY_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "currency_decimals must be at most {}, got {}",
                MAX_CURRENCY_DECIMALS, self.display.currency_decimals
            )));
        }

        Ok(())
    }

    /// Applies `STOREFRONT_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("STOREFRONT_CART_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(backend) = lookup("STOREFRONT_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.storage.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(dir) = lookup("STOREFRONT_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(symbol) = lookup("STOREFRONT_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "cart")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key.
    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }

    /// Directory used by the file backend.
    pub fn data_dir(&self) -> ConfigResult<PathBuf> {
        self.storage
            .data_dir
            .clone()
            .or_else(FileStore::platform_data_dir)
            .ok_or_else(|| ConfigError::Invalid("could not determine app data directory".into()))
    }

    /// Builds the configured backend.
    pub fn open_store(&self) -> ConfigResult<Box<dyn KeyValueStore>> {
        match self.storage.backend {
            StorageBackend::File => {
                let dir = self.data_dir()?;
                debug!(dir = %dir.display(), "Using file store");
                Ok(Box::new(FileStore::new(dir)))
            }
            StorageBackend::Memory => {
                debug!("Using memory store, cart will not survive the process");
                Ok(Box::new(MemoryStore::new()))
            }
        }
    }

    /// Builds the backend and an engine restored from it.
    pub fn open_engine(&self) -> ConfigResult<CartEngine> {
        let store = self.open_store()?;
        Ok(CartEngine::new(store, self.storage.key.clone()))
    }

    /// Formats an amount with the configured symbol and precision.
    ///
    /// Rounds half-to-even when the configured precision is below cents.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_cart::CartConfig;
    /// use storefront_core::Money;
    ///
    /// let config = CartConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// assert_eq!(config.format_currency(Money::from_cents(-50)), "-$0.50");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let decimals = self.display.currency_decimals.min(MAX_CURRENCY_DECIMALS);
        let mut value: Decimal = amount.to_decimal().abs().round_dp(decimals);
        value.rescale(decimals);

        format!(
            "{}{}{}",
            if amount.is_negative() { "-" } else { "" },
            self.display.currency_symbol,
            value
        )
    }
}
