//! Configuration loader using figment.
//!
//! This module provides a layered configuration loading system:
//!
//! - **Multiple sources**: TOML files, environment variables, programmatic defaults
//! - **Layered configuration**: Later sources override earlier ones
//! - **Conventional search**: the current directory and the platform config
//!   directory are searched when no file is given explicitly
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Config file (`baleen.toml` / `config.toml`)
//! 3. Environment variables (`BALEEN_*`)
//! 4. Programmatic overrides via [`ConfigLoader::merge`]
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `BALEEN_` prefix with `__` as
//! separator:
//!
//! - `BALEEN_BOT__TOKEN=xxx` → `bot.token = "xxx"`
//! - `BALEEN_POLLING__LIMIT=50` → `polling.limit = 50`
//! - `BALEEN_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//!
//! # Example
//!
//! ```rust,ignore
//! use baleen_runtime::config::ConfigLoader;
//!
//! // Simple loading from default locations
//! let config = ConfigLoader::new().load()?;
//!
//! // Load from a specific file with env overrides
//! let config = ConfigLoader::new()
//!     .file("./config/baleen.toml")
//!     .with_env()
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::BaleenConfig;
use super::validation::validate_config;

/// Loads and validates configuration from the default locations.
pub fn load_config() -> ConfigResult<BaleenConfig> {
    ConfigLoader::new().load()
}

/// Loads and validates configuration from a specific file.
///
/// Environment overrides still apply on top of the file contents.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<BaleenConfig> {
    ConfigLoader::new().file(path).load()
}

/// Configuration loader with figment-based multi-source support.
///
/// # Example
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("baleen.toml")
///     .with_env()
///     .load()?;
/// ```
pub struct ConfigLoader {
    /// Base figment instance.
    figment: Figment,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds the user config directory to search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("baleen"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = ConfigLoader::new()
    ///     .merge(BaleenConfig {
    ///         bot: BotSettings { token: token.into(), ..Default::default() },
    ///         ..Default::default()
    ///     })
    ///     .load()?;
    /// ```
    pub fn merge(mut self, config: BaleenConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads, validates, and returns the configuration.
    pub fn load(self) -> ConfigResult<BaleenConfig> {
        let figment = self.build_figment()?;

        let config: BaleenConfig = figment.extract()?;
        validate_config(&config)?;

        debug!(
            base_url = %config.bot.base_url,
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        // Start with defaults
        let mut figment = Figment::from(Serialized::defaults(BaleenConfig::default()));

        // Merge user's pre-configured figment
        let user_figment = std::mem::take(&mut self.figment);
        figment = figment.merge(user_figment);

        // Load config files
        if let Some(path) = self.config_file {
            // Load specific file
            if path.exists() {
                info!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_config_file(figment, &path)?;
            } else {
                return Err(ConfigError::FileNotFound(path));
            }
        } else {
            // Search for config files
            figment = self.load_config_files(figment);
        }

        // Load environment variables
        if self.load_env {
            trace!("Loading environment variables with BALEEN_ prefix");
            figment = figment.merge(Env::prefixed("BALEEN_").split("__"));
        }

        Ok(figment)
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            _ => Err(ConfigError::validation(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Resolves the effective list of search paths.
    #[cfg(feature = "toml-config")]
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("baleen"));
            }
            paths
        } else {
            self.search_paths.clone()
        }
    }

    /// Searches for and loads a configuration file from the search paths.
    ///
    /// The first `baleen.toml` or `config.toml` found wins.
    #[cfg(feature = "toml-config")]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        for search_path in self.resolve_search_paths() {
            for base_name in ["baleen.toml", "config.toml"] {
                let path = search_path.join(base_name);
                if path.exists() {
                    info!(path = %path.display(), "Loading configuration file");
                    figment = figment.merge(Toml::file(path));
                    return figment;
                }
            }
        }

        warn!("No configuration file found, using defaults");
        figment
    }

    #[cfg(not(feature = "toml-config"))]
    fn load_config_files(&self, figment: Figment) -> Figment {
        warn!("No configuration file support enabled, using defaults and environment only");
        figment
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn isolated_loader() -> ConfigLoader {
        // Point the search away from any real config file
        ConfigLoader::new().search_path(std::env::temp_dir().join("baleen-no-such-dir"))
    }

    #[test]
    fn test_defaults_fail_validation_without_token() {
        let result = isolated_loader().without_env().load();

        assert!(matches!(
            result,
            Err(ConfigError::MissingField { field }) if field == "bot.token"
        ));
    }

    #[test]
    fn test_merge_programmatic_config() {
        let mut overrides = BaleenConfig::default();
        overrides.bot.token = "42:test-token".to_string();
        overrides.polling.limit = 25;

        let config = isolated_loader()
            .without_env()
            .merge(overrides)
            .load()
            .unwrap();

        assert_eq!(config.bot.token, "42:test-token");
        assert_eq!(config.polling.limit, 25);
        assert_eq!(config.polling.timeout_secs, 30);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let result = ConfigLoader::new()
            .file("/nonexistent/baleen.toml")
            .load();

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: This test is the only one touching these variables and we
        // clean up immediately after
        unsafe {
            std::env::set_var("BALEEN_BOT__TOKEN", "42:env-token");
            std::env::set_var("BALEEN_POLLING__LIMIT", "50");
        }

        let result = isolated_loader().with_env().load();

        unsafe {
            std::env::remove_var("BALEEN_BOT__TOKEN");
            std::env::remove_var("BALEEN_POLLING__LIMIT");
        }

        let config = result.unwrap();
        assert_eq!(config.bot.token, "42:env-token");
        assert_eq!(config.polling.limit, 50);
    }
}
