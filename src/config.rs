//! Runtime settings.
//!
//! Precedence (highest wins):
//! 1) Command line flags, see [`Settings::apply_cli`]
//! 2) Environment variables (prefix `DISCOTECA__`, `__` as nested separator)
//! 3) Config file (`DISCOTECA_CONFIG_PATH` or `$XDG_CONFIG_HOME/discoteca/config.toml`)
//! 4) Struct defaults

use std::{
    env,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// Cover shown for records saved without one.
pub const DEFAULT_COVER_URL: &str =
    "https://images.unsplash.com/photo-1511379938547-c1f69419868d?w=300&h=300&fit=crop&q=80";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Backend root, e.g. `http://localhost:3001`.
    pub base_url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub default_cover_url: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            default_cover_url: DEFAULT_COVER_URL.to_string(),
        }
    }
}

impl Settings {
    /// Settings from the catalog's config file and `DISCOTECA__*` variables.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        Self::load_from(resolve_config_path().as_deref())
    }

    /// The TOML file is layered first, so any `DISCOTECA__API__BASE_URL`
    /// style variable overrides the same key from the file. A missing file
    /// just leaves the defaults in place.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("DISCOTECA")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Flags given on the command line win over everything loaded.
    pub fn apply_cli(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url {
            self.api.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api.base_url.trim().is_empty() {
            return Err("api.base_url must not be empty".to_string());
        }
        if self.api.timeout_secs == 0 {
            return Err("api.timeout_secs must be >= 1".to_string());
        }
        Ok(())
    }
}

/// `DISCOTECA_CONFIG_PATH` when set, else the per-user catalog config.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("DISCOTECA_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/discoteca/config.toml`, or under `~/.config` when XDG
/// is unset. `None` without a home directory.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("discoteca").join("config.toml"))
}
