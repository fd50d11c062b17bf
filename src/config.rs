use chrono::FixedOffset;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::wire::DateShift;
use crate::cache::CacheLayer;

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "WRMC_BASE_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub wire: WireConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Backend root, e.g. "https://host/api"
  pub base_url: String,
  /// Per-request timeout; unset means no timeout
  pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// When false, nothing is persisted between runs
  #[serde(default = "default_true")]
  pub enabled: bool,
  #[serde(default = "default_ttl_hours")]
  pub ttl_hours: i64,
  /// Store location; defaults to the user data directory
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      ttl_hours: default_ttl_hours(),
      path: None,
    }
  }
}

fn default_true() -> bool {
  true
}

fn default_ttl_hours() -> i64 {
  CacheLayer::DEFAULT_TTL_HOURS
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireConfig {
  /// Shift outgoing dates by this many minutes instead of the host offset
  pub local_offset_minutes: Option<i32>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./wrmc.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/wrmc/config.yaml
  ///
  /// `WRMC_BASE_URL` overrides `api.base_url`. With no file at all the
  /// variable alone is enough.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let env_base_url = std::env::var(BASE_URL_ENV).ok().filter(|v| !v.is_empty());

    let mut config = match (path, env_base_url.as_deref()) {
      (Some(p), _) => Self::load_from_path(&p)?,
      (None, Some(base_url)) => Self::with_base_url(base_url),
      (None, None) => {
        return Err(eyre!(
          "No configuration file found. Create one at ~/.config/wrmc/config.yaml\n\
                 or set {}.",
          BASE_URL_ENV
        ))
      }
    };

    if let Some(base_url) = env_base_url {
      config.api.base_url = base_url;
    }

    Ok(config)
  }

  /// Defaults for everything but the backend address.
  pub fn with_base_url(base_url: &str) -> Self {
    Self {
      api: ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: None,
      },
      cache: CacheConfig::default(),
      wire: WireConfig::default(),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("wrmc.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("wrmc").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;
    if config.cache.ttl_hours <= 0 {
      return Err(eyre!("cache.ttl_hours must be positive"));
    }
    Ok(config)
  }

  /// How outgoing dates are shifted before labelling.
  pub fn date_shift(&self) -> DateShift {
    self
      .wire
      .local_offset_minutes
      .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
      .map(DateShift::fixed)
      .unwrap_or_else(DateShift::local)
  }

  pub fn cache_ttl(&self) -> chrono::Duration {
    chrono::Duration::hours(self.cache.ttl_hours)
  }

  /// Path of the durable store, if caching is enabled.
  pub fn store_path(&self) -> Option<Result<PathBuf>> {
    if !self.cache.enabled {
      return None;
    }
    Some(match &self.cache.path {
      Some(path) => Ok(path.clone()),
      None => crate::store::SqliteStore::default_path(),
    })
  }
}
