mod commands;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use wrmc::api::hooks::NoopLoading;
use wrmc::api::types::LicenseFilter;
use wrmc::api::{ApiClient, ApiHooks, CachedApiClient, Notifier, SessionStore, Severity};
use wrmc::cache::{CacheEntry, CacheLayer, SystemClock};
use wrmc::config::Config;
use wrmc::services::{AuthService, ConstructionService, LicenseService};
use wrmc::store::{MemoryStore, SharedStore, SqliteStore};

/// Password for `login`, read from the environment only.
const PASSWORD_ENV: &str = "WRMC_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "wrmc")]
#[command(about = "Cached client for the water-resource monitoring backend")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/wrmc/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Echo debug logs to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Log in and store the session token
  Login {
    /// Account name; the password is read from WRMC_PASSWORD
    user: String,
    #[arg(long)]
    remember: bool,
  },
  /// Log out and forget the session token
  Logout,
  /// Show the identity in the stored token
  Whoami,
  /// GET any endpoint, bypassing the cache
  Get {
    endpoint: String,
    /// Query parameter, repeatable
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
  },
  /// Read reference data through the cache
  Cached {
    /// Dataset name (see `datasets`) or endpoint path
    key: String,
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
    /// Ignore a fresh cache entry and refetch
    #[arg(long)]
    refresh: bool,
  },
  /// List dataset names accepted by `cached`
  Datasets,
  /// Warm the cache with all standard reference data
  Preload,
  /// Manage the local cache
  #[command(subcommand)]
  Cache(CacheCommand),
  /// List licences
  Licenses {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    size: u32,
  },
  /// List constructions
  Constructions,
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
  /// Drop one entry
  Invalidate {
    key: String,
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
  },
  /// Drop every entry
  Clear,
  /// Show cached keys with their age
  List,
}

/// Prints notifications to stderr so stdout stays machine-readable.
struct StderrNotifier;

impl Notifier for StderrNotifier {
  fn notify(&self, message: &str, severity: Severity) {
    eprintln!("[{}] {}", severity.as_str(), message);
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = wrmc::logging::init(args.verbose)?;

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  debug!(base_url = %config.api.base_url, "Loaded configuration");

  let store = open_store(&config)?;
  let hooks = ApiHooks::new(Arc::new(NoopLoading), Arc::new(StderrNotifier));
  let api = ApiClient::from_config(&config, SessionStore::new(store.clone()), hooks)?;
  let cache = CacheLayer::open(store, config.cache_ttl(), Arc::new(SystemClock));
  let cached = CachedApiClient::new(api.clone(), cache);

  run(args.command, &api, &cached).await
}

fn open_store(config: &Config) -> Result<SharedStore> {
  match config.store_path() {
    Some(path) => Ok(Arc::new(SqliteStore::open_at(&path?)?)),
    None => Ok(Arc::new(MemoryStore::new())),
  }
}

async fn run(command: Command, api: &ApiClient, cached: &CachedApiClient) -> Result<()> {
  match command {
    Command::Login { user, remember } => {
      let password = std::env::var(PASSWORD_ENV)
        .map_err(|_| eyre!("Password not found. Set {} environment variable.", PASSWORD_ENV))?;
      let response = AuthService::new(api.clone())
        .login(&user, &password, remember)
        .await?;
      if !response.success {
        return Err(eyre!("Login rejected"));
      }
    }
    Command::Logout => AuthService::new(api.clone()).logout().await?,
    Command::Whoami => match AuthService::new(api.clone()).current_user() {
      Some(user) => print_json(&user)?,
      None => return Err(eyre!("Not logged in")),
    },
    Command::Get { endpoint, params } => {
      let params = parse_params(&params)?;
      let value = api.get_data(&endpoint, params.as_ref(), true).await?;
      print_json(&value)?;
    }
    Command::Cached {
      key,
      params,
      refresh,
    } => {
      let key = commands::resolve(&key)?;
      let params = parse_params(&params)?;
      let value = cached.get_cached(key, params.as_ref(), refresh).await?;
      print_json(&value)?;
    }
    Command::Datasets => {
      for ds in commands::DATASETS {
        println!("{:<20} {:<45} {}", ds.name, ds.key.endpoint(), ds.description);
      }
    }
    Command::Preload => {
      let summary = cached.preload_master_data().await;
      println!("loaded {}, failed {}", summary.loaded, summary.failed);
    }
    Command::Cache(CacheCommand::Invalidate { key, params }) => {
      let key = commands::resolve(&key)?;
      let params = parse_params(&params)?;
      cached.invalidate_cache(key, params.as_ref());
    }
    Command::Cache(CacheCommand::Clear) => cached.clear_all_cache(),
    Command::Cache(CacheCommand::List) => {
      let cache = cached.cache();
      let now = Utc::now();
      for key in cache.keys() {
        if let Some(entry) = cache.peek(&key) {
          println!("{}", describe_entry(&key, &entry, now));
        }
      }
    }
    Command::Licenses { page, size } => {
      let filter = LicenseFilter {
        page_number: Some(page),
        page_size: Some(size),
        ..Default::default()
      };
      let licenses = LicenseService::new(api.clone()).list(&filter).await?;
      print_json(&licenses)?;
    }
    Command::Constructions => {
      let constructions = ConstructionService::new(api.clone())
        .list(&Default::default())
        .await?;
      print_json(&constructions)?;
    }
  }
  Ok(())
}

/// Turn `KEY=VALUE` pairs into a JSON object. Values that parse as JSON
/// (numbers, booleans) keep their type; everything else is a string.
fn parse_params(raw: &[String]) -> Result<Option<Value>> {
  if raw.is_empty() {
    return Ok(None);
  }

  let mut params = Map::new();
  for pair in raw {
    let (key, value) = pair
      .split_once('=')
      .ok_or_else(|| eyre!("Invalid parameter '{}', expected KEY=VALUE", pair))?;
    let value = match serde_json::from_str::<Value>(value) {
      Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
      _ => Value::String(value.to_string()),
    };
    params.insert(key.to_string(), value);
  }
  Ok(Some(Value::Object(params)))
}

/// One `cache list` line: key, age in whole minutes and store time.
fn describe_entry(key: &str, entry: &CacheEntry, now: DateTime<Utc>) -> String {
  let age = (now - entry.stored_at).num_minutes();
  format!(
    "{}\t{}m\t{}",
    key,
    age,
    entry.stored_at.format("%Y-%m-%dT%H:%M:%SZ")
  )
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  let text =
    serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to format output: {}", e))?;
  println!("{}", text);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_parse_params() {
    assert!(parse_params(&[]).unwrap().is_none());

    let params = parse_params(&[
      "huyenId=3".to_string(),
      "active=true".to_string(),
      "name=Sông Đà".to_string(),
    ])
    .unwrap();
    assert_eq!(
      params,
      Some(json!({ "huyenId": 3, "active": true, "name": "Sông Đà" }))
    );
  }

  #[test]
  fn test_describe_entry_shows_age() {
    let stored_at = DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    let entry = CacheEntry {
      payload: json!([]),
      stored_at,
    };
    let now = stored_at + chrono::Duration::minutes(90);

    assert_eq!(
      describe_entry("Song/danh-sach", &entry, now),
      "Song/danh-sach\t90m\t2024-05-01T08:00:00Z"
    );
  }

  #[test]
  fn test_parse_params_rejects_bare_words() {
    assert!(parse_params(&["huyenId".to_string()]).is_err());
  }

  #[test]
  fn test_args_parse() {
    let args = Args::parse_from(["wrmc", "cached", "communes", "-p", "huyenId=2", "--refresh"]);
    match args.command {
      Command::Cached {
        key,
        params,
        refresh,
      } => {
        assert_eq!(key, "communes");
        assert_eq!(params, vec!["huyenId=2".to_string()]);
        assert!(refresh);
      }
      other => panic!("unexpected command {:?}", other),
    }
  }
}
