use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV_PREFIX: &str = "NEWSSTAND";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub subscriptions: SubscriptionsConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    #[serde(default)]
    pub catalog_file: Option<PathBuf>,
    #[serde(default)]
    pub catalog_url: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            catalog_file: None,
            catalog_url: String::new(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("newsstand-grid/{}", crate::VERSION)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    /// Empty the cells past the end of a short page instead of leaving the
    /// previous page's logos in place.
    #[serde(default = "default_clear_stale_cells")]
    pub clear_stale_cells: bool,
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            clear_stale_cells: default_clear_stale_cells(),
            shuffle_seed: None,
        }
    }
}

fn default_clear_stale_cells() -> bool {
    true
}

/// Media names subscribed at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SubscriptionsConfig {
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_tick_rate", with = "humantime_serde")]
    pub tick_rate: Duration,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
        }
    }
}

fn default_tick_rate() -> Duration {
    Duration::from_millis(120)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("newsstand-grid").join("newsstand-grid.log"))
}

fn default_log_filter() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        ensure!(
            path.exists(),
            "Config file {} does not exist",
            path.display()
        );
        let from_file = read_config_file(path)?;
        cfg = merge_config(cfg, from_file);
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, prefix);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if other.source.catalog_file.is_some() {
        base.source.catalog_file = other.source.catalog_file;
    }
    if !other.source.catalog_url.is_empty() {
        base.source.catalog_url = other.source.catalog_url;
    }
    base.source.timeout = other.source.timeout;
    if !other.source.user_agent.is_empty() {
        base.source.user_agent = other.source.user_agent;
    }

    base.grid.clear_stale_cells = other.grid.clear_stale_cells;
    if other.grid.shuffle_seed.is_some() {
        base.grid.shuffle_seed = other.grid.shuffle_seed;
    }

    if !other.subscriptions.names.is_empty() {
        base.subscriptions.names = other.subscriptions.names;
    }

    base.ui.tick_rate = other.ui.tick_rate;

    if other.log.file.is_some() {
        base.log.file = other.log.file;
    }
    if !other.log.filter.is_empty() {
        base.log.filter = other.log.filter;
    }

    base
}

fn apply_env(cfg: &mut Config, prefix: &str) {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    for (key, value) in map {
        apply_env_value(cfg, &key, value);
    }
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "source.catalog_file" => cfg.source.catalog_file = Some(PathBuf::from(value)),
        "source.catalog_url" => cfg.source.catalog_url = value,
        "source.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.source.timeout = duration;
            }
        }
        "source.user_agent" => cfg.source.user_agent = value,
        "grid.clear_stale_cells" => {
            cfg.grid.clear_stale_cells = matches!(value.as_str(), "1" | "true" | "TRUE" | "True");
        }
        "grid.shuffle_seed" => {
            if let Ok(parsed) = value.parse::<u64>() {
                cfg.grid.shuffle_seed = Some(parsed);
            }
        }
        "subscriptions.names" => {
            cfg.subscriptions.names = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "ui.tick_rate" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.ui.tick_rate = duration;
            }
        }
        "log.file" => cfg.log.file = Some(PathBuf::from(value)),
        "log.filter" => cfg.log.filter = value,
        _ => {}
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("newsstand-grid").join("config.yaml"))
}
