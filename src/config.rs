//! Configuration for yard shifts.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI)
//! 2. Environment variables (SORTING_YARD_SEED, SORTING_YARD_PACE_MS)
//! 3. Config file (.sorting-yard/config.yaml)
//! 4. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .sorting-yard/config.yaml
//! - Falls back to the user config directory (sorting-yard/config.yaml)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::ShiftLimits;
use crate::workload::WorkloadSettings;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".sorting-yard";
const CONFIG_FILE: &str = "config.yaml";

pub const ENV_SEED: &str = "SORTING_YARD_SEED";
pub const ENV_PACE_MS: &str = "SORTING_YARD_PACE_MS";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub workload: WorkloadSettings,
    #[serde(default)]
    pub driver: Option<DriverConfig>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// Delay between dispatched events, in milliseconds
    pub pace_ms: Option<u64>,
    pub max_events: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub workload: WorkloadSettings,
    pub limits: ShiftLimits,

    /// Delay between dispatched events, in milliseconds
    pub pace_ms: u64,

    /// RNG seed; entropy when absent
    pub seed: Option<u64>,

    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            workload: WorkloadSettings::default(),
            limits: ShiftLimits::default(),
            pace_ms: 0,
            seed: None,
            config_file: None,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("sorting-yard").join(CONFIG_FILE);
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a numeric environment override
fn env_number(lookup: &dyn Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>> {
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid value for {}: {}", name, raw))
        })
        .transpose()
}

/// Merge a parsed file, environment overrides and defaults
pub fn resolve_config(
    file: Option<ConfigFile>,
    config_file: Option<PathBuf>,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let mut config = ResolvedConfig {
        config_file,
        ..Default::default()
    };

    if let Some(file) = file {
        config.workload = file.workload;
        config.seed = file.seed;
        if let Some(driver) = file.driver {
            config.pace_ms = driver.pace_ms.unwrap_or(config.pace_ms);
            config.limits.max_events = driver.max_events.unwrap_or(config.limits.max_events);
        }
    }

    if let Some(seed) = env_number(lookup, ENV_SEED)? {
        config.seed = Some(seed);
    }
    if let Some(pace_ms) = env_number(lookup, ENV_PACE_MS)? {
        config.pace_ms = pace_ms;
    }

    config
        .workload
        .validate()
        .context("Invalid workload configuration")?;

    Ok(config)
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let file = config_file
        .as_deref()
        .map(load_config_file)
        .transpose()?;

    resolve_config(file, config_file, &|name| std::env::var(name).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
