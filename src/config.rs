use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BLACK_BINARY: &str = "black";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub black: BlackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlackConfig {
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Passed to black as `--config`; omitted from the command line when unset.
    #[serde(default)]
    pub config: Option<PathBuf>,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Default for BlackConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            config: None,
            flags: Vec::new(),
        }
    }
}

fn default_binary() -> String {
    DEFAULT_BLACK_BINARY.to_string()
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if let Some(rest) = s.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    } else if s == "~" {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home);
        }
    }
    path.to_path_buf()
}

pub fn default_config_path() -> Result<PathBuf> {
    let proj = directories::ProjectDirs::from("", "", "pyfmt-gate")
        .context("could not determine config directory")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Loads the config at `explicit` if given (it must exist), otherwise the
/// default location, falling back to built-in defaults when that is absent.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(PathBuf, Config)> {
    if let Some(path) = explicit {
        let path = expand_tilde(path);
        if !path.exists() {
            bail!("config not found at {}", path.display());
        }
        let config = load_config(&path)?;
        return Ok((path, config));
    }

    let path = default_config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok((path, Config::default()));
    }
    let config = load_config(&path)?;
    Ok((path, config))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config at {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(contents).context("failed to parse config TOML")?;

    if config.black.binary.trim().is_empty() {
        bail!("black.binary must not be empty");
    }
    if config.black.flags.iter().any(|f| f == "-" || f == "-q") {
        bail!("black.flags must not contain `-` or `-q`; they are added per invocation");
    }

    config.black.config = config.black.config.as_deref().map(expand_tilde);

    Ok(config)
}
