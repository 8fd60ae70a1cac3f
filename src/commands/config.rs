use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Config;

#[derive(Debug, Serialize)]
pub struct ConfigResult {
    pub path: PathBuf,
    pub loaded: bool,
    pub config: Config,
}

pub fn cmd_config(path: &Path, config: Config) -> ConfigResult {
    ConfigResult {
        path: path.to_path_buf(),
        loaded: path.exists(),
        config,
    }
}

pub fn format_config_human(result: &ConfigResult) -> String {
    let mut lines = Vec::new();
    if result.loaded {
        lines.push(format!("config: {}", result.path.display()));
    } else {
        lines.push(format!("config: {} (not found, using defaults)", result.path.display()));
    }
    lines.push(format!("black.binary = {}", result.config.black.binary));
    lines.push(format!(
        "black.config = {}",
        result
            .config
            .black
            .config
            .as_ref()
            .map_or("(none)".to_string(), |p| p.display().to_string())
    ));
    if !result.config.black.flags.is_empty() {
        lines.push(format!("black.flags = {}", result.config.black.flags.join(" ")));
    }
    lines.join("\n")
}
