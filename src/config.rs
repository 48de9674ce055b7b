use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub os: OsConfig,
    pub gpu: GpuConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub interval_ms: u64,
    pub style: String,
    pub clear_screen: bool,
    pub theme: String,
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            interval_ms: 500,
            style: "ansi".to_string(),
            clear_screen: true,
            theme: "dark".to_string(),
            log_file: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OsConfig {
    pub on_failure: String,
    pub retries: u32,
}

impl Default for OsConfig {
    fn default() -> Self {
        OsConfig {
            on_failure: "substitute".to_string(),
            retries: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GpuConfig {
    pub backend: String,
    pub smi_command: String,
    pub init_failure: String,
    pub on_failure: String,
    pub retries: u32,
    pub malformed_output: String,
}

impl Default for GpuConfig {
    fn default() -> Self {
        GpuConfig {
            backend: "auto".to_string(),
            smi_command: "nvidia-smi".to_string(),
            init_failure: "fatal".to_string(),
            on_failure: "substitute".to_string(),
            retries: 0,
            malformed_output: "fatal".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub pause: String,
    pub refresh: String,
    pub theme: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            pause: "p".to_string(),
            refresh: "r".to_string(),
            theme: "t".to_string(),
            help: "?".to_string(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hwdelta").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

/// Parses a keybind name from the config file.
pub fn parse_key(s: &str) -> Option<KeyCode> {
    match s {
        "Enter" => Some(KeyCode::Enter),
        "Esc" | "Escape" => Some(KeyCode::Esc),
        "Tab" => Some(KeyCode::Tab),
        "Space" => Some(KeyCode::Char(' ')),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}
