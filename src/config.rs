//! Global configuration management
//! This module handles the loading and parsing of configuration files
//! and environment variables for the converter.
//! Sources, later ones winning:
//! 1. the built-in `Config.toml`
//! 2. a `Config.toml` next to the executable
//! 3. `NOTEDOWN__*` environment variables, e.g. `NOTEDOWN__EXTRACT_IMAGES=false`

use config::{Config, ConfigError, Environment, File, FileFormat};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{env, fs};

const DEFAULTS: &str = include_str!("../Config.toml");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Write embedded base64 images to files instead of a placeholder.
    pub extract_images: bool,
    /// Image directory, relative to the Markdown output.
    pub image_dir: String,
    pub pandoc_path: String,
    pub pandoc_format: String,
    /// Class substrings that mark a notebook cell.
    pub cell_markers: Vec<String>,
    /// Single-line code longer than this is fenced.
    pub inline_code_max_len: usize,
    pub max_nesting_depth: usize,
    /// Prefix the custom output with title, export time and a rule.
    pub export_banner: bool,
}

pub static SETTINGS: Lazy<Settings> = Lazy::new(|| {
    Settings::new().unwrap_or_else(|e| {
        tracing::warn!("failed to load configuration, using defaults: {e}");
        Settings::default()
    })
});

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // 1. built-in default config
        let mut builder = Config::builder().add_source(File::from_str(DEFAULTS, FileFormat::Toml));

        // 2. try to load external config file
        if let Ok(exe_path) = env::current_exe() {
            if let Some(dir) = exe_path.parent() {
                let external = dir.join("Config.toml");
                if fs::metadata(&external).is_ok() {
                    builder = builder.add_source(File::from(external).required(false));
                }
            }
        }

        // 3. load environment variables
        builder = builder.add_source(
            Environment::with_prefix("NOTEDOWN")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Built-in defaults only, ignoring the environment.
    pub fn builtin() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(DEFAULTS, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extract_images: true,
            image_dir: "images".to_string(),
            pandoc_path: "pandoc".to_string(),
            pandoc_format: "markdown".to_string(),
            cell_markers: vec!["jp-Cell".to_string(), "cell".to_string(), "output".to_string()],
            inline_code_max_len: 50,
            max_nesting_depth: 512,
            export_banner: false,
        }
    }
}
