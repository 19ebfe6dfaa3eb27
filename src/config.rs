use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::mastery::DEFAULT_REPETITIONS;

pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "es"];
pub const MAX_REPETITIONS: u32 = 50;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Path or http(s) URL of the question CSV.
    #[serde(default = "default_questions")]
    pub questions: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_initial_repetitions")]
    pub initial_repetitions: u32,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_questions() -> String {
    "questions.csv".to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_initial_repetitions() -> u32 {
    DEFAULT_REPETITIONS
}
fn default_export_dir() -> String {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions: default_questions(),
            theme: default_theme(),
            language: default_language(),
            initial_repetitions: default_initial_repetitions(),
            export_dir: default_export_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repaso")
            .join("config.toml")
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.export_dir)
    }

    /// Clamp and reset values a hand-edited file may have broken.
    pub fn normalize(&mut self) {
        self.initial_repetitions = self.initial_repetitions.clamp(1, MAX_REPETITIONS);
        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            self.language = default_language();
        }
        if self.questions.trim().is_empty() {
            self.questions = default_questions();
        }
    }
}
