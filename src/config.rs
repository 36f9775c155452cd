use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const SUBJECTS: &[&str] = &["Grammar"];
pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_grade")]
    pub default_grade: i32,
    #[serde(default = "default_subject")]
    pub default_subject: String,
    #[serde(default = "default_questions_per_section")]
    pub questions_per_section: u32,
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
    /// Optional JSON file replacing the bundled grade/topic catalog.
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_grade() -> i32 {
    2
}
fn default_subject() -> String {
    "Grammar".to_string()
}
fn default_questions_per_section() -> u32 {
    6
}
fn default_download_dir() -> String {
    dirs::download_dir()
        .or_else(|| dirs::data_dir().map(|d| d.join("quillsheet").join("downloads")))
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
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            theme: default_theme(),
            default_grade: default_grade(),
            default_subject: default_subject(),
            questions_per_section: default_questions_per_section(),
            download_dir: default_download_dir(),
            catalog_path: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quillsheet")
            .join("config.toml")
    }

    /// Clamp numeric fields and reset unusable strings to their defaults.
    /// Call after deserialization and after applying CLI overrides.
    pub fn validate(&mut self) {
        self.questions_per_section = self
            .questions_per_section
            .clamp(MIN_QUESTIONS, MAX_QUESTIONS);
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 300);
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = default_api_base_url();
        }
        if !SUBJECTS.contains(&self.default_subject.as_str()) {
            self.default_subject = default_subject();
        }
        if self.download_dir.trim().is_empty() {
            self.download_dir = default_download_dir();
        }
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn download_path(&self) -> PathBuf {
        PathBuf::from(&self.download_dir)
    }

    pub fn catalog_file(&self) -> Option<PathBuf> {
        self.catalog_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }
}
