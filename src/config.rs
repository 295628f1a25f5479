use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const DB_PATH_ENV: &str = "BUZZER_DB_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub report: ReportConfig,
    pub monitoring: MonitoringConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Directory holding `report_<match_id>.json` timelines.
    pub matches_dir: PathBuf,
}

/// Which BuzzerBeater mirror viewer links point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkDomain {
    Com,
    Org,
}

impl LinkDomain {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Com => "https://buzzerbeater.com",
            Self::Org => "https://buzzerbeater.org",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub link_domain: LinkDomain,
    pub verbosity: u8,
    /// Comma separated column list for verbosity 0.
    pub columns: String,
    pub top_players: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then let `BUZZER_DB_PATH`
    /// (from the environment or `.env`) override the database path.
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Ok(db_path) = std::env::var(DB_PATH_ENV) {
            if !db_path.trim().is_empty() {
                config.database.path = db_path;
            }
        }

        Ok(config)
    }
}
