use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::clients::SubjectQuery;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub catalog: CatalogConfig,

    pub collector: CollectorConfig,

    pub refresher: RefresherConfig,

    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// JSON document shared by all three commands.
    pub data_path: String,

    /// Where the rendered gallery is written.
    pub output_path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_path: "anime_data.json".to_string(),
            output_path: "index.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base: String,

    /// Public site used for per-subject links in the gallery.
    pub site_base: String,

    /// Sent with every request; the API rejects anonymous clients.
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.bgm.tv/v0".to_string(),
            site_base: "https://bgm.tv".to_string(),
            user_agent: "Ayasen/SentinelProject/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub tags: Vec<String>,

    /// Catalog subject type code (2 = anime).
    pub subject_type: u32,

    pub page_size: u32,

    pub page_delay_ms: u64,

    pub detail_delay_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            tags: vec!["2026年1月".to_string(), "日本".to_string()],
            subject_type: 2,
            page_size: 20,
            page_delay_ms: 300,
            detail_delay_ms: 500,
        }
    }
}

impl CollectorConfig {
    #[must_use]
    pub fn query(&self) -> SubjectQuery {
        SubjectQuery {
            subject_type: self.subject_type,
            tags: self.tags.clone(),
        }
    }

    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    #[must_use]
    pub const fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefresherConfig {
    pub delay_ms: u64,

    /// Offset of the civil time zone used for `lastUpdated` (default: UTC+8).
    pub utc_offset_hours: i32,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            delay_ms: 400,
            utc_offset_hours: 8,
        }
    }
}

impl RefresherConfig {
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Entries must air strictly after this date (compared as strings).
    pub cutoff_date: String,

    /// Entries carrying this tag are left out of the gallery.
    pub excluded_tag: String,

    pub page_title: String,

    pub stylesheet: String,

    pub max_card_tags: usize,

    pub trailer_search_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cutoff_date: "2026-01-01".to_string(),
            excluded_tag: "剧场版".to_string(),
            page_title: "2026 年 1 月 新番导视".to_string(),
            stylesheet: "style.css".to_string(),
            max_card_tags: 8,
            trailer_search_url: "https://www.youtube.com/results".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![Self::default_config_path()];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("anime-sentinel").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".anime-sentinel").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.collector.tags.is_empty() {
            anyhow::bail!("collector.tags must contain at least one tag");
        }

        if self.collector.page_size == 0 {
            anyhow::bail!("collector.page_size must be > 0");
        }

        url::Url::parse(&self.catalog.api_base)
            .with_context(|| format!("Invalid catalog.api_base: {}", self.catalog.api_base))?;

        if !(-23..=23).contains(&self.refresher.utc_offset_hours) {
            anyhow::bail!(
                "refresher.utc_offset_hours must be within ±23, got {}",
                self.refresher.utc_offset_hours
            );
        }

        Ok(())
    }

    #[must_use]
    pub fn data_path(&self) -> &Path {
        Path::new(&self.general.data_path)
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        Path::new(&self.general.output_path)
    }
}
