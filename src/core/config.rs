use crate::core::watchlist::Watchlist;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

const MIN_REFRESH_SECS: u64 = 5;
const MAX_REFRESH_SECS: u64 = 60;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default = "default_eastmoney")]
    pub eastmoney: ProviderConfig,
    #[serde(default = "default_tencent")]
    pub tencent: ProviderConfig,
}

fn default_eastmoney() -> ProviderConfig {
    ProviderConfig {
        base_url: "http://fundf10.eastmoney.com".to_string(),
    }
}

fn default_tencent() -> ProviderConfig {
    ProviderConfig {
        base_url: "http://qt.gtimg.cn".to_string(),
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            eastmoney: default_eastmoney(),
            tencent: default_tencent(),
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    15
}

fn default_fund_delay_ms() -> u64 {
    300
}

fn default_holdings_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Monitored fund ids, in display order.
    #[serde(default)]
    pub funds: Watchlist,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Pause after each disclosure fetch.
    #[serde(default = "default_fund_delay_ms")]
    pub fund_delay_ms: u64,
    /// How long an extracted fund record is reused before its disclosure is fetched again.
    #[serde(default = "default_holdings_ttl_secs")]
    pub holdings_ttl_secs: u64,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            funds: Watchlist::default(),
            providers: ProvidersConfig::default(),
            refresh_interval_secs: default_refresh_interval_secs(),
            fund_delay_ms: default_fund_delay_ms(),
            holdings_ttl_secs: default_holdings_ttl_secs(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fundest", "fundest")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Resolves an optional user-supplied config path against the default location.
    pub fn resolve_path(config_path: Option<&str>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_config_path(),
        }
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "fundest", "fundest")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn refresh_interval(&self) -> Duration {
        Self::clamp_interval(self.refresh_interval_secs)
    }

    /// Keeps a refresh interval within the supported 5 to 60 second window.
    pub fn clamp_interval(secs: u64) -> Duration {
        Duration::from_secs(secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS))
    }

    pub fn fund_delay(&self) -> Duration {
        Duration::from_millis(self.fund_delay_ms)
    }

    pub fn holdings_ttl(&self) -> Duration {
        Duration::from_secs(self.holdings_ttl_secs)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn save_to_path<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let config_str = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path.as_ref(), config_str).with_context(|| {
            format!("Failed to write config file: {}", path.as_ref().display())
        })?;
        debug!("Saved config to {}", path.as_ref().display());
        Ok(())
    }
}
