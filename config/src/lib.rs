//! Configuration for GroFlow.
//!
//! Settings live in `~/.groflow/config.toml`. The file is optional and every
//! section in it is optional; anything left out falls back to the built-in
//! defaults. String values may reference environment variables as `${VAR}`.
//!
//! ```toml
//! [app]
//! high_contrast = false
//! start_view = "marketplace"
//!
//! [google]
//! api_key = "${GEMINI_API_KEY}"
//! model = "gemini-2.5-flash"
//!
//! [session]
//! starting_trust_points = 120
//! investor_liquidity = 5000
//!
//! [tracker]
//! recalibration_threshold_percent = 50
//! ```
//!
//! The file is only ever read. A key typed into the Settings screen stays in
//! memory and is never written back here.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use groflow_core::{CampaignRules, InvestmentRules, SessionSeed};
use groflow_providers::GatewayConfig;
use groflow_types::{ApiKey, Money, TrustPoints, View};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroflowConfig {
    pub app: Option<AppConfig>,
    pub google: Option<GoogleConfig>,
    pub session: Option<SessionConfig>,
    pub tracker: Option<TrackerConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use the high-contrast palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Screen shown at startup.
    pub start_view: Option<View>,
}

#[derive(Default, Deserialize)]
pub struct GoogleConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

// Manual Debug impl to prevent leaking the API key in logs.
impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("GoogleConfig")
            .field("api_key", &key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Seeds and limits for the session bookkeeping.
#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    pub starting_trust_points: Option<u64>,
    /// Whole currency units.
    pub investor_liquidity: Option<u64>,
    pub demo_campaigns: Option<bool>,
    pub vouch_points: Option<u64>,
    pub investment_threshold: Option<u64>,
    /// Whole currency units.
    pub min_investment: Option<u64>,
    /// Whole currency units.
    pub max_investment: Option<u64>,
    pub monthly_return_bps: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackerConfig {
    pub recalibration_threshold_percent: Option<u8>,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// `~/.groflow`, home of the config file and logs.
#[must_use]
pub fn groflow_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".groflow"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    groflow_dir().map(|dir| dir.join("config.toml"))
}

fn expanded(value: Option<&String>) -> Option<String> {
    value
        .map(|v| expand_env_vars(v).trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GroflowConfig {
    /// Load `~/.groflow/config.toml`, or `None` when there is no such file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                Ok(Some(config))
            }
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn high_contrast(&self) -> bool {
        self.app.as_ref().is_some_and(|app| app.high_contrast)
    }

    #[must_use]
    pub fn start_view(&self) -> View {
        self.app
            .as_ref()
            .and_then(|app| app.start_view)
            .unwrap_or_default()
    }

    /// The configured key after `${VAR}` expansion, if any is left.
    #[must_use]
    pub fn api_key(&self) -> Option<ApiKey> {
        let google = self.google.as_ref()?;
        expanded(google.api_key.as_ref()).and_then(|key| ApiKey::new(key).ok())
    }

    #[must_use]
    pub fn gateway(&self) -> GatewayConfig {
        let mut gateway = GatewayConfig::default();
        if let Some(google) = &self.google {
            if let Some(model) = expanded(google.model.as_ref()) {
                gateway.model = model;
            }
            if let Some(base_url) = expanded(google.base_url.as_ref()) {
                gateway.base_url = base_url;
            }
        }
        gateway
    }

    /// Session seed with configured overrides applied and checked.
    pub fn session_seed(&self) -> Result<SessionSeed, ConfigError> {
        let mut seed = SessionSeed::default();

        if let Some(percent) = self
            .tracker
            .as_ref()
            .and_then(|t| t.recalibration_threshold_percent)
        {
            if percent > 100 {
                return Err(ConfigError::Invalid {
                    field: "tracker.recalibration_threshold_percent",
                    reason: format!("{percent} is above 100"),
                });
            }
            seed.recalibration_threshold_percent = percent;
        }

        let Some(session) = &self.session else {
            return Ok(seed);
        };

        if let Some(points) = session.starting_trust_points {
            seed.trust_points = TrustPoints::new(points);
        }
        if let Some(units) = session.investor_liquidity {
            seed.liquidity = Money::from_units(units);
        }
        if let Some(demo) = session.demo_campaigns {
            seed.demo_campaigns = demo;
        }

        let mut campaign_rules = CampaignRules::default();
        if let Some(points) = session.vouch_points {
            if points == 0 {
                return Err(ConfigError::Invalid {
                    field: "session.vouch_points",
                    reason: "must be at least 1".to_string(),
                });
            }
            campaign_rules.vouch_points = TrustPoints::new(points);
        }
        if let Some(threshold) = session.investment_threshold {
            campaign_rules.investment_threshold = threshold;
        }
        seed.campaign_rules = campaign_rules;

        let mut investment_rules = InvestmentRules::default();
        if let Some(min) = session.min_investment {
            investment_rules.min_investment = Money::from_units(min);
        }
        if let Some(max) = session.max_investment {
            investment_rules.max_investment = Money::from_units(max);
        }
        if let Some(bps) = session.monthly_return_bps {
            investment_rules.monthly_return_bps = bps;
        }
        if investment_rules.min_investment.is_zero()
            || investment_rules.min_investment > investment_rules.max_investment
        {
            return Err(ConfigError::Invalid {
                field: "session.min_investment",
                reason: format!(
                    "range {} to {} is empty or starts at zero",
                    investment_rules.min_investment, investment_rules.max_investment
                ),
            });
        }
        seed.investment_rules = investment_rules;

        Ok(seed)
    }
}
