use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.the-odds-api.com";
pub const DEFAULT_SPORT: &str = "soccer_epl";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OddsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_sport: String,
    pub timeout: Duration,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_sport: DEFAULT_SPORT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OddsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let api_key = non_empty("ODDS_API_KEY");
        let base_url = non_empty("ODDS_API_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let default_sport =
            non_empty("ODDS_DEFAULT_SPORT").unwrap_or_else(|| DEFAULT_SPORT.to_string());
        let timeout_secs = non_empty("ODDS_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 30);

        Self {
            api_key,
            base_url,
            default_sport,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn is_mock_mode(&self) -> bool {
        self.api_key.is_none()
    }
}
