use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::OddsConfig;
use crate::error::OddsError;
use crate::http_client::http_client;

const REGIONS: &str = "eu";
const MARKETS: &str = "h2h";
const ODDS_FORMAT: &str = "decimal";

// Every field is optional: the formatter substitutes defaults rather than
// rejecting a game for a missing name or price.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OddsEvent {
    pub id: Option<String>,
    pub sport_key: Option<String>,
    pub sport_title: Option<String>,
    pub commence_time: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub bookmakers: Option<Vec<OddsBookmaker>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OddsBookmaker {
    pub key: Option<String>,
    pub markets: Option<Vec<OddsMarket>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OddsMarket {
    pub key: Option<String>,
    pub outcomes: Option<Vec<OddsOutcome>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OddsOutcome {
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl OddsEvent {
    /// Outcomes of the first bookmaker's first market, or `None` when the
    /// game has no bookmaker at all.
    pub fn headline_outcomes(&self) -> Option<&[OddsOutcome]> {
        let bookmaker = self.bookmakers.as_deref()?.first()?;
        let outcomes = bookmaker
            .markets
            .as_deref()
            .and_then(|markets| markets.first())
            .and_then(|market| market.outcomes.as_deref())
            .unwrap_or_default();
        Some(outcomes)
    }
}

pub fn parse_odds_events_json(raw: &str) -> Result<Vec<OddsEvent>> {
    let parsed: Option<Vec<OddsEvent>> =
        serde_json::from_str(raw).context("invalid odds json")?;
    Ok(parsed.unwrap_or_default())
}

/// Anything that can produce raw odds events for a sport key.
pub trait OddsSource {
    fn fetch_odds(&self, sport: &str) -> Result<Vec<OddsEvent>, OddsError>;
}

/// The Odds API v4 over a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct TheOddsApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TheOddsApi {
    pub fn new(client: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// `None` when the config carries no API key (mock mode).
    pub fn from_config(cfg: &OddsConfig) -> Result<Option<Self>> {
        let Some(api_key) = cfg.api_key.as_ref() else {
            return Ok(None);
        };
        let client = http_client(cfg.timeout)?;
        Ok(Some(Self::new(client, api_key.clone(), cfg.base_url.clone())))
    }

    pub fn odds_url(&self, sport: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid odds base url {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("odds base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["v4", "sports", sport, "odds", ""]);
        Ok(url)
    }
}

impl OddsSource for TheOddsApi {
    fn fetch_odds(&self, sport: &str) -> Result<Vec<OddsEvent>, OddsError> {
        let url = self.odds_url(sport)?;
        debug!(%url, "requesting odds");

        // reqwest errors embed the request url, which would leak the api key.
        let resp = self
            .client
            .get(url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", REGIONS),
                ("markets", MARKETS),
                ("oddsFormat", ODDS_FORMAT),
            ])
            .send()
            .map_err(reqwest::Error::without_url)
            .context("odds request failed")?;

        let status = resp.status();
        log_quota(resp.headers());
        if !status.is_success() {
            warn!(sport, status = status.as_u16(), "odds api returned an error status");
            return Err(OddsError::upstream_status(status));
        }

        let body = resp
            .text()
            .map_err(reqwest::Error::without_url)
            .context("failed reading odds body")?;
        let events = parse_odds_events_json(&body)?;
        info!(sport, events = events.len(), "odds fetched");
        Ok(events)
    }
}

fn log_quota(headers: &HeaderMap) {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
    };
    let remaining = read("x-requests-remaining");
    let used = read("x-requests-used");
    if remaining.is_some() || used.is_some() {
        debug!(?remaining, ?used, "odds api quota");
    }
}

#[cfg(test)]
mod tests {
    use reqwest::blocking::Client;

    use super::{TheOddsApi, parse_odds_events_json};

    #[test]
    fn odds_url_appends_sport_path() {
        let api = TheOddsApi::new(Client::new(), "k", "https://api.the-odds-api.com");
        let url = api.odds_url("soccer_epl").expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.the-odds-api.com/v4/sports/soccer_epl/odds/"
        );
    }

    #[test]
    fn odds_url_escapes_sport_segment() {
        let api = TheOddsApi::new(Client::new(), "k", "http://localhost:9000/proxy");
        let url = api.odds_url("soccer/../admin").expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/proxy/v4/sports/soccer%2F..%2Fadmin/odds/"
        );
    }

    #[test]
    fn parses_sparse_events() {
        let raw = r#"[{"id":"a","bookmakers":[{"markets":[]}]},{"home_team":null}]"#;
        let events = parse_odds_events_json(raw).expect("valid json");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].headline_outcomes().map(<[_]>::len), Some(0));
        assert!(events[1].headline_outcomes().is_none());
    }

    #[test]
    fn null_payload_is_empty() {
        assert!(parse_odds_events_json("null").expect("null parses").is_empty());
    }

    #[test]
    fn object_payload_is_rejected() {
        assert!(parse_odds_events_json(r#"{"message":"quota"}"#).is_err());
    }
}
