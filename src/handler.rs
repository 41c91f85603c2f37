use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, warn};

use crate::config::{DEFAULT_SPORT, OddsConfig};
use crate::error::OddsError;
use crate::format::format_matches;
use crate::mock::mock_envelope;
use crate::models::{Envelope, ErrorBody};
use crate::odds_fetch::{OddsSource, TheOddsApi};

const SERIALIZE_FAILED_BODY: &str = r#"{"error":"failed to serialize response"}"#;

/// Invocation event in the API-gateway proxy shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    // An absent method is a GET; an explicit null is kept as an empty
    // method and rejected like any other unsupported verb.
    #[serde(default = "default_method", deserialize_with = "method_or_empty")]
    pub http_method: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl Default for HandlerRequest {
    fn default() -> Self {
        Self::new("GET")
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn method_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl HandlerRequest {
    pub fn new(method: &str) -> Self {
        Self {
            http_method: method.to_string(),
            query_string_parameters: None,
        }
    }

    pub fn get(sport: Option<&str>) -> Self {
        let mut req = Self::new("GET");
        if let Some(sport) = sport {
            req.query_string_parameters =
                Some(HashMap::from([("sport".to_string(), sport.to_string())]));
        }
        req
    }

    /// Method exactly as sent; HTTP methods are case-sensitive.
    pub fn method(&self) -> &str {
        &self.http_method
    }

    /// Query value, with blank values treated as absent.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()?
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl HandlerResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct OddsHandler<S = TheOddsApi> {
    source: Option<S>,
    default_sport: String,
}

impl OddsHandler<TheOddsApi> {
    /// Live handler when the config carries an API key, mock-only otherwise.
    pub fn from_config(cfg: &OddsConfig) -> Result<Self> {
        let source = TheOddsApi::from_config(cfg)?;
        Ok(Self::new(source, cfg.default_sport.clone()))
    }
}

impl<S: OddsSource> OddsHandler<S> {
    pub fn new(source: Option<S>, default_sport: impl Into<String>) -> Self {
        let default_sport = default_sport.into();
        Self {
            source,
            default_sport: if default_sport.trim().is_empty() {
                DEFAULT_SPORT.to_string()
            } else {
                default_sport
            },
        }
    }

    pub fn is_mock_mode(&self) -> bool {
        self.source.is_none()
    }

    pub fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        self.handle_at(req, Utc::now())
    }

    /// Same as [`handle`](Self::handle) with an explicit clock for kickoff
    /// labels and envelope timestamps.
    pub fn handle_at(&self, req: &HandlerRequest, now: DateTime<Utc>) -> HandlerResponse {
        match req.method() {
            "OPTIONS" => return preflight_response(),
            "GET" => {}
            other => {
                warn!(method = other, "rejected method");
                return error_response(&OddsError::MethodNotAllowed, now);
            }
        }

        let Some(source) = self.source.as_ref() else {
            info!("no odds api key configured, serving mock board");
            return json_response(200, &mock_envelope(now));
        };

        let sport = req.query("sport").unwrap_or(self.default_sport.as_str());
        match source.fetch_odds(sport) {
            Ok(events) => {
                let envelope = Envelope::live(format_matches(&events, now), now);
                info!(
                    sport,
                    upstream = events.len(),
                    matches = envelope.count,
                    "odds board built"
                );
                json_response(200, &envelope)
            }
            Err(err) => {
                warn!(sport, status = err.status_code(), error = %err, "odds fetch failed, serving fallback");
                error_response(&err, now)
            }
        }
    }
}

fn cors_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Access-Control-Allow-Origin".to_string(), "*".to_string())])
}

fn preflight_response() -> HandlerResponse {
    let mut headers = cors_headers();
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        "GET, OPTIONS".to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        "Content-Type".to_string(),
    );
    headers.insert("Access-Control-Max-Age".to_string(), "86400".to_string());
    HandlerResponse {
        status_code: 200,
        headers,
        body: String::new(),
        is_base64_encoded: false,
    }
}

fn error_response(err: &OddsError, now: DateTime<Utc>) -> HandlerResponse {
    let body = ErrorBody {
        error: err.to_string(),
        fallback: err.wants_fallback().then(|| mock_envelope(now)),
    };
    json_response(err.status_code(), &body)
}

fn json_response<T: Serialize>(status_code: u16, body: &T) -> HandlerResponse {
    let mut headers = cors_headers();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    let (status_code, body) = match serde_json::to_string(body) {
        Ok(json) => (status_code, json),
        Err(err) => {
            error!(error = %err, "failed to serialize response body");
            (500, SERIALIZE_FAILED_BODY.to_string())
        }
    };
    HandlerResponse {
        status_code,
        headers,
        body,
        is_base64_encoded: false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::HandlerRequest;

    #[test]
    fn missing_method_defaults_to_get() {
        let req: HandlerRequest = serde_json::from_str("{}").expect("empty event");
        assert_eq!(req.method(), "GET");
    }

    #[test]
    fn method_is_compared_verbatim() {
        assert_eq!(HandlerRequest::new(" options ").method(), " options ");
        assert_eq!(HandlerRequest::new("get").method(), "get");
    }

    #[test]
    fn null_method_is_not_a_get() {
        let req: HandlerRequest =
            serde_json::from_str(r#"{"httpMethod":null}"#).expect("event");
        assert_eq!(req.method(), "");
    }

    #[test]
    fn null_query_parameters_are_accepted() {
        let req: HandlerRequest =
            serde_json::from_str(r#"{"httpMethod":"GET","queryStringParameters":null}"#)
                .expect("event");
        assert_eq!(req.query("sport"), None);
    }

    #[test]
    fn blank_query_value_is_absent() {
        let req = HandlerRequest {
            http_method: "GET".to_string(),
            query_string_parameters: Some(HashMap::from([(
                "sport".to_string(),
                "  ".to_string(),
            )])),
        };
        assert_eq!(req.query("sport"), None);
        assert_eq!(
            HandlerRequest::get(Some("tennis_atp")).query("sport"),
            Some("tennis_atp")
        );
    }
}
