use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_MATCHES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: u64,
    pub sport: String,
    pub league: String,
    pub team1: String,
    pub team2: String,
    // Only the mock table carries scores; live odds have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score2: Option<u32>,
    pub time: String,
    pub is_live: bool,
    pub odds: MatchOdds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub win1: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<f64>,
    pub win2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    Mock,
}

/// Top-level payload returned to the caller, for both live and mock data.
///
/// Construct through [`Envelope::live`] or [`Envelope::mock`] so that `count`
/// always matches `matches.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub matches: Vec<Match>,
    pub count: usize,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DataMode>,
}

impl Envelope {
    pub fn live(matches: Vec<Match>, now: DateTime<Utc>) -> Self {
        Self::build(matches, now, None)
    }

    pub fn mock(matches: Vec<Match>, now: DateTime<Utc>) -> Self {
        Self::build(matches, now, Some(DataMode::Mock))
    }

    fn build(mut matches: Vec<Match>, now: DateTime<Utc>, mode: Option<DataMode>) -> Self {
        matches.truncate(MAX_MATCHES);
        Self {
            count: matches.len(),
            matches,
            timestamp: iso_timestamp(now),
            mode,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mode == Some(DataMode::Mock)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Envelope>,
}

pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample(id: u64) -> Match {
        Match {
            id,
            sport: "⚽".to_string(),
            league: "EPL".to_string(),
            team1: "Arsenal".to_string(),
            team2: "Chelsea".to_string(),
            score1: None,
            score2: None,
            time: "19:30".to_string(),
            is_live: false,
            odds: MatchOdds {
                win1: 2.1,
                draw: None,
                win2: 3.4,
            },
        }
    }

    #[test]
    fn envelope_count_tracks_matches_and_caps_at_ten() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let env = Envelope::live((0..14).map(sample).collect(), now);
        assert_eq!(env.count, MAX_MATCHES);
        assert_eq!(env.matches.len(), env.count);
        assert!(!env.is_mock());
    }

    #[test]
    fn live_match_json_omits_scores_and_missing_draw() {
        let json = serde_json::to_value(sample(7)).expect("serialize");
        assert!(json.get("score1").is_none());
        assert!(json.get("score2").is_none());
        assert!(json["odds"].get("draw").is_none());
        assert_eq!(json["isLive"], false);
    }

    #[test]
    fn timestamp_is_utc_iso8601() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(iso_timestamp(now), "2026-03-04T05:06:07.000000Z");
    }

    #[test]
    fn mock_mode_serializes_lowercase() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(Envelope::mock(vec![sample(1)], now)).expect("serialize");
        assert_eq!(json["mode"], "mock");
        assert_eq!(json["count"], 1);
    }
}
