use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};

use crate::models::{MAX_MATCHES, Match, MatchOdds};
use crate::odds_fetch::OddsEvent;

pub const LIVE_MARKER: &str = "45'";
pub const SOON_LABEL: &str = "Скоро";
pub const DEFAULT_LEAGUE: &str = "Спорт";
pub const DEFAULT_HOME: &str = "Team 1";
pub const DEFAULT_AWAY: &str = "Team 2";
pub const DEFAULT_WIN_PRICE: f64 = 2.0;
pub const DEFAULT_DRAW_PRICE: f64 = 3.0;
pub const DEFAULT_SPORT_EMOJI: &str = "⚽";

// Order matters: the first key contained in the sport key wins.
const SPORT_EMOJI: &[(&str, &str)] = &[
    ("soccer", "⚽"),
    ("basketball", "🏀"),
    ("americanfootball", "🏈"),
    ("baseball", "⚾"),
    ("icehockey", "🏒"),
    ("tennis", "🎾"),
    ("cricket", "🏏"),
    ("rugbyleague", "🏉"),
];

/// Turns raw upstream games into UI matches.
///
/// Only the first [`MAX_MATCHES`] games are looked at; games without a
/// bookmaker or with fewer than two outcomes are dropped, so the result may
/// be shorter than that.
pub fn format_matches(events: &[OddsEvent], now: DateTime<Utc>) -> Vec<Match> {
    events
        .iter()
        .take(MAX_MATCHES)
        .filter_map(|event| format_match(event, now))
        .collect()
}

pub fn format_match(event: &OddsEvent, now: DateTime<Utc>) -> Option<Match> {
    let outcomes = event.headline_outcomes()?;
    if outcomes.len() < 2 {
        return None;
    }

    let odds = MatchOdds {
        win1: outcomes[0].price.unwrap_or(DEFAULT_WIN_PRICE),
        win2: outcomes[1].price.unwrap_or(DEFAULT_WIN_PRICE),
        draw: outcomes
            .get(2)
            .map(|o| o.price.unwrap_or(DEFAULT_DRAW_PRICE)),
    };
    let (time, is_live) = kickoff_label(event.commence_time.as_deref(), now);

    Some(Match {
        id: match_id(event.id.as_deref().unwrap_or_default()),
        sport: sport_emoji(event.sport_key.as_deref().unwrap_or_default()).to_string(),
        league: event
            .sport_title
            .clone()
            .unwrap_or_else(|| DEFAULT_LEAGUE.to_string()),
        team1: event
            .home_team
            .clone()
            .unwrap_or_else(|| DEFAULT_HOME.to_string()),
        team2: event
            .away_team
            .clone()
            .unwrap_or_else(|| DEFAULT_AWAY.to_string()),
        score1: None,
        score2: None,
        time,
        is_live,
        odds,
    })
}

/// Display time and live flag for a commence time.
///
/// Started games get the fixed `45'` marker; upstream has no clock, so the
/// real elapsed time is unknown.
pub fn kickoff_label(commence_time: Option<&str>, now: DateTime<Utc>) -> (String, bool) {
    let Some(kickoff) = commence_time.and_then(parse_timestamp) else {
        return (SOON_LABEL.to_string(), false);
    };
    if kickoff < now {
        return (LIVE_MARKER.to_string(), true);
    }
    (kickoff.format("%H:%M").to_string(), false)
}

pub fn sport_emoji(sport_key: &str) -> &'static str {
    let key = sport_key.to_lowercase();
    SPORT_EMOJI
        .iter()
        .find(|(category, _)| key.contains(category))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_SPORT_EMOJI)
}

/// Stable numeric id for an upstream game id: the top 48 bits of its
/// SHA-256, which stays exact in a JavaScript number. Collisions are not
/// checked.
pub fn match_id(raw_id: &str) -> u64 {
    let digest = Sha256::digest(raw_id.as_bytes());
    let mut buf = [0u8; 8];
    buf[2..].copy_from_slice(&digest[..6]);
    u64::from_be_bytes(buf)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}
