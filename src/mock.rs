use chrono::{DateTime, Utc};

use crate::models::{Envelope, Match, MatchOdds};

/// Static sample board served when no API key is configured, and attached
/// as `fallback` to upstream failures.
pub fn mock_envelope(now: DateTime<Utc>) -> Envelope {
    Envelope::mock(mock_matches(), now)
}

pub fn mock_matches() -> Vec<Match> {
    vec![
        seed_match(
            1,
            "⚽",
            "Премьер-лига",
            ("Манчестер Сити", "Ливерпуль"),
            (2, 1),
            "67'",
            MatchOdds {
                win1: 1.85,
                draw: Some(3.40),
                win2: 4.20,
            },
        ),
        seed_match(
            2,
            "🏀",
            "NBA",
            ("Лейкерс", "Уорриорз"),
            (88, 92),
            "Q3 8:45",
            MatchOdds {
                win1: 2.10,
                draw: None,
                win2: 1.70,
            },
        ),
        seed_match(
            3,
            "🎾",
            "Australian Open",
            ("Медведев Д.", "Алькарас К."),
            (2, 1),
            "Сет 3",
            MatchOdds {
                win1: 1.55,
                draw: None,
                win2: 2.40,
            },
        ),
    ]
}

fn seed_match(
    id: u64,
    sport: &str,
    league: &str,
    teams: (&str, &str),
    score: (u32, u32),
    time: &str,
    odds: MatchOdds,
) -> Match {
    Match {
        id,
        sport: sport.to_string(),
        league: league.to_string(),
        team1: teams.0.to_string(),
        team2: teams.1.to_string(),
        score1: Some(score.0),
        score2: Some(score.1),
        time: time.to_string(),
        is_live: true,
        odds,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::mock_envelope;

    #[test]
    fn mock_board_has_three_live_scored_matches() {
        let env = mock_envelope(Utc::now());
        assert!(env.is_mock());
        assert_eq!(env.count, 3);
        assert_eq!(env.matches.len(), 3);
        assert!(env.matches.iter().all(|m| m.is_live && m.score1.is_some()));
        let sports: Vec<&str> = env.matches.iter().map(|m| m.sport.as_str()).collect();
        assert_eq!(sports, ["⚽", "🏀", "🎾"]);
    }

    #[test]
    fn only_soccer_mock_has_draw_price() {
        let env = mock_envelope(Utc::now());
        let draws: Vec<Option<f64>> = env.matches.iter().map(|m| m.odds.draw).collect();
        assert_eq!(draws, [Some(3.40), None, None]);
    }
}
