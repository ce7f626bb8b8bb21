use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::error::SharpError;

/// Placeholder the schedule provider uses for any missing text field.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sport {
    #[default]
    #[serde(rename = "NFL")]
    Nfl,
    #[serde(rename = "NBA")]
    Nba,
}

impl Sport {
    pub fn label(&self) -> &'static str {
        match self {
            Sport::Nfl => "NFL",
            Sport::Nba => "NBA",
        }
    }

    /// League-average combined score the over/under line is built around.
    pub fn baseline_total(&self) -> f64 {
        match self {
            Sport::Nfl => 45.0,
            Sport::Nba => 220.0,
        }
    }

    /// Path segment of the provider's scoreboard endpoint.
    pub fn scoreboard_path(&self) -> &'static str {
        match self {
            Sport::Nfl => "football/nfl",
            Sport::Nba => "basketball/nba",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sport {
    type Err = SharpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NFL" => Ok(Sport::Nfl),
            "NBA" => Ok(Sport::Nba),
            other => Err(SharpError::UnknownSport(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameOdds {
    pub details: String,
    pub over_under: Option<f64>,
}

/// An upcoming game as reported by the schedule provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledGame {
    pub game: String,
    pub home_team: String,
    pub away_team: String,
    pub home_record: String,
    pub away_record: String,
    pub date: Option<String>,
    pub status: String,
    pub venue: String,
    pub odds: Option<GameOdds>,
}

impl ScheduledGame {
    pub fn new(home_team: String, away_team: String) -> Self {
        Self {
            game: format!("{} @ {}", away_team, home_team),
            home_team,
            away_team,
            home_record: NOT_AVAILABLE.to_string(),
            away_record: NOT_AVAILABLE.to_string(),
            date: None,
            status: "Scheduled".to_string(),
            venue: "TBD".to_string(),
            odds: None,
        }
    }

    pub fn with_records(mut self, home_record: &str, away_record: &str) -> Self {
        self.home_record = home_record.to_string();
        self.away_record = away_record.to_string();
        self
    }

    pub fn with_venue(mut self, venue: &str) -> Self {
        self.venue = venue.to_string();
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn with_odds(mut self, odds: GameOdds) -> Self {
        self.odds = Some(odds);
        self
    }

    /// Short team tag used when writing spread lines, e.g. "Chiefs".
    pub fn nickname(team: &str) -> &str {
        team.split(' ').last().unwrap_or(team)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiveScore {
    pub game: String,
    pub home_score: String,
    pub away_score: String,
    pub status: String,
    pub clock: String,
    pub period: u32,
}
