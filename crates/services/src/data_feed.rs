use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sharp_models::{GameOdds, LiveScore, Result, ScheduledGame, SharpError, Sport, NOT_AVAILABLE};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const ESPN_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";

const UNKNOWN_VENUE: &str = "TBD";

#[derive(Debug, Clone)]
pub struct DataFeedConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_games: usize,
    pub enable_simulation: bool,
}

impl Default for DataFeedConfig {
    fn default() -> Self {
        Self {
            base_url: ESPN_BASE_URL.to_string(),
            timeout_ms: 10_000,
            max_games: 8,
            enable_simulation: false,
        }
    }
}

/// Source of upcoming games and in-progress scores for a sport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    async fn fetch_games(&self, sport: Sport) -> Result<Vec<ScheduledGame>>;

    async fn fetch_live_scores(&self, sport: Sport) -> Result<Vec<LiveScore>>;
}

/// Pick the provider described by `config`.
pub fn build_provider(config: &DataFeedConfig) -> Result<Arc<dyn ScheduleProvider>> {
    if config.enable_simulation {
        info!("🎮 Using simulated schedule");
        return Ok(Arc::new(SimulatedScheduleProvider::new(config.max_games)));
    }

    info!("🌐 Using ESPN schedule at {}", config.base_url);
    Ok(Arc::new(EspnScheduleProvider::new(config)?))
}

pub struct EspnScheduleProvider {
    client: Client,
    base_url: String,
    max_games: usize,
}

impl EspnScheduleProvider {
    pub fn new(config: &DataFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SharpError::Schedule(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_games: config.max_games,
        })
    }

    pub fn scoreboard_url(&self, sport: Sport) -> String {
        format!("{}/{}/scoreboard", self.base_url, sport.scoreboard_path())
    }

    async fn scoreboard(&self, sport: Sport) -> Result<Scoreboard> {
        let url = self.scoreboard_url(sport);
        debug!("📡 GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SharpError::Schedule(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SharpError::Schedule(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json::<Scoreboard>()
            .await
            .map_err(|e| SharpError::Schedule(e.to_string()))
    }
}

#[async_trait]
impl ScheduleProvider for EspnScheduleProvider {
    async fn fetch_games(&self, sport: Sport) -> Result<Vec<ScheduledGame>> {
        let games = self.scoreboard(sport).await?.games(self.max_games);
        info!("📅 Fetched {} {} games", games.len(), sport);
        Ok(games)
    }

    async fn fetch_live_scores(&self, sport: Sport) -> Result<Vec<LiveScore>> {
        Ok(self.scoreboard(sport).await?.live_scores())
    }
}

/// Scoreboard document as served by the ESPN site API. Only the fields the
/// engine reads are modelled.
#[derive(Debug, Deserialize, Default)]
pub struct Scoreboard {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    date: Option<String>,
    #[serde(default)]
    status: EventStatus,
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EventStatus {
    #[serde(rename = "type", default)]
    kind: StatusType,
    #[serde(default)]
    display_clock: String,
    #[serde(default)]
    period: u32,
}

#[derive(Debug, Deserialize, Default)]
struct StatusType {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
    venue: Option<Venue>,
    #[serde(default)]
    odds: Vec<Odds>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Competitor {
    #[serde(default)]
    home_away: String,
    team: Team,
    score: Option<String>,
    #[serde(default)]
    records: Vec<TeamRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Team {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct TeamRecord {
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Venue {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Odds {
    #[serde(default)]
    details: String,
    over_under: Option<f64>,
}

impl Competitor {
    fn record(&self) -> String {
        self.records
            .first()
            .and_then(|record| record.summary.clone())
            .filter(|summary| !summary.trim().is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

impl Competition {
    fn side(&self, side: &str) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.home_away == side)
    }
}

impl Scoreboard {
    /// The first `max_games` events with both sides present.
    pub fn games(&self, max_games: usize) -> Vec<ScheduledGame> {
        self.events
            .iter()
            .take(max_games)
            .filter_map(|event| {
                let competition = event.competitions.first()?;
                let home = competition.side("home")?;
                let away = competition.side("away")?;

                let venue = competition
                    .venue
                    .as_ref()
                    .and_then(|venue| venue.full_name.as_deref())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(UNKNOWN_VENUE);

                let mut game = ScheduledGame::new(
                    home.team.display_name.clone(),
                    away.team.display_name.clone(),
                )
                .with_records(&home.record(), &away.record())
                .with_status(&event.status.kind.description)
                .with_venue(venue);
                game.date = event.date.clone();

                if let Some(odds) = competition.odds.first() {
                    game = game.with_odds(GameOdds {
                        details: odds.details.clone(),
                        over_under: odds.over_under,
                    });
                }
                Some(game)
            })
            .collect()
    }

    pub fn live_scores(&self) -> Vec<LiveScore> {
        self.events
            .iter()
            .filter_map(|event| {
                let competition = event.competitions.first()?;
                let home = competition.side("home")?;
                let away = competition.side("away")?;

                Some(LiveScore {
                    game: format!("{} @ {}", away.team.display_name, home.team.display_name),
                    home_score: home.score.clone().unwrap_or_else(|| "0".to_string()),
                    away_score: away.score.clone().unwrap_or_else(|| "0".to_string()),
                    status: event.status.kind.description.clone(),
                    clock: event.status.display_clock.clone(),
                    period: event.status.period,
                })
            })
            .collect()
    }
}

/// Offline provider serving a fixed slate per sport.
#[derive(Debug, Clone)]
pub struct SimulatedScheduleProvider {
    max_games: usize,
}

impl SimulatedScheduleProvider {
    pub fn new(max_games: usize) -> Self {
        Self { max_games }
    }

    fn slate(sport: Sport) -> Vec<ScheduledGame> {
        let fixtures: &[(&str, &str, &str, &str, &str)] = match sport {
            Sport::Nfl => &[
                ("Kansas City Chiefs", "Buffalo Bills", "10-2", "9-3", "GEHA Field at Arrowhead Stadium"),
                ("Philadelphia Eagles", "Dallas Cowboys", "9-3", "7-5", "Lincoln Financial Field"),
                ("Detroit Lions", "Green Bay Packers", "11-1", "8-4", "Ford Field"),
                ("San Francisco 49ers", "Seattle Seahawks", "6-6", "7-5", "Levi's Stadium"),
                ("Baltimore Ravens", "Pittsburgh Steelers", "8-4", "9-3", "M&T Bank Stadium"),
                ("Miami Dolphins", "New York Jets", "5-7", "3-9", "Hard Rock Stadium"),
            ],
            Sport::Nba => &[
                ("Boston Celtics", "Milwaukee Bucks", "20-5", "14-11", "TD Garden"),
                ("Denver Nuggets", "Los Angeles Lakers", "17-9", "15-11", "Ball Arena"),
                ("Oklahoma City Thunder", "Dallas Mavericks", "21-4", "16-10", "Paycom Center"),
                ("New York Knicks", "Miami Heat", "16-9", "13-11", "Madison Square Garden"),
                ("Phoenix Suns", "Golden State Warriors", "12-13", "13-12", "Footprint Center"),
            ],
        };

        fixtures
            .iter()
            .map(|(home, away, home_record, away_record, venue)| {
                ScheduledGame::new(home.to_string(), away.to_string())
                    .with_records(home_record, away_record)
                    .with_venue(venue)
            })
            .collect()
    }
}

#[async_trait]
impl ScheduleProvider for SimulatedScheduleProvider {
    async fn fetch_games(&self, sport: Sport) -> Result<Vec<ScheduledGame>> {
        let mut games = Self::slate(sport);
        games.truncate(self.max_games);
        Ok(games)
    }

    async fn fetch_live_scores(&self, sport: Sport) -> Result<Vec<LiveScore>> {
        Ok(Self::slate(sport)
            .into_iter()
            .map(|game| LiveScore {
                game: game.game,
                home_score: "0".to_string(),
                away_score: "0".to_string(),
                status: game.status,
                clock: "0:00".to_string(),
                period: 0,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOREBOARD: &str = r#"{
        "events": [
            {
                "date": "2026-10-18T17:00Z",
                "status": {"type": {"description": "Scheduled"}, "displayClock": "0:00", "period": 0},
                "competitions": [{
                    "competitors": [
                        {"homeAway": "home", "team": {"displayName": "Kansas City Chiefs"}, "score": "0", "records": [{"summary": "10-2"}]},
                        {"homeAway": "away", "team": {"displayName": "Buffalo Bills"}, "score": "0", "records": [{"summary": "9-3"}]}
                    ],
                    "venue": {"fullName": "GEHA Field at Arrowhead Stadium"},
                    "odds": [{"details": "KC -3.5", "overUnder": 47.5}]
                }]
            },
            {
                "status": {"type": {"description": "In Progress"}, "displayClock": "7:12", "period": 3},
                "competitions": [{
                    "competitors": [
                        {"homeAway": "away", "team": {"displayName": "New York Jets"}, "score": "10"},
                        {"homeAway": "home", "team": {"displayName": "Miami Dolphins"}, "score": "14", "records": []}
                    ]
                }]
            },
            {
                "status": {"type": {"description": "Postponed"}},
                "competitions": []
            }
        ]
    }"#;

    fn scoreboard() -> Scoreboard {
        serde_json::from_str(SCOREBOARD).unwrap()
    }

    #[test]
    fn test_parse_scheduled_games() {
        let games = scoreboard().games(8);
        assert_eq!(games.len(), 2);

        let first = &games[0];
        assert_eq!(first.game, "Buffalo Bills @ Kansas City Chiefs");
        assert_eq!(first.home_record, "10-2");
        assert_eq!(first.venue, "GEHA Field at Arrowhead Stadium");
        assert_eq!(first.odds.as_ref().map(|o| o.details.as_str()), Some("KC -3.5"));
        assert_eq!(first.date.as_deref(), Some("2026-10-18T17:00Z"));

        // Missing optional fields fall back instead of failing
        let second = &games[1];
        assert_eq!(second.home_team, "Miami Dolphins");
        assert_eq!(second.home_record, NOT_AVAILABLE);
        assert_eq!(second.away_record, NOT_AVAILABLE);
        assert_eq!(second.venue, "TBD");
        assert!(second.odds.is_none());
    }

    #[test]
    fn test_max_games_limit() {
        assert_eq!(scoreboard().games(1).len(), 1);
        assert!(Scoreboard::default().games(8).is_empty());
    }

    #[test]
    fn test_parse_live_scores() {
        let scores = scoreboard().live_scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[1].game, "New York Jets @ Miami Dolphins");
        assert_eq!(scores[1].home_score, "14");
        assert_eq!(scores[1].clock, "7:12");
        assert_eq!(scores[1].period, 3);
    }

    #[test]
    fn test_scoreboard_urls() {
        let provider = EspnScheduleProvider::new(&DataFeedConfig {
            base_url: "http://localhost:9000/sports/".to_string(),
            ..DataFeedConfig::default()
        })
        .unwrap();

        assert_eq!(
            provider.scoreboard_url(Sport::Nfl),
            "http://localhost:9000/sports/football/nfl/scoreboard"
        );
        assert_eq!(
            provider.scoreboard_url(Sport::Nba),
            "http://localhost:9000/sports/basketball/nba/scoreboard"
        );
    }

    #[tokio::test]
    async fn test_simulated_slate() {
        let provider = SimulatedScheduleProvider::new(4);
        let games = provider.fetch_games(Sport::Nfl).await.unwrap();
        assert_eq!(games.len(), 4);
        assert!(games.iter().all(|g| g.home_record != NOT_AVAILABLE));

        let scores = provider.fetch_live_scores(Sport::Nba).await.unwrap();
        assert_eq!(scores.len(), 5);
    }
}
