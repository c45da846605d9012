//! In-memory stats source for integration testing.
//!
//! Serves a fixed player pool (or raw vlrggapi rows run through the real
//! ingestion rules) and counts fetches. Errors can be forced from test code.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use valcoach::data::vlr::{build_players, IngestConfig, StatsRow};
use valcoach::data::{StatsQuery, StatsSource};
use valcoach::types::{PlayerRecord, Role};

pub struct MockSource {
    players: Vec<PlayerRecord>,
    fetches: AtomicUsize,
    last_query: Mutex<Option<StatsQuery>>,
    /// If set, every fetch fails with this message.
    force_error: Mutex<Option<String>>,
}

impl MockSource {
    pub fn new(players: Vec<PlayerRecord>) -> Self {
        Self {
            players,
            fetches: AtomicUsize::new(0),
            last_query: Mutex::new(None),
            force_error: Mutex::new(None),
        }
    }

    /// A source whose pool comes from raw `/stats` rows.
    pub fn from_rows(json: &str, ingest: &IngestConfig) -> Self {
        let rows: Vec<StatsRow> = serde_json::from_str(json).unwrap();
        Self::new(build_players(&rows, ingest))
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<StatsQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsSource for MockSource {
    async fn fetch_players(&self, query: &StatsQuery) -> Result<Vec<PlayerRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        Ok(self.players.clone())
    }
}

pub fn player(handle: &str, team: &str, kills: f64, assists: f64, rating: f64, kast: f64) -> PlayerRecord {
    PlayerRecord {
        id: format!("{}_{}", team, handle).to_lowercase(),
        handle: handle.to_string(),
        team: team.to_string(),
        role: Role::Duelist,
        kills_per_map: kills,
        assists_per_map: assists,
        rating,
        kast,
        maps_played: 12,
        consistency: 0.5,
    }
}

/// A small pool with a clear over, a clear under and some noise.
pub fn default_pool() -> Vec<PlayerRecord> {
    vec![
        player("TenZ", "SEN", 20.0, 5.0, 1.0, 0.72),
        player("aspas", "LEV", 21.0, 4.0, 1.35, 0.80),
        player("Boaster", "FNC", 12.0, 8.0, 0.82, 0.66),
        player("Less", "LOUD", 15.0, 7.5, 1.08, 0.77),
        player("Sacy", "SEN", 14.0, 9.0, 0.95, 0.74),
    ]
}

/// Raw rows in the shape vlrggapi returns.
pub const RAW_ROWS: &str = r#"[
    {"player": "  Derke ", "org": "FNC", "agents": ["jett", "raze"], "rounds_played": "440",
     "rating": "1.21", "kill_assists_survived_traded": "74%",
     "kills_per_round": "0.95", "assists_per_round": "0.18"},
    {"player": "Chronicle", "org": "FNC", "agents": "sova, viper, killjoy", "rounds_played": 396,
     "rating": 1.05, "kill_assists_survived_traded": "76%",
     "kills_per_round": 0.70, "assists_per_round": 0.35},
    {"player": "", "org": "FNC", "rating": "1.50"},
    {"player": "Mystery", "org": "", "rating": "n/a"}
]"#;
