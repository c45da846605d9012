//! vlrggapi stats provider.
//!
//! Fetches per-player Valorant stats from the unofficial vlr.gg REST API
//! and converts each row into a clean `PlayerRecord`.
//!
//! API: `https://vlrggapi.vercel.app/stats?region=na&timespan=30`
//! Rows live under `data.segments`; numeric fields arrive as strings
//! ("1.12", "72%") and are parsed leniently with per-field defaults.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{StatsQuery, StatsSource};
use crate::types::{PlayerRecord, Role, ValcoachError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://vlrggapi.vercel.app";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A typical pro map runs ~22 rounds (13–9, 13–10, ...).
pub const EXPECTED_ROUNDS_PER_MAP: f64 = 22.0;

/// Keep the pool small enough to browse.
pub const DEFAULT_MAX_PLAYERS: usize = 40;

const DEFAULT_RATING: f64 = 1.0;
const DEFAULT_KILLS_PER_ROUND: f64 = 0.8;
const DEFAULT_ASSISTS_PER_ROUND: f64 = 0.3;
const DEFAULT_KAST: f64 = 0.70;
/// Roughly ten maps' worth of rounds when the API omits the count.
const DEFAULT_MAPS_WHEN_MISSING: f64 = 10.0;

/// How raw rows are turned into player records.
#[derive(Debug, Clone, Copy)]
pub struct IngestConfig {
    pub max_players: usize,
    pub rounds_per_map: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            rounds_per_map: EXPECTED_ROUNDS_PER_MAP,
        }
    }
}

// ---------------------------------------------------------------------------
// Agent → role mapping
// ---------------------------------------------------------------------------

const AGENT_ROLES: &[(&str, Role)] = &[
    ("jett", Role::Duelist),
    ("neon", Role::Duelist),
    ("raze", Role::Duelist),
    ("yoru", Role::Duelist),
    ("iso", Role::Duelist),
    ("reyna", Role::Duelist),
    ("waylay", Role::Duelist),
    ("phoenix", Role::Duelist),
    ("omen", Role::Controller),
    ("clove", Role::Controller),
    ("viper", Role::Controller),
    ("brimstone", Role::Controller),
    ("harbor", Role::Controller),
    ("astra", Role::Controller),
    ("gekko", Role::Initiator),
    ("sova", Role::Initiator),
    ("fade", Role::Initiator),
    ("kayo", Role::Initiator),
    ("breach", Role::Initiator),
    ("skye", Role::Initiator),
    ("tejo", Role::Initiator),
    ("cypher", Role::Sentinel),
    ("killjoy", Role::Sentinel),
    ("vyse", Role::Sentinel),
    ("deadlock", Role::Sentinel),
    ("sage", Role::Sentinel),
    ("chamber", Role::Sentinel),
    ("veto", Role::Sentinel),
];

fn agent_role(name: &str) -> Option<Role> {
    AGENT_ROLES
        .iter()
        .find(|(agent, _)| *agent == name)
        .map(|(_, role)| *role)
}

/// Infer a tactical role from the agents a player has been playing.
///
/// Accepts a comma/slash separated string or an array of names. No
/// recognised agent gives `Unknown`; agents spanning several roles give
/// `Flex`.
pub fn infer_role(agents: Option<&Value>) -> Role {
    let names: Vec<String> = match agents {
        Some(Value::String(s)) => s
            .split([',', '/'])
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.trim().to_lowercase(),
                other => other.to_string().trim().to_lowercase(),
            })
            .filter(|p| !p.is_empty())
            .collect(),
        _ => return Role::Unknown,
    };

    let mut roles_seen: Vec<Role> = Vec::new();
    for name in &names {
        if let Some(role) = agent_role(name) {
            if !roles_seen.contains(&role) {
                roles_seen.push(role);
            }
        }
    }

    match roles_seen.as_slice() {
        [] => Role::Unknown,
        [single] => *single,
        _ => Role::Flex,
    }
}

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    data: Option<StatsData>,
}

#[derive(Debug, Deserialize)]
struct StatsData {
    #[serde(default)]
    segments: Vec<StatsRow>,
}

/// One player row from `/stats`. Every field is optional and loosely typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsRow {
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub agents: Option<Value>,
    #[serde(default)]
    pub agent: Option<Value>,
    #[serde(default)]
    pub rounds_played: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub kill_assists_survived_traded: Option<Value>,
    #[serde(default)]
    pub kills_per_round: Option<Value>,
    #[serde(default)]
    pub assists_per_round: Option<Value>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse a number that may arrive as a JSON number or a string.
fn float_or(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Parse KAST ("72%" or 72 → 0.72), clamped to [0, 1].
pub fn parse_kast(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };
    raw.filter(|v| v.is_finite())
        .map(|pct| pct / 100.0)
        .unwrap_or(DEFAULT_KAST)
        .clamp(0.0, 1.0)
}

/// 0–1 consistency blend: approaches 1 as KAST clears 0.65 and rating
/// clears 0.9.
pub fn consistency_score(kast: f64, rating: f64) -> f64 {
    (0.5 * (kast - 0.65) / 0.15 + 0.5 * (rating - 0.9) / 0.4).clamp(0.0, 1.0)
}

/// Machine-friendly id from team + handle, alphanumerics only.
pub fn player_id(team: &str, handle: &str) -> String {
    let id: String = format!("{team}_{handle}")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    if id.is_empty() {
        handle.to_lowercase()
    } else {
        id
    }
}

// ---------------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------------

/// Convert one API row into a player record.
pub fn player_from_row(row: &StatsRow, rounds_per_map: f64) -> Result<PlayerRecord, ValcoachError> {
    let handle = row.player.as_deref().map(str::trim).unwrap_or_default();
    if handle.is_empty() {
        return Err(ValcoachError::InvalidPlayer("row has no player handle".to_string()));
    }

    let team = row
        .org
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Unknown");

    let rating = float_or(row.rating.as_ref(), DEFAULT_RATING);
    let kpr = float_or(row.kills_per_round.as_ref(), DEFAULT_KILLS_PER_ROUND);
    let apr = float_or(row.assists_per_round.as_ref(), DEFAULT_ASSISTS_PER_ROUND);
    let kast = parse_kast(row.kill_assists_survived_traded.as_ref());

    let rounds = float_or(row.rounds_played.as_ref(), rounds_per_map * DEFAULT_MAPS_WHEN_MISSING);
    let maps_played = (rounds / rounds_per_map).round_ties_even().max(1.0) as u32;

    let agents = row.agents.as_ref().or(row.agent.as_ref());

    Ok(PlayerRecord {
        id: player_id(team, handle),
        handle: handle.to_string(),
        team: team.to_string(),
        role: infer_role(agents),
        kills_per_map: kpr * rounds_per_map,
        assists_per_map: apr * rounds_per_map,
        rating,
        kast,
        maps_played,
        consistency: consistency_score(kast, rating),
    })
}

/// Turn API rows into the player pool: top `max_players` by rating.
///
/// Rows without a usable handle are skipped with a warning.
pub fn build_players(rows: &[StatsRow], config: &IngestConfig) -> Vec<PlayerRecord> {
    let mut ranked: Vec<(f64, &StatsRow)> = rows
        .iter()
        .map(|row| (float_or(row.rating.as_ref(), DEFAULT_RATING), row))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut players = Vec::with_capacity(config.max_players.min(ranked.len()));
    for (_, row) in ranked.into_iter().take(config.max_players) {
        match player_from_row(row, config.rounds_per_map) {
            Ok(player) => players.push(player),
            Err(e) => warn!(error = %e, org = ?row.org, "Skipping stats row"),
        }
    }

    debug!(rows = rows.len(), players = players.len(), "Player pool built");
    players
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct VlrClient {
    http: Client,
    base_url: String,
    ingest: IngestConfig,
}

impl VlrClient {
    pub fn new(base_url: Option<String>, timeout_secs: Option<u64>, ingest: IngestConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)))
            .user_agent("VALCoach/0.1.0")
            .build()
            .context("Failed to build vlrggapi HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            ingest,
        })
    }

    /// Fetch raw `/stats` rows for a region and timespan.
    pub async fn fetch_rows(&self, query: &StatsQuery) -> Result<Vec<StatsRow>> {
        let url = format!("{}/stats", self.base_url);
        debug!(url = %url, region = %query.region, timespan = %query.timespan, "Fetching vlrggapi stats");

        let resp = self
            .http
            .get(&url)
            .query(&[("region", query.region.as_str()), ("timespan", query.timespan.as_str())])
            .send()
            .await
            .map_err(|e| ValcoachError::StatsSource {
                source_name: "vlrggapi".to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ValcoachError::StatsSource {
                source_name: "vlrggapi".to_string(),
                message: format!("HTTP {status}: {body}"),
            }
            .into());
        }

        let body: StatsResponse = resp
            .json()
            .await
            .context("Failed to parse vlrggapi stats response")?;

        Ok(body.data.map(|d| d.segments).unwrap_or_default())
    }
}

#[async_trait]
impl StatsSource for VlrClient {
    async fn fetch_players(&self, query: &StatsQuery) -> Result<Vec<PlayerRecord>> {
        let rows = self.fetch_rows(query).await?;
        let players = build_players(&rows, &self.ingest);
        info!(
            region = %query.region,
            timespan = %query.timespan,
            rows = rows.len(),
            players = players.len(),
            "Stats fetched"
        );
        Ok(players)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> StatsRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_full_row() {
        let r = row(json!({
            "player": " TenZ ",
            "org": "SEN",
            "agents": ["jett", "raze"],
            "rounds_played": "264",
            "rating": "1.30",
            "kill_assists_survived_traded": "85%",
            "kills_per_round": "0.9",
            "assists_per_round": "0.25"
        }));
        let p = player_from_row(&r, EXPECTED_ROUNDS_PER_MAP).unwrap();

        assert_eq!(p.handle, "TenZ");
        assert_eq!(p.team, "SEN");
        assert_eq!(p.id, "sentenz");
        assert_eq!(p.role, Role::Duelist);
        assert!((p.kills_per_map - 19.8).abs() < 1e-9);
        assert!((p.assists_per_map - 5.5).abs() < 1e-9);
        assert!((p.rating - 1.3).abs() < 1e-12);
        assert!((p.kast - 0.85).abs() < 1e-12);
        assert_eq!(p.maps_played, 12);
        // 0.5 * 0.2 / 0.15 + 0.5 * 0.4 / 0.4 > 1 → clamped
        assert_eq!(p.consistency, 1.0);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let p = player_from_row(&row(json!({ "player": "ghost" })), EXPECTED_ROUNDS_PER_MAP).unwrap();
        assert_eq!(p.team, "Unknown");
        assert_eq!(p.id, "unknownghost");
        assert_eq!(p.role, Role::Unknown);
        assert_eq!(p.rating, 1.0);
        assert_eq!(p.kast, 0.70);
        assert!((p.kills_per_map - 17.6).abs() < 1e-9);
        assert!((p.assists_per_map - 6.6).abs() < 1e-9);
        assert_eq!(p.maps_played, 10);
    }

    #[test]
    fn test_numeric_fields_accept_numbers_and_bad_strings() {
        let p = player_from_row(
            &row(json!({
                "player": "x",
                "rating": 1.1,
                "kills_per_round": "n/a",
                "kill_assists_survived_traded": 74
            })),
            EXPECTED_ROUNDS_PER_MAP,
        )
        .unwrap();
        assert!((p.rating - 1.1).abs() < 1e-12);
        assert!((p.kills_per_map - 17.6).abs() < 1e-9);
        assert!((p.kast - 0.74).abs() < 1e-12);
    }

    #[test]
    fn test_missing_handle_is_invalid() {
        let err = player_from_row(&row(json!({ "player": "  ", "org": "FNC" })), 22.0).unwrap_err();
        assert!(matches!(err, ValcoachError::InvalidPlayer(_)));
    }

    #[test]
    fn test_maps_played_at_least_one() {
        let p = player_from_row(&row(json!({ "player": "rookie", "rounds_played": "3" })), 22.0).unwrap();
        assert_eq!(p.maps_played, 1);
    }

    #[test]
    fn test_kast_parsing_and_clamp() {
        assert!((parse_kast(Some(&json!("72%"))) - 0.72).abs() < 1e-12);
        assert!((parse_kast(Some(&json!(" 80 % "))) - 0.80).abs() < 1e-12);
        assert_eq!(parse_kast(Some(&json!("abc"))), 0.70);
        assert_eq!(parse_kast(None), 0.70);
        assert_eq!(parse_kast(Some(&json!("140%"))), 1.0);
    }

    #[test]
    fn test_consistency_score_bounds() {
        assert_eq!(consistency_score(0.65, 0.9), 0.0);
        assert_eq!(consistency_score(0.5, 0.6), 0.0);
        assert_eq!(consistency_score(0.9, 1.5), 1.0);
        assert!((consistency_score(0.725, 1.1) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_player_id_strips_symbols() {
        assert_eq!(player_id("100 Thieves", "Asuna!"), "100thievesasuna");
        assert_eq!(player_id("", "???"), "???");
    }

    #[test]
    fn test_infer_role_variants() {
        assert_eq!(infer_role(None), Role::Unknown);
        assert_eq!(infer_role(Some(&json!(""))), Role::Unknown);
        assert_eq!(infer_role(Some(&json!("Omen, Viper / Astra"))), Role::Controller);
        assert_eq!(infer_role(Some(&json!(["Sova", "Jett"]))), Role::Flex);
        assert_eq!(infer_role(Some(&json!(["mystery"]))), Role::Unknown);
        assert_eq!(infer_role(Some(&json!("killjoy"))), Role::Sentinel);
        assert_eq!(infer_role(Some(&json!(42))), Role::Unknown);
    }

    #[test]
    fn test_agent_field_fallback() {
        let p = player_from_row(&row(json!({ "player": "x", "agent": "fade" })), 22.0).unwrap();
        assert_eq!(p.role, Role::Initiator);
    }

    #[test]
    fn test_build_players_ranks_caps_and_skips() {
        let rows: Vec<StatsRow> = vec![
            row(json!({ "player": "low", "rating": "0.90" })),
            row(json!({ "player": "", "rating": "2.00" })),
            row(json!({ "player": "high", "rating": "1.40" })),
            row(json!({ "player": "mid", "rating": "1.10" })),
        ];
        let config = IngestConfig { max_players: 3, ..IngestConfig::default() };
        let players = build_players(&rows, &config);

        // The handle-less row takes a slot in the top 3 but is dropped.
        let handles: Vec<_> = players.iter().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, vec!["high", "mid"]);
    }

    #[test]
    fn test_response_without_segments() {
        let body: StatsResponse = serde_json::from_value(json!({ "status": 200 })).unwrap();
        assert!(body.data.is_none());
        let body: StatsResponse = serde_json::from_value(json!({ "data": { "status": 200 } })).unwrap();
        assert!(body.data.unwrap().segments.is_empty());
    }

    #[test]
    fn test_client_construction() {
        let client = VlrClient::new(Some("http://localhost:9/".into()), Some(1), IngestConfig::default()).unwrap();
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
