//! Shared types for VALCoach.
//!
//! These types form the data model used across all modules: the player
//! record produced by stats ingestion, the closed enums that drive the
//! scoring engine, and the pick result consumed by presentation and the
//! LLM explainer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Statistical category a pick is made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatType {
    Kills,
    Assists,
}

impl StatType {
    /// Every category the assembler produces a pick for, in output order.
    pub const ALL: &'static [StatType] = &[StatType::Kills, StatType::Assists];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatType::Kills => "kills",
            StatType::Assists => "assists",
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatType {
    type Err = ValcoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kills" | "kill" | "k" => Ok(StatType::Kills),
            "assists" | "assist" | "a" => Ok(StatType::Assists),
            _ => Err(ValcoachError::UnknownValue {
                kind: "stat type",
                value: s.to_string(),
            }),
        }
    }
}

/// How aggressive the recommendation thresholds are.
///
/// Ordered by aggressiveness: `Safe < Standard < Yolo`. A more aggressive
/// posture needs a smaller edge to produce a lean.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskPosture {
    Safe,
    #[default]
    Standard,
    Yolo,
}

impl RiskPosture {
    pub const ALL: &'static [RiskPosture] =
        &[RiskPosture::Safe, RiskPosture::Standard, RiskPosture::Yolo];

    /// Friendly adjective used in explanation text.
    pub fn profile_label(&self) -> &'static str {
        match self {
            RiskPosture::Safe => "conservative",
            RiskPosture::Standard => "balanced",
            RiskPosture::Yolo => "aggressive",
        }
    }
}

impl fmt::Display for RiskPosture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskPosture::Safe => write!(f, "safe"),
            RiskPosture::Standard => write!(f, "standard"),
            RiskPosture::Yolo => write!(f, "yolo"),
        }
    }
}

impl std::str::FromStr for RiskPosture {
    type Err = ValcoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" | "conservative" => Ok(RiskPosture::Safe),
            "standard" | "balanced" => Ok(RiskPosture::Standard),
            "yolo" | "aggressive" => Ok(RiskPosture::Yolo),
            _ => Err(ValcoachError::UnknownValue {
                kind: "risk posture",
                value: s.to_string(),
            }),
        }
    }
}

/// Directional lean on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Lean Over")]
    LeanOver,
    #[serde(rename = "Lean Under")]
    LeanUnder,
    #[serde(rename = "Stay Away")]
    StayAway,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::LeanOver => write!(f, "Lean Over"),
            Recommendation::LeanUnder => write!(f, "Lean Under"),
            Recommendation::StayAway => write!(f, "Stay Away"),
        }
    }
}

/// Qualitative tier derived from edge magnitude alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "Low"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = ValcoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" | "med" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            _ => Err(ValcoachError::UnknownValue {
                kind: "confidence",
                value: s.to_string(),
            }),
        }
    }
}

/// Tactical role inferred from a player's agent pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Duelist,
    Controller,
    Initiator,
    Sentinel,
    /// Plays agents from more than one role.
    Flex,
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Duelist => write!(f, "Duelist"),
            Role::Controller => write!(f, "Controller"),
            Role::Initiator => write!(f, "Initiator"),
            Role::Sentinel => write!(f, "Sentinel"),
            Role::Flex => write!(f, "Flex"),
            Role::Unknown => write!(f, "Unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player record
// ---------------------------------------------------------------------------

/// Cleaned per-player snapshot produced by stats ingestion.
///
/// `kast` and `consistency` are already clamped to [0, 1] and
/// `maps_played` is at least 1 by the time a record reaches the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub handle: String,
    pub team: String,
    pub role: Role,
    pub kills_per_map: f64,
    pub assists_per_map: f64,
    /// Overall rating, centred near 1.0.
    pub rating: f64,
    /// KAST as a fraction (0.0–1.0).
    pub kast: f64,
    pub maps_played: u32,
    /// Derived 0–1 blend of rating and KAST.
    pub consistency: f64,
}

impl PlayerRecord {
    /// Baseline per-map rate for a category.
    pub fn per_map(&self, stat: StatType) -> f64 {
        match stat {
            StatType::Kills => self.kills_per_map,
            StatType::Assists => self.assists_per_map,
        }
    }

    /// Helper to build a test/sample player with league-average numbers.
    #[cfg(test)]
    pub fn sample() -> Self {
        PlayerRecord {
            id: "sentenz".to_string(),
            handle: "TenZ".to_string(),
            team: "SEN".to_string(),
            role: Role::Duelist,
            kills_per_map: 20.0,
            assists_per_map: 5.0,
            rating: 1.0,
            kast: 0.72,
            maps_played: 12,
            consistency: 0.5,
        }
    }
}

impl fmt::Display for PlayerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}) K/map={:.1} A/map={:.1} rating={:.2} KAST={:.0}% maps={}",
            self.handle,
            self.team,
            self.role,
            self.kills_per_map,
            self.assists_per_map,
            self.rating,
            self.kast * 100.0,
            self.maps_played,
        )
    }
}

// ---------------------------------------------------------------------------
// Pick result
// ---------------------------------------------------------------------------

/// One scored pick for a single (player, stat) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickResult {
    pub player_id: String,
    pub player_handle: String,
    pub team_name: String,
    pub role: Role,
    pub stat_type: StatType,
    pub line_value: f64,
    pub projected_value: f64,
    /// Signed z-score style edge: positive leans over.
    pub edge: f64,
    /// P(over) in [0.01, 0.99].
    pub probability_over: f64,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    pub explanation: String,
    /// Full originating record, shared by both picks of a player.
    pub raw_player: Arc<PlayerRecord>,
}

impl fmt::Display for PickResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} | line={:.1} proj={:.1} edge={:+.2} P(over)={:.0}% | {} ({})",
            self.player_handle,
            self.stat_type,
            self.line_value,
            self.projected_value,
            self.edge,
            self.probability_over * 100.0,
            self.recommendation,
            self.confidence,
        )
    }
}

impl PickResult {
    /// Probability of the side the recommendation leans towards.
    /// Stay-away picks report the larger of the two sides.
    pub fn lean_probability(&self) -> f64 {
        match self.recommendation {
            Recommendation::LeanOver => self.probability_over,
            Recommendation::LeanUnder => 1.0 - self.probability_over,
            Recommendation::StayAway => self.probability_over.max(1.0 - self.probability_over),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for VALCoach.
#[derive(Debug, thiserror::Error)]
pub enum ValcoachError {
    #[error("Stats source error ({source_name}): {message}")]
    StatsSource { source_name: String, message: String },

    #[error("LLM error ({model}): {message}")]
    Llm { model: String, message: String },

    #[error("Invalid player row: {0}")]
    InvalidPlayer(String),

    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Pick not found: {0}")]
    PickNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
