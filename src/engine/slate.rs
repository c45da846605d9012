//! Slate building, filtering and summary metrics.
//!
//! A slate is one fetch→score pass: the player pool for a region and
//! timespan, scored under one risk posture and stamped with the time it
//! was built. Presentation layers filter and summarise it; they never
//! re-score.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::{StatsQuery, StatsSource};
use crate::llm::PickExplainer;
use crate::strategy::PickAssembler;
use crate::types::{Confidence, PickResult, Recommendation, RiskPosture, StatType};

// ---------------------------------------------------------------------------
// Slate
// ---------------------------------------------------------------------------

/// Ranked picks from one build pass.
#[derive(Debug, Clone, Serialize)]
pub struct Slate {
    pub query: StatsQuery,
    pub posture: RiskPosture,
    pub generated_at: DateTime<Utc>,
    pub picks: Vec<PickResult>,
}

impl Slate {
    /// An empty slate, used before the first build succeeds.
    pub fn empty(query: StatsQuery, posture: RiskPosture) -> Self {
        Self {
            query,
            posture,
            generated_at: Utc::now(),
            picks: Vec::new(),
        }
    }

    /// Look up the pick for a player and stat.
    pub fn find(&self, player_id: &str, stat: StatType) -> Option<&PickResult> {
        self.picks
            .iter()
            .find(|p| p.player_id == player_id && p.stat_type == stat)
    }

    pub fn filtered(&self, filter: &PickFilter) -> Vec<&PickResult> {
        filter.apply(&self.picks)
    }

    pub fn summary(&self, filter: &PickFilter) -> SlateSummary {
        SlateSummary::new(&self.picks, &self.filtered(filter))
    }
}

/// Builds slates from an injected stats source.
#[derive(Clone)]
pub struct SlateService {
    source: Arc<dyn StatsSource>,
}

impl SlateService {
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        Self { source }
    }

    /// Fetch the player pool and score it under `posture`.
    pub async fn build_slate(&self, query: &StatsQuery, posture: RiskPosture) -> Result<Slate> {
        let players = self.source.fetch_players(query).await?;
        let picks = PickAssembler::new(posture).build_picks(&players);

        info!(
            region = %query.region,
            timespan = %query.timespan,
            posture = %posture,
            players = players.len(),
            picks = picks.len(),
            "Slate built"
        );

        Ok(Slate {
            query: query.clone(),
            posture,
            generated_at: Utc::now(),
            picks,
        })
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Display filter over a slate. The default keeps every pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickFilter {
    pub stat_types: Vec<StatType>,
    pub min_confidence: Confidence,
    /// Case-insensitive substring of the player handle.
    pub search: Option<String>,
}

impl Default for PickFilter {
    fn default() -> Self {
        Self {
            stat_types: StatType::ALL.to_vec(),
            min_confidence: Confidence::Low,
            search: None,
        }
    }
}

impl PickFilter {
    pub fn matches(&self, pick: &PickResult) -> bool {
        if !self.stat_types.contains(&pick.stat_type) {
            return false;
        }
        if pick.confidence < self.min_confidence {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => pick
                .player_handle
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        }
    }

    /// Matching picks, in slate order.
    pub fn apply<'a>(&self, picks: &'a [PickResult]) -> Vec<&'a PickResult> {
        picks.iter().filter(|p| self.matches(p)).collect()
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Headline numbers for a slate and its filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlateSummary {
    /// Distinct players in the whole pool.
    pub players: usize,
    pub total_picks: usize,
    pub filtered_picks: usize,
    pub over_leans: usize,
    pub under_leans: usize,
    pub stay_away: usize,
    /// Mean |edge| over the filtered picks (0 when none).
    pub avg_abs_edge: f64,
}

impl SlateSummary {
    pub fn new(all: &[PickResult], filtered: &[&PickResult]) -> Self {
        let mut players: Vec<&str> = all.iter().map(|p| p.player_id.as_str()).collect();
        players.sort_unstable();
        players.dedup();

        let count = |rec: Recommendation| filtered.iter().filter(|p| p.recommendation == rec).count();

        let avg_abs_edge = if filtered.is_empty() {
            0.0
        } else {
            filtered.iter().map(|p| p.edge.abs()).sum::<f64>() / filtered.len() as f64
        };

        Self {
            players: players.len(),
            total_picks: all.len(),
            filtered_picks: filtered.len(),
            over_leans: count(Recommendation::LeanOver),
            under_leans: count(Recommendation::LeanUnder),
            stay_away: count(Recommendation::StayAway),
            avg_abs_edge,
        }
    }
}

// ---------------------------------------------------------------------------
// Explanations
// ---------------------------------------------------------------------------

/// Narrative explanations for the first `n` picks, at most `concurrency`
/// requests in flight. A failed request falls back to the pick's templated
/// explanation. Output order matches `picks`.
pub async fn explain_top(
    explainer: &dyn PickExplainer,
    picks: &[PickResult],
    region: Option<&str>,
    n: usize,
    concurrency: usize,
) -> Vec<String> {
    stream::iter(picks.iter().take(n))
        .map(|pick| async move {
            match explainer.explain(pick, region).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        player = %pick.player_handle,
                        stat = %pick.stat_type,
                        model = explainer.model_name(),
                        error = %e,
                        "Explanation failed, using template text"
                    );
                    pick.explanation.clone()
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
