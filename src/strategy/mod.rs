//! Scoring engine: projections, edge scoring, classification, and
//! explanation, assembled into a ranked pick list.
//!
//! Everything in here is pure and synchronous: no I/O, no shared state.

pub mod edge;
pub mod explain;
pub mod projection;

use std::sync::Arc;

use tracing::{debug, info};

use crate::types::{PickResult, PlayerRecord, RiskPosture, StatType};
use explain::PickFigures;

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Scores every (player, stat) pair and ranks the picks by |edge|.
///
/// The posture only changes recommendation labels and explanation text;
/// every player always yields one pick per stat type.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickAssembler {
    posture: RiskPosture,
}

impl PickAssembler {
    pub fn new(posture: RiskPosture) -> Self {
        Self { posture }
    }

    /// Build picks for all players, most extreme edges first.
    ///
    /// The sort is stable, so equal |edge| keeps input order (player order,
    /// then kills before assists).
    pub fn build_picks(&self, players: &[PlayerRecord]) -> Vec<PickResult> {
        let mut picks: Vec<PickResult> = Vec::with_capacity(players.len() * StatType::ALL.len());

        for player in players {
            let shared = Arc::new(player.clone());
            for stat in StatType::ALL {
                picks.push(self.score(&shared, *stat));
            }
        }

        picks.sort_by(|a, b| b.edge.abs().total_cmp(&a.edge.abs()));

        info!(
            players = players.len(),
            picks = picks.len(),
            posture = %self.posture,
            top_edge = picks.first().map(|p| format!("{:+.2}", p.edge)).unwrap_or_default(),
            "Picks assembled"
        );

        picks
    }

    /// Score a single player/stat pair.
    pub fn score(&self, player: &Arc<PlayerRecord>, stat: StatType) -> PickResult {
        let projected_value = projection::project(player, stat);
        let line_value = projection::synthesize_line(player, stat);
        let spread = projection::spread(player, stat);

        let edge = edge::edge_score(projected_value, line_value, spread);
        let probability_over = edge::probability_over(edge);
        let recommendation = edge::recommend(edge, self.posture, stat);
        let confidence = edge::confidence(edge);

        let explanation = explain::compose(
            player,
            &PickFigures {
                stat,
                line: line_value,
                projection: projected_value,
                edge,
                probability_over,
                recommendation,
                posture: self.posture,
            },
        );

        debug!(
            player = %player.handle,
            stat = %stat,
            line = line_value,
            projection = format!("{projected_value:.2}"),
            spread = format!("{spread:.2}"),
            edge = format!("{edge:+.3}"),
            p_over = format!("{:.1}%", probability_over * 100.0),
            recommendation = %recommendation,
            confidence = %confidence,
            "Pick scored"
        );

        PickResult {
            player_id: player.id.clone(),
            player_handle: player.handle.clone(),
            team_name: player.team.clone(),
            role: player.role,
            stat_type: stat,
            line_value,
            projected_value,
            edge,
            probability_over,
            recommendation,
            confidence,
            explanation,
            raw_player: Arc::clone(player),
        }
    }
}

/// Convenience wrapper: assemble picks for `players` under `posture`.
pub fn build_picks(players: &[PlayerRecord], posture: RiskPosture) -> Vec<PickResult> {
    PickAssembler::new(posture).build_picks(players)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
