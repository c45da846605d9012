//! Templated pick rationale.
//!
//! Renders a deterministic four-sentence explanation: baseline and
//! projection vs line, rating/KAST consistency, the implied probability
//! of the leaned side, and the risk profile the pick was labelled under.
//! Same inputs always yield the same text.

use std::fmt::Write;

use crate::types::{PlayerRecord, Recommendation, RiskPosture, StatType};

/// KAST at or above which a player reads as highly consistent.
const HIGH_CONSISTENCY_KAST: f64 = 0.78;

/// Scored values an explanation is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct PickFigures {
    pub stat: StatType,
    pub line: f64,
    pub projection: f64,
    pub edge: f64,
    pub probability_over: f64,
    pub recommendation: Recommendation,
    pub posture: RiskPosture,
}

/// Compose the explanation text for one pick.
pub fn compose(player: &PlayerRecord, figures: &PickFigures) -> String {
    let mut text = String::with_capacity(480);
    let stat = figures.stat;

    // Averages and projection vs line
    let direction = if figures.projection > figures.line { "over" } else { "under" };
    let _ = write!(
        text,
        "{} ({} {}) averages about {:.1} {stat} per map over ~{} maps in this window. \
         Our projection for this slate is {:.1} {stat}, against a line of {:.1}, \
         leaning {direction} by {:.1}.",
        player.handle,
        player.team,
        player.role,
        player.per_map(stat),
        player.maps_played,
        figures.projection,
        figures.line,
        (figures.projection - figures.line).abs(),
    );

    // Rating/KAST consistency context
    let consistency = if player.kast >= HIGH_CONSISTENCY_KAST {
        "high consistency"
    } else {
        "some volatility"
    };
    let _ = write!(
        text,
        " Their rating is {:.2} with KAST {:.2}, suggesting {consistency}.",
        player.rating, player.kast,
    );

    // Implied probability of the leaned side
    let over_pct = figures.probability_over * 100.0;
    match figures.recommendation {
        Recommendation::LeanOver => {
            let _ = write!(
                text,
                " Interpreting the edge as a rough z-score, this corresponds to about \
                 {over_pct:.0}% chance to go over the line."
            );
        }
        Recommendation::LeanUnder => {
            let _ = write!(
                text,
                " Interpreting the edge as a rough z-score, this implies about \
                 {:.0}% chance to stay under.",
                100.0 - over_pct,
            );
        }
        Recommendation::StayAway => {
            text.push_str(
                " The edge is small in either direction, so this looks close to a coin flip \
                 under our assumptions.",
            );
        }
    }

    let _ = write!(
        text,
        " Under a **{}** risk profile, we categorize this as **{}**, with an edge of {:.2} \
         and that implied probability.",
        figures.posture.profile_label(),
        figures.recommendation,
        figures.edge,
    );

    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
