//! Per-map projections, synthetic lines and spreads.
//!
//! All three are pure functions of a player record and a stat type. The
//! line comes from the raw baseline only, never from the projection.

use crate::types::{PlayerRecord, StatType};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Rating of a notional average player.
const BASELINE_RATING: f64 = 1.0;
/// KAST of a notional average player.
const BASELINE_KAST: f64 = 0.72;

/// Lowest line ever synthesized for assists.
const MIN_ASSIST_LINE: f64 = 0.5;

/// Largest fractional shrink applied to a perfectly consistent player's spread.
const CONSISTENCY_SHRINK: f64 = 0.3;
/// Spread floor, keeps the edge denominator away from zero.
pub const MIN_SPREAD: f64 = 0.5;

/// Sensitivity of a stat to rating and KAST deviations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub rating: f64,
    pub kast: f64,
}

impl Coefficients {
    /// Kills move more with skill and consistency than assists do.
    pub fn for_stat(stat: StatType) -> Self {
        match stat {
            StatType::Kills => Self { rating: 4.0, kast: 10.0 },
            StatType::Assists => Self { rating: 2.5, kast: 6.0 },
        }
    }
}

/// Typical per-map variation before the consistency shrink.
fn base_spread(stat: StatType) -> f64 {
    match stat {
        StatType::Kills => 3.0,
        StatType::Assists => 2.0,
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Projected per-map value for a stat, never negative.
///
/// projection = base + kα·(rating − 1.0) + kβ·(KAST − 0.72)
pub fn project(player: &PlayerRecord, stat: StatType) -> f64 {
    let k = Coefficients::for_stat(stat);
    let rating_dev = player.rating - BASELINE_RATING;
    let kast_dev = player.kast - BASELINE_KAST;

    let projection = player.per_map(stat) + k.rating * rating_dev + k.kast * kast_dev;
    projection.max(0.0)
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// Synthesize a half-point prop line from the baseline rate.
///
/// Kills: nearest integer + 0.5. Assists: nearest integer − 0.5, at least
/// 0.5. Exact `.5` baselines round to the even integer.
pub fn synthesize_line(player: &PlayerRecord, stat: StatType) -> f64 {
    let rounded = player.per_map(stat).round_ties_even();
    match stat {
        StatType::Kills => rounded + 0.5,
        StatType::Assists => (rounded - 0.5).max(MIN_ASSIST_LINE),
    }
}

// ---------------------------------------------------------------------------
// Spread
// ---------------------------------------------------------------------------

/// Standard-deviation-like uncertainty for a stat, in stat units.
pub fn spread(player: &PlayerRecord, stat: StatType) -> f64 {
    let shrunk = base_spread(stat) * (1.0 - CONSISTENCY_SHRINK * player.consistency);
    shrunk.max(MIN_SPREAD)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
