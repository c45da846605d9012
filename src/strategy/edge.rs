//! Edge scoring and classification.
//!
//! Turns (projection, line, spread) into a z-score style edge, converts
//! it to a bounded probability of going over, and classifies it into a
//! recommendation (posture dependent) and a confidence tier (posture
//! independent).

use std::f64::consts::SQRT_2;

use crate::types::{Confidence, Recommendation, RiskPosture, StatType};

use super::projection::MIN_SPREAD;

/// P(over) is never reported outside this band.
pub const MIN_PROBABILITY: f64 = 0.01;
pub const MAX_PROBABILITY: f64 = 0.99;

/// |edge| at or above which confidence is High.
const HIGH_CONFIDENCE_EDGE: f64 = 1.5;
/// |edge| at or above which confidence is Medium.
const MEDIUM_CONFIDENCE_EDGE: f64 = 0.8;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Minimum |edge| needed to lean, per stat, for one risk posture.
/// Kills always need a bigger edge than assists (wider spread).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureThresholds {
    pub kills: f64,
    pub assists: f64,
}

impl PostureThresholds {
    pub fn for_posture(posture: RiskPosture) -> Self {
        match posture {
            RiskPosture::Safe => Self { kills: 1.0, assists: 0.9 },
            RiskPosture::Standard => Self { kills: 0.7, assists: 0.6 },
            RiskPosture::Yolo => Self { kills: 0.4, assists: 0.35 },
        }
    }

    /// Get the threshold for a given stat.
    pub fn threshold_for(&self, stat: StatType) -> f64 {
        match stat {
            StatType::Kills => self.kills,
            StatType::Assists => self.assists,
        }
    }
}

// ---------------------------------------------------------------------------
// Edge & probability
// ---------------------------------------------------------------------------

/// Edge as a rough z-score: `(projection - line) / spread`.
///
/// A non-positive (or NaN) spread is replaced by the spread floor.
pub fn edge_score(projection: f64, line: f64, spread: f64) -> f64 {
    let spread = if spread > 0.0 { spread } else { MIN_SPREAD };
    (projection - line) / spread
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + libm::erf(z / SQRT_2))
}

/// Probability of going over the line, clamped to [0.01, 0.99].
pub fn probability_over(edge: f64) -> f64 {
    normal_cdf(edge).clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Lean over/under when |edge| meets the posture's threshold for the stat.
pub fn recommend(edge: f64, posture: RiskPosture, stat: StatType) -> Recommendation {
    let threshold = PostureThresholds::for_posture(posture).threshold_for(stat);
    if edge >= threshold {
        Recommendation::LeanOver
    } else if edge <= -threshold {
        Recommendation::LeanUnder
    } else {
        Recommendation::StayAway
    }
}

/// Confidence tier from edge magnitude alone.
pub fn confidence(edge: f64) -> Confidence {
    let magnitude = edge.abs();
    if magnitude >= HIGH_CONFIDENCE_EDGE {
        Confidence::High
    } else if magnitude >= MEDIUM_CONFIDENCE_EDGE {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
