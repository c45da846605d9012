//! Player stats ingestion.
//!
//! Defines the `StatsSource` trait the slate service depends on and the
//! vlrggapi-backed implementation. Sources hand back fully validated
//! `PlayerRecord`s; the scoring engine never sees raw API rows.

pub mod vlr;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{PlayerRecord, ValcoachError};

/// Regions the stats API understands.
pub const REGIONS: &[&str] = &["na", "eu", "ap", "br", "latam", "kr", "cn"];

/// Look-back windows the stats API understands (days, or "all").
pub const TIMESPANS: &[&str] = &["30", "90", "all"];

/// Which slice of the stats pool to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsQuery {
    pub region: String,
    pub timespan: String,
}

impl StatsQuery {
    /// Build a query, rejecting regions or timespans the API doesn't serve.
    pub fn new(region: &str, timespan: &str) -> Result<Self, ValcoachError> {
        let region = region.trim().to_lowercase();
        let timespan = timespan.trim().to_lowercase();

        if !REGIONS.contains(&region.as_str()) {
            return Err(ValcoachError::UnknownValue { kind: "region", value: region });
        }
        if !TIMESPANS.contains(&timespan.as_str()) {
            return Err(ValcoachError::UnknownValue { kind: "timespan", value: timespan });
        }

        Ok(Self { region, timespan })
    }
}

impl Default for StatsQuery {
    fn default() -> Self {
        Self {
            region: "na".to_string(),
            timespan: "30".to_string(),
        }
    }
}

/// Abstraction over player stats providers.
///
/// Injected into the slate service so the engine can be exercised against
/// in-memory data without any network access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch and normalise the player pool for a region/timespan.
    async fn fetch_players(&self, query: &StatsQuery) -> Result<Vec<PlayerRecord>>;
}
