//! Location statistics: what a location is, where its numbers come from, and how they are rendered.
//!
//! - [`registry`] maps recognizer intents to stable location keys.
//! - [`resolver`] finds a location's record in a fetched collection by name.
//! - [`format`] turns a record into reply text.

pub mod format;
pub mod registry;
pub mod resolver;

use std::{fmt, time::Duration};

use thiserror::Error;

// Types.

/// The external collection a location's numbers live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsSource {
    /// Per-country summary, including the `Global` aggregate.
    GlobalSummary,
    /// Per-state list for the United States and its territories.
    UsStates,
}

impl fmt::Display for StatsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsSource::GlobalSummary => f.write_str("global summary"),
            StatsSource::UsStates => f.write_str("US states"),
        }
    }
}

/// One location's counts as reported by an external source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRecord {
    pub location_name: String,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

impl StatsRecord {
    pub fn new(location_name: impl Into<String>, confirmed: u64, deaths: u64, recovered: u64) -> Self {
        Self {
            location_name: location_name.into(),
            confirmed,
            deaths,
            recovered,
        }
    }
}

/// All records fetched from one source in a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsCollection {
    pub source: StatsSource,
    pub records: Vec<StatsRecord>,
}

impl StatsCollection {
    pub fn new(source: StatsSource, records: Vec<StatsRecord>) -> Self {
        Self { source, records }
    }
}

// Errors.

/// Failures while fetching or resolving statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("request to the {0} API timed out after {1:?}")]
    Timeout(StatsSource, Duration),

    #[error("request to the {0} API failed: {1}")]
    Network(StatsSource, String),

    #[error("the {0} API responded with HTTP {1}")]
    Status(StatsSource, u16),

    #[error("malformed payload from the {0} API: {1}")]
    Parse(StatsSource, String),

    #[error("no unique record for `{0}` in the {1} collection")]
    NotFound(String, StatsSource),
}

impl StatsError {
    /// Whether a retry could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StatsError::Timeout(..) | StatsError::Network(..) => true,
            StatsError::Status(_, code) => *code >= 500,
            StatsError::Parse(..) | StatsError::NotFound(..) => false,
        }
    }
}
