//! Pandemic statistics service.
//!
//! Defines the `GenericStatsClient` trait for retrieving statistics collections, with a
//! default HTTP implementation against the public COVID-19 APIs.

pub mod http;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::stats::{StatsCollection, StatsError, StatsSource};

// Traits.

/// Generic statistics client trait that clients must implement.
///
/// Collections are handed out as shared snapshots so an implementation may serve the same
/// collection to many concurrent turns without copying it.
#[async_trait]
pub trait GenericStatsClient: Send + Sync + 'static {
    /// Fetch the per-country summary, including the worldwide aggregate.
    async fn fetch_global_summary(&self) -> Result<Arc<StatsCollection>, StatsError>;

    /// Fetch the per-state list for the United States.
    async fn fetch_us_states(&self) -> Result<Arc<StatsCollection>, StatsError>;
}

// Structs.

/// Statistics client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct StatsClient {
    inner: Arc<dyn GenericStatsClient>,
}

impl Deref for StatsClient {
    type Target = dyn GenericStatsClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl StatsClient {
    pub fn new(inner: Arc<dyn GenericStatsClient>) -> Self {
        Self { inner }
    }

    /// Fetch the collection backing `source`.
    pub async fn fetch(&self, source: StatsSource) -> Result<Arc<StatsCollection>, StatsError> {
        match source {
            StatsSource::GlobalSummary => self.fetch_global_summary().await,
            StatsSource::UsStates => self.fetch_us_states().await,
        }
    }
}
