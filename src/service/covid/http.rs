//! HTTP implementation of the statistics client.
//!
//! Talks to two public JSON APIs:
//! - a global summary (`{"Global": {...}, "Countries": [...]}`) keyed by `Country`,
//! - a US state list (`[{"state": ..., "cases": ...}]`) keyed by `state`.
//!
//! Every attempt is bounded by the configured timeout. Transient failures may be retried once,
//! and a fetched collection may be reused for a configurable freshness window.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_with::{DefaultOnNull, serde_as};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::{
    base::{config::Config, types::Res},
    stats::{StatsCollection, StatsError, StatsRecord, StatsSource, registry::GLOBAL_RECORD_NAME},
};

use super::{GenericStatsClient, StatsClient};

// Extra methods on `StatsClient` applied by the http implementation.

impl StatsClient {
    /// Creates a new HTTP statistics client.
    pub fn http(config: &Config) -> Res<Self> {
        let client = HttpStatsClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Cache.

/// An immutable, timestamped collection.
struct Snapshot {
    fetched_at: Instant,
    collection: Arc<StatsCollection>,
}

/// Holds the most recent snapshot for one source.
///
/// Readers clone the `Arc` out of the slot; a refresh swaps in a whole new snapshot.
#[derive(Default)]
struct SnapshotCache {
    slot: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotCache {
    fn fresh(&self, ttl: Duration) -> Option<Arc<StatsCollection>> {
        if ttl.is_zero() {
            return None;
        }

        let snapshot = self.slot.read().clone()?;

        (snapshot.fetched_at.elapsed() < ttl).then(|| snapshot.collection.clone())
    }

    fn store(&self, collection: Arc<StatsCollection>) {
        let snapshot = Arc::new(Snapshot {
            fetched_at: Instant::now(),
            collection,
        });

        *self.slot.write() = Some(snapshot);
    }
}

// Specific implementations.

/// HTTP statistics client implementation.
pub struct HttpStatsClient {
    client: reqwest::Client,
    global_summary_url: String,
    us_states_url: String,
    timeout: Duration,
    retries: u32,
    cache_ttl: Duration,
    global_cache: SnapshotCache,
    states_cache: SnapshotCache,
}

impl HttpStatsClient {
    /// Create a new HTTP statistics client.
    #[instrument(name = "HttpStatsClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.stats_timeout())
            .user_agent(concat!("covid-bot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            global_summary_url: config.global_summary_url.clone(),
            us_states_url: config.us_states_url.clone(),
            timeout: config.stats_timeout(),
            retries: config.stats_retries,
            cache_ttl: config.stats_cache_ttl(),
            global_cache: SnapshotCache::default(),
            states_cache: SnapshotCache::default(),
        })
    }

    fn url(&self, source: StatsSource) -> &str {
        match source {
            StatsSource::GlobalSummary => &self.global_summary_url,
            StatsSource::UsStates => &self.us_states_url,
        }
    }

    fn cache(&self, source: StatsSource) -> &SnapshotCache {
        match source {
            StatsSource::GlobalSummary => &self.global_cache,
            StatsSource::UsStates => &self.states_cache,
        }
    }

    /// Serve from cache when fresh; otherwise fetch and replace the snapshot.
    #[instrument(name = "HttpStatsClient::fetch", skip(self))]
    async fn fetch(&self, source: StatsSource) -> Result<Arc<StatsCollection>, StatsError> {
        let cache = self.cache(source);

        if let Some(collection) = cache.fresh(self.cache_ttl) {
            debug!("Serving {} from cache.", source);
            return Ok(collection);
        }

        let collection = Arc::new(self.fetch_with_retry(source).await?);
        cache.store(collection.clone());

        Ok(collection)
    }

    async fn fetch_with_retry(&self, source: StatsSource) -> Result<StatsCollection, StatsError> {
        let mut attempt = 0;

        loop {
            match self.fetch_once(source).await {
                Ok(collection) => {
                    info!("Fetched {} records from the {} API after {} attempts", collection.records.len(), source, attempt + 1);
                    return Ok(collection);
                }
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!("Stats request failed, retrying {attempt}/{}: {err}", self.retries);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, source: StatsSource) -> Result<StatsCollection, StatsError> {
        let url = self.url(source);

        let request = async {
            let response = self.client.get(url).send().await.map_err(|e| self.request_error(source, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(StatsError::Status(source, status.as_u16()));
            }

            response.text().await.map_err(|e| self.request_error(source, e))
        };

        let body = timeout(self.timeout, request).await.map_err(|_| StatsError::Timeout(source, self.timeout))??;

        parse_collection(source, &body)
    }

    fn request_error(&self, source: StatsSource, err: reqwest::Error) -> StatsError {
        if err.is_timeout() {
            StatsError::Timeout(source, self.timeout)
        } else {
            StatsError::Network(source, err.to_string())
        }
    }
}

#[async_trait]
impl GenericStatsClient for HttpStatsClient {
    async fn fetch_global_summary(&self) -> Result<Arc<StatsCollection>, StatsError> {
        self.fetch(StatsSource::GlobalSummary).await
    }

    async fn fetch_us_states(&self) -> Result<Arc<StatsCollection>, StatsError> {
        self.fetch(StatsSource::UsStates).await
    }
}

// Payloads.

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryTotals {
    total_confirmed: u64,
    total_deaths: u64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    total_recovered: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryCountry {
    country: String,
    #[serde(flatten)]
    totals: SummaryTotals,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryPayload {
    global: SummaryTotals,
    countries: Vec<SummaryCountry>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct StatePayload {
    #[serde(alias = "State")]
    state: String,
    #[serde(alias = "Cases")]
    cases: u64,
    #[serde(alias = "Deaths")]
    deaths: u64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Recovered")]
    recovered: u64,
}

/// Parse a response body from `source` into a collection.
///
/// The global summary's aggregate becomes a record named [`GLOBAL_RECORD_NAME`].
fn parse_collection(source: StatsSource, body: &str) -> Result<StatsCollection, StatsError> {
    let parse_error = |e: serde_json::Error| StatsError::Parse(source, e.to_string());

    let records = match source {
        StatsSource::GlobalSummary => {
            let payload: SummaryPayload = serde_json::from_str(body).map_err(parse_error)?;

            std::iter::once(StatsRecord::new(
                GLOBAL_RECORD_NAME,
                payload.global.total_confirmed,
                payload.global.total_deaths,
                payload.global.total_recovered,
            ))
            .chain(
                payload
                    .countries
                    .into_iter()
                    .map(|c| StatsRecord::new(c.country, c.totals.total_confirmed, c.totals.total_deaths, c.totals.total_recovered)),
            )
            .collect()
        }
        StatsSource::UsStates => {
            let payload: Vec<StatePayload> = serde_json::from_str(body).map_err(parse_error)?;

            payload.into_iter().map(|s| StatsRecord::new(s.state, s.cases, s.deaths, s.recovered)).collect()
        }
    };

    Ok(StatsCollection::new(source, records))
}

// Tests.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;
    use crate::base::config::ConfigInner;

    /// A canned HTTP response served by the stub server.
    #[derive(Clone)]
    struct Stub {
        status: u16,
        body: String,
        delay: Duration,
    }

    impl Stub {
        fn ok(body: impl ToString) -> Self {
            Self {
                status: 200,
                body: body.to_string(),
                delay: Duration::ZERO,
            }
        }

        fn status(status: u16) -> Self {
            Self {
                status,
                body: "{}".to_string(),
                delay: Duration::ZERO,
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    /// Serve `stubs` in order (repeating the last one) and count the requests.
    async fn serve(stubs: Vec<Stub>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let stub = stubs[n.min(stubs.len() - 1)].clone();

                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];

                    while let Ok(read) = socket.read(&mut buf).await {
                        if read == 0 {
                            break;
                        }
                        request.extend_from_slice(&buf[..read]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    tokio::time::sleep(stub.delay).await;

                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        stub.status,
                        stub.body.len(),
                        stub.body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (base, hits)
    }

    fn create_test_config(base: &str, f: impl FnOnce(&mut ConfigInner)) -> Config {
        let mut inner = ConfigInner {
            global_summary_url: format!("{base}/summary"),
            us_states_url: format!("{base}/states"),
            stats_timeout_ms: 500,
            ..Default::default()
        };
        f(&mut inner);

        Config { inner: Arc::new(inner) }
    }

    fn summary_body() -> String {
        json!({
            "Global": { "TotalConfirmed": 1000, "TotalDeaths": 50, "TotalRecovered": 600 },
            "Countries": [
                { "Country": "Afghanistan", "CountryCode": "AF", "TotalConfirmed": 10, "TotalDeaths": 1, "TotalRecovered": 5 },
                { "Country": "India", "CountryCode": "IN", "TotalConfirmed": 300, "TotalDeaths": 20, "TotalRecovered": 200 },
            ]
        })
        .to_string()
    }

    fn states_body() -> String {
        json!([
            { "state": "California", "cases": 500, "deaths": 9, "recovered": 100, "todayCases": 3 },
            { "state": "Texas", "cases": 400, "deaths": 8, "recovered": null },
        ])
        .to_string()
    }

    #[test]
    fn test_parse_global_summary_includes_aggregate() {
        let collection = parse_collection(StatsSource::GlobalSummary, &summary_body()).unwrap();

        assert_eq!(collection.source, StatsSource::GlobalSummary);
        assert_eq!(collection.records.len(), 3);
        assert_eq!(collection.records[0], StatsRecord::new(GLOBAL_RECORD_NAME, 1000, 50, 600));
        assert_eq!(collection.records[2], StatsRecord::new("India", 300, 20, 200));
    }

    #[test]
    fn test_parse_states_accepts_both_spellings_and_null_recovered() {
        let collection = parse_collection(StatsSource::UsStates, &states_body()).unwrap();
        assert_eq!(collection.records[1], StatsRecord::new("Texas", 400, 8, 0));

        let body = json!([{ "State": "Ohio", "Cases": 7, "Deaths": 1, "Recovered": 2 }]).to_string();
        let collection = parse_collection(StatsSource::UsStates, &body).unwrap();
        assert_eq!(collection.records[0], StatsRecord::new("Ohio", 7, 1, 2));
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        assert!(matches!(parse_collection(StatsSource::GlobalSummary, "not json"), Err(StatsError::Parse(..))));
        assert!(matches!(
            parse_collection(StatsSource::GlobalSummary, r#"{"Message": "Caching in progress"}"#),
            Err(StatsError::Parse(..))
        ));
        assert!(matches!(
            parse_collection(StatsSource::UsStates, r#"[{"state": "Ohio", "cases": -1, "deaths": 0}]"#),
            Err(StatsError::Parse(..))
        ));
    }

    #[tokio::test]
    async fn test_fetch_both_sources() {
        let (base, _) = serve(vec![Stub::ok(summary_body())]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |_| {})).unwrap();
        let global = client.fetch_global_summary().await.unwrap();
        assert_eq!(global.records.len(), 3);

        let (base, _) = serve(vec![Stub::ok(states_body())]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |_| {})).unwrap();
        let states = client.fetch_us_states().await.unwrap();
        assert_eq!(states.source, StatsSource::UsStates);
        assert_eq!(states.records[0].location_name, "California");
    }

    #[tokio::test]
    async fn test_timeout_is_reported_distinctly() {
        let (base, _) = serve(vec![Stub::ok(summary_body()).delayed(Duration::from_secs(5))]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |c| c.stats_timeout_ms = 100)).unwrap();

        let started = Instant::now();
        let result = client.fetch_global_summary().await;

        assert!(matches!(result, Err(StatsError::Timeout(StatsSource::GlobalSummary, _))), "{result:?}");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (base, _) = serve(vec![Stub::status(404)]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |_| {})).unwrap();

        assert!(matches!(client.fetch_us_states().await, Err(StatsError::Status(StatsSource::UsStates, 404))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = HttpStatsClient::new(&create_test_config(&base, |_| {})).unwrap();

        assert!(matches!(client.fetch_global_summary().await, Err(StatsError::Network(..))));
    }

    #[tokio::test]
    async fn test_single_retry_recovers_transient_failure() {
        let (base, hits) = serve(vec![Stub::status(503), Stub::ok(states_body())]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |c| c.stats_retries = 1)).unwrap();

        let states = client.fetch_us_states().await.unwrap();

        assert_eq!(states.records.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let (base, hits) = serve(vec![Stub::status(503), Stub::ok(states_body())]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |_| {})).unwrap();

        assert!(client.fetch_us_states().await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parse_errors_are_not_retried() {
        let (base, hits) = serve(vec![Stub::ok("garbage")]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |c| c.stats_retries = 1)).unwrap();

        assert!(matches!(client.fetch_global_summary().await, Err(StatsError::Parse(..))));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_serves_within_freshness_window() {
        let (base, hits) = serve(vec![Stub::ok(summary_body())]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |c| c.stats_cache_ttl_secs = 60)).unwrap();

        let first = client.fetch_global_summary().await.unwrap();
        let second = client.fetch_global_summary().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_call_is_fresh_without_cache() {
        let (base, hits) = serve(vec![Stub::ok(summary_body())]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |_| {})).unwrap();

        client.fetch_global_summary().await.unwrap();
        client.fetch_global_summary().await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_turns_share_the_cached_snapshot() {
        let (base, hits) = serve(vec![Stub::ok(states_body())]).await;
        let client = Arc::new(HttpStatsClient::new(&create_test_config(&base, |c| c.stats_cache_ttl_secs = 60)).unwrap());

        let warm = client.fetch_us_states().await.unwrap();

        let results = futures::future::join_all((0..8).map(|_| {
            let client = client.clone();
            async move { client.fetch_us_states().await.unwrap() }
        }))
        .await;

        assert!(results.iter().all(|r| Arc::ptr_eq(r, &warm)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_snapshot_cache_freshness() {
        let cache = SnapshotCache::default();
        let collection = Arc::new(StatsCollection::new(StatsSource::UsStates, vec![StatsRecord::new("Ohio", 7, 1, 2)]));

        assert!(cache.fresh(Duration::from_secs(60)).is_none());

        cache.store(collection.clone());

        assert!(Arc::ptr_eq(&cache.fresh(Duration::from_secs(60)).unwrap(), &collection));
        assert!(cache.fresh(Duration::ZERO).is_none());

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.fresh(Duration::from_millis(5)).is_none());
    }

    #[test]
    fn test_snapshot_cache_store_replaces_previous() {
        let cache = SnapshotCache::default();
        let first = Arc::new(StatsCollection::new(StatsSource::UsStates, vec![]));
        let second = Arc::new(StatsCollection::new(StatsSource::UsStates, vec![StatsRecord::new("Ohio", 7, 1, 2)]));

        cache.store(first);
        cache.store(second.clone());

        assert!(Arc::ptr_eq(&cache.fresh(Duration::from_secs(60)).unwrap(), &second));
    }

    #[tokio::test]
    async fn test_sources_are_cached_independently() {
        let (base, hits) = serve(vec![Stub::ok(summary_body()), Stub::ok(states_body())]).await;
        let client = HttpStatsClient::new(&create_test_config(&base, |c| c.stats_cache_ttl_secs = 60)).unwrap();

        let global = client.fetch_global_summary().await.unwrap();
        let states = client.fetch_us_states().await.unwrap();

        assert_eq!(global.source, StatsSource::GlobalSummary);
        assert_eq!(states.source, StatsSource::UsStates);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
