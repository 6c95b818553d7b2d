//! LUIS dispatch recognizer.
//!
//! Queries the v2 prediction endpoint with `verbose=true`, so that when the top intent is a
//! dispatch intent the connected child application's result comes back in the same payload.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{Intent, RecognizerResult, Res},
};

use super::{GenericRecognizer, Recognizer};

/// Intent LUIS reports when nothing else applies.
const NONE_INTENT: &str = "None";

// Extra methods on `Recognizer` applied by the LUIS implementation.

impl Recognizer {
    /// Creates a new LUIS recognizer.
    pub fn luis(config: &Config) -> Res<Self> {
        let client = LuisRecognizer::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// LUIS recognizer implementation.
#[derive(Clone)]
pub struct LuisRecognizer {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl LuisRecognizer {
    /// Create a new LUIS recognizer.
    #[instrument(name = "LuisRecognizer::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().timeout(config.turn_timeout()).build()?;

        Ok(Self {
            client,
            url: prediction_url(&config.luis_endpoint, &config.luis_app_id),
            api_key: config.luis_api_key.clone(),
        })
    }
}

#[async_trait]
impl GenericRecognizer for LuisRecognizer {
    #[instrument(name = "LuisRecognizer::recognize", skip_all)]
    async fn recognize(&self, text: &str) -> Res<RecognizerResult> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("verbose", "true"), ("subscription-key", self.api_key.as_str()), ("q", text)])
            .send()
            .await?
            .error_for_status()?;

        let payload: LuisPayload = response.json().await?;
        let result = payload.into_result();

        debug!("Top intent: {} ({:.2})", result.top_intent.name, result.top_intent.confidence);

        Ok(result)
    }
}

// Payloads.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LuisIntent {
    intent: String,
    #[serde(default)]
    score: f64,
}

impl From<LuisIntent> for Intent {
    fn from(value: LuisIntent) -> Self {
        Intent::new(value.intent, value.score)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectedPayload {
    top_scoring_intent: Option<LuisIntent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LuisPayload {
    top_scoring_intent: Option<LuisIntent>,
    connected_service_result: Option<ConnectedPayload>,
}

impl LuisPayload {
    fn into_result(self) -> RecognizerResult {
        let top_intent = self.top_scoring_intent.map(Intent::from).unwrap_or_else(|| Intent::new(NONE_INTENT, 0.0));
        let connected_intent = self.connected_service_result.and_then(|c| c.top_scoring_intent).map(Intent::from);

        RecognizerResult { top_intent, connected_intent }
    }
}

fn prediction_url(endpoint: &str, app_id: &str) -> String {
    format!("{}/luis/v2.0/apps/{}", endpoint.trim_end_matches('/'), app_id)
}

// Tests.
