//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use serde::Deserialize;

use crate::base::replies;

use super::types::Res;

/// Default top-level dispatch intent that selects the statistics model.
fn default_stats_category() -> String {
    "l_covid19".to_string()
}

/// Default top-level dispatch intent that selects the question-answering service.
fn default_qna_category() -> String {
    "q_covid19".to_string()
}

/// Default endpoint for the global (per-country) summary.
fn default_global_summary_url() -> String {
    "https://api.covid19api.com/summary".to_string()
}

/// Default endpoint for the US state list.
fn default_us_states_url() -> String {
    "https://disease.sh/v3/covid-19/states".to_string()
}

/// Default timeout for a single statistics request, in milliseconds.
fn default_stats_timeout_ms() -> u64 {
    5_000
}

/// Default timeout for a whole turn, in milliseconds.
fn default_turn_timeout_ms() -> u64 {
    15_000
}

/// Default number of answers requested from the question-answering service.
fn default_qna_top() -> u32 {
    3
}

fn default_welcome_message() -> String {
    replies::WELCOME_MESSAGE.to_string()
}

fn default_unrecognized_message() -> String {
    replies::UNRECOGNIZED_MESSAGE.to_string()
}

fn default_unrecognized_stats_message() -> String {
    replies::UNRECOGNIZED_STATS_MESSAGE.to_string()
}

fn default_qna_no_answer_message() -> String {
    replies::QNA_NO_ANSWER_MESSAGE.to_string()
}

fn default_data_unavailable_message() -> String {
    replies::DATA_UNAVAILABLE_MESSAGE.to_string()
}

fn default_fetch_error_message() -> String {
    replies::FETCH_ERROR_MESSAGE.to_string()
}

fn default_service_error_message() -> String {
    replies::SERVICE_ERROR_MESSAGE.to_string()
}

/// Configuration for the covid-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared settings.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inner: Arc::new(ConfigInner::default()),
        }
    }
}

/// The settings themselves; see each field for its environment variable (prefixed with `COVID_BOT_`).
#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Slack app token (`SLACK_APP_TOKEN`).
    #[serde(default)]
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    #[serde(default)]
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    #[serde(default)]
    pub slack_signing_secret: String,
    /// LUIS endpoint, e.g. `https://westus.api.cognitive.microsoft.com` (`LUIS_ENDPOINT`).
    #[serde(default)]
    pub luis_endpoint: String,
    /// LUIS dispatch application ID (`LUIS_APP_ID`).
    #[serde(default)]
    pub luis_app_id: String,
    /// LUIS subscription key (`LUIS_API_KEY`).
    #[serde(default)]
    pub luis_api_key: String,
    /// QnA Maker runtime endpoint, e.g. `https://my-qna.azurewebsites.net` (`QNA_ENDPOINT`).
    #[serde(default)]
    pub qna_endpoint: String,
    /// QnA Maker knowledge base ID (`QNA_KNOWLEDGE_BASE_ID`).
    #[serde(default)]
    pub qna_knowledge_base_id: String,
    /// QnA Maker endpoint key (`QNA_ENDPOINT_KEY`).
    #[serde(default)]
    pub qna_endpoint_key: String,
    /// Number of answers to request from QnA Maker (`QNA_TOP`).
    #[serde(default = "default_qna_top")]
    pub qna_top: u32,
    /// Dispatch intent routed to the statistics model (`STATS_CATEGORY`).
    #[serde(default = "default_stats_category")]
    pub stats_category: String,
    /// Dispatch intent routed to the question-answering service (`QNA_CATEGORY`).
    #[serde(default = "default_qna_category")]
    pub qna_category: String,
    /// Global summary endpoint (`GLOBAL_SUMMARY_URL`).
    #[serde(default = "default_global_summary_url")]
    pub global_summary_url: String,
    /// US states endpoint (`US_STATES_URL`).
    #[serde(default = "default_us_states_url")]
    pub us_states_url: String,
    /// Timeout for a single statistics request in milliseconds (`STATS_TIMEOUT_MS`).
    #[serde(default = "default_stats_timeout_ms")]
    pub stats_timeout_ms: u64,
    /// Retries after a transient statistics failure; 0 or 1 (`STATS_RETRIES`).
    #[serde(default)]
    pub stats_retries: u32,
    /// How long a fetched collection may be reused, in seconds; 0 disables caching (`STATS_CACHE_TTL_SECS`).
    #[serde(default)]
    pub stats_cache_ttl_secs: u64,
    /// Upper bound for handling one turn in milliseconds (`TURN_TIMEOUT_MS`).
    #[serde(default = "default_turn_timeout_ms")]
    pub turn_timeout_ms: u64,
    /// Reply sent to users joining a channel (`WELCOME_MESSAGE`).
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// Reply for intents that match nothing (`UNRECOGNIZED_MESSAGE`).
    #[serde(default = "default_unrecognized_message")]
    pub unrecognized_message: String,
    /// Reply for statistics intents with no known location (`UNRECOGNIZED_STATS_MESSAGE`).
    #[serde(default = "default_unrecognized_stats_message")]
    pub unrecognized_stats_message: String,
    /// Reply when QnA returns nothing (`QNA_NO_ANSWER_MESSAGE`).
    #[serde(default = "default_qna_no_answer_message")]
    pub qna_no_answer_message: String,
    /// Reply when a location is missing from fetched data (`DATA_UNAVAILABLE_MESSAGE`).
    #[serde(default = "default_data_unavailable_message")]
    pub data_unavailable_message: String,
    /// Reply when the statistics service fails (`FETCH_ERROR_MESSAGE`).
    #[serde(default = "default_fetch_error_message")]
    pub fetch_error_message: String,
    /// Reply when the recognizer or QnA service fails (`SERVICE_ERROR_MESSAGE`).
    #[serde(default = "default_service_error_message")]
    pub service_error_message: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            slack_app_token: String::new(),
            slack_bot_token: String::new(),
            slack_signing_secret: String::new(),
            luis_endpoint: String::new(),
            luis_app_id: String::new(),
            luis_api_key: String::new(),
            qna_endpoint: String::new(),
            qna_knowledge_base_id: String::new(),
            qna_endpoint_key: String::new(),
            qna_top: default_qna_top(),
            stats_category: default_stats_category(),
            qna_category: default_qna_category(),
            global_summary_url: default_global_summary_url(),
            us_states_url: default_us_states_url(),
            stats_timeout_ms: default_stats_timeout_ms(),
            stats_retries: 0,
            stats_cache_ttl_secs: 0,
            turn_timeout_ms: default_turn_timeout_ms(),
            welcome_message: default_welcome_message(),
            unrecognized_message: default_unrecognized_message(),
            unrecognized_stats_message: default_unrecognized_stats_message(),
            qna_no_answer_message: default_qna_no_answer_message(),
            data_unavailable_message: default_data_unavailable_message(),
            fetch_error_message: default_fetch_error_message(),
            service_error_message: default_service_error_message(),
        }
    }
}

impl ConfigInner {
    /// Timeout for a single statistics request.
    pub fn stats_timeout(&self) -> Duration {
        Duration::from_millis(self.stats_timeout_ms)
    }

    /// Upper bound for handling one turn.
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }

    /// Freshness window for cached statistics; zero disables caching.
    pub fn stats_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.stats_cache_ttl_secs)
    }
}

impl Config {
    /// Load from the environment and an optional TOML file, then validate.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("COVID_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the bounds that the rest of the application relies on.
    pub fn validate(&self) -> Res<()> {
        if self.stats_timeout_ms == 0 {
            return Err(anyhow::anyhow!("Stats timeout must be greater than 0."));
        }

        if self.stats_retries > 1 {
            return Err(anyhow::anyhow!("Stats retries must be 0 or 1."));
        }

        if self.stats_timeout_ms.saturating_mul(u64::from(1 + self.stats_retries)) > self.turn_timeout_ms {
            return Err(anyhow::anyhow!("Stats timeout (including retries) must not exceed the turn timeout."));
        }

        if self.qna_top < 1 || self.qna_top > 50 {
            return Err(anyhow::anyhow!("QnA top must be between 1 and 50."));
        }

        if self.stats_category == self.qna_category {
            return Err(anyhow::anyhow!("Stats and QnA categories must differ."));
        }

        Ok(())
    }
}

// Tests.
