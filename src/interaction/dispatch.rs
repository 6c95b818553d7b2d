//! Intent dispatch: turns one message into exactly one reply.
//!
//! A turn is classified by the recognizer and routed on its top-scoring intent:
//! - an intent naming a registered location, or the statistics dispatch category with a
//!   connected intent naming one, goes to the statistics pipeline
//!   (fetch, resolve by name, format);
//! - the question-answering dispatch category goes to the QnA service;
//! - anything else gets the fixed "unrecognized" reply.
//!
//! Every failure along the way is converted into a user-visible reply; nothing escapes
//! [`Dispatcher::handle_turn`].

use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};

use crate::{
    base::{config::Config, types::RecognizerResult},
    service::{covid::StatsClient, nlu::Recognizer, qna::QnaClient},
    stats::{
        StatsError, format,
        registry::{self, Location},
        resolver,
    },
};

// Types.

/// Where a classified turn is sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route<'a> {
    /// Live statistics for a registered location.
    Stats(&'static Location),
    /// Canned answers from the question-answering service.
    Qna,
    /// The statistics model was selected, but its intent names no known location.
    UnknownStats(&'a str),
    /// Neither a location nor a dispatch category.
    Unknown(&'a str),
}

/// Why a turn did not produce its primary answer.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("unrecognized intent `{0}`")]
    UnrecognizedIntent(String),

    #[error("unrecognized statistics intent `{0}`")]
    UnrecognizedStatsIntent(String),

    #[error("{0}")]
    NotFound(StatsError),

    #[error("{0}")]
    Fetch(StatsError),

    #[error("the question-answering service returned no answers")]
    QnaNoAnswer,

    #[error("collaborator failed: {0}")]
    Collaborator(anyhow::Error),

    #[error("turn did not complete within {0:?}")]
    TimedOut(Duration),
}

impl From<StatsError> for TurnError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::NotFound(..) => TurnError::NotFound(err),
            _ => TurnError::Fetch(err),
        }
    }
}

impl TurnError {
    /// The reply the user sees for this failure.
    pub fn reply<'c>(&self, config: &'c Config) -> &'c str {
        match self {
            TurnError::UnrecognizedIntent(_) => &config.unrecognized_message,
            TurnError::UnrecognizedStatsIntent(_) => &config.unrecognized_stats_message,
            TurnError::NotFound(_) => &config.data_unavailable_message,
            TurnError::Fetch(_) | TurnError::TimedOut(_) => &config.fetch_error_message,
            TurnError::QnaNoAnswer => &config.qna_no_answer_message,
            TurnError::Collaborator(_) => &config.service_error_message,
        }
    }

    fn log(&self) {
        match self {
            TurnError::UnrecognizedIntent(_) | TurnError::UnrecognizedStatsIntent(_) | TurnError::QnaNoAnswer => info!("{}", self),
            TurnError::NotFound(_) => warn!("{}", self),
            TurnError::Fetch(_) | TurnError::Collaborator(_) | TurnError::TimedOut(_) => error!("{}", self),
        }
    }
}

// Structs.

/// Routes turns to the right collaborator and assembles the reply.
///
/// This is trivially cloneable; every collaborator is a shared handle.
#[derive(Clone)]
pub struct Dispatcher {
    config: Config,
    recognizer: Recognizer,
    qna: QnaClient,
    stats: StatsClient,
}

impl Dispatcher {
    pub fn new(config: Config, recognizer: Recognizer, qna: QnaClient, stats: StatsClient) -> Self {
        Self { config, recognizer, qna, stats }
    }

    /// Decide where a recognized turn goes.
    pub fn route<'a>(&self, result: &'a RecognizerResult) -> Route<'a> {
        let top = result.top_intent.name.as_str();

        if let Some(location) = registry::lookup(top) {
            return Route::Stats(location);
        }

        if top == self.config.stats_category {
            let connected = result.connected_intent.as_ref().map(|i| i.name.as_str()).unwrap_or_default();

            return match registry::lookup(connected) {
                Some(location) => Route::Stats(location),
                None => Route::UnknownStats(connected),
            };
        }

        if top == self.config.qna_category {
            return Route::Qna;
        }

        Route::Unknown(top)
    }

    /// Handle one turn and produce its reply.
    ///
    /// The turn is bounded by the configured turn timeout. Failures are logged and mapped to
    /// their reply text.
    #[instrument(skip_all)]
    pub async fn handle_turn(&self, text: &str) -> String {
        let limit = self.config.turn_timeout();

        let outcome = match timeout(limit, self.run_turn(text)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TurnError::TimedOut(limit)),
        };

        match outcome {
            Ok(reply) => reply,
            Err(err) => {
                err.log();
                err.reply(&self.config).to_string()
            }
        }
    }

    /// Handle one turn unless `cancelled` completes first.
    ///
    /// Returns `None` when the turn was abandoned; any in-flight request is dropped with it.
    pub async fn handle_turn_until<F>(&self, text: &str, cancelled: F) -> Option<String>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            reply = self.handle_turn(text) => Some(reply),
            _ = cancelled => {
                warn!("Turn abandoned before a reply was produced.");
                None
            }
        }
    }

    async fn run_turn(&self, text: &str) -> Result<String, TurnError> {
        let result = self.recognizer.recognize(text).await.map_err(TurnError::Collaborator)?;

        info!("Top intent `{}` ({:.2})", result.top_intent.name, result.top_intent.confidence);

        match self.route(&result) {
            Route::Stats(location) => self.stats_reply(location).await,
            Route::Qna => self.qna_reply(text).await,
            Route::UnknownStats(intent) => Err(TurnError::UnrecognizedStatsIntent(intent.to_string())),
            Route::Unknown(intent) => Err(TurnError::UnrecognizedIntent(intent.to_string())),
        }
    }

    #[instrument(skip_all, fields(key = %location.key))]
    async fn stats_reply(&self, location: &'static Location) -> Result<String, TurnError> {
        let collection = self.stats.fetch(location.source).await?;
        let record = resolver::resolve(&collection, location.key)?;

        Ok(format::format(record))
    }

    #[instrument(skip_all)]
    async fn qna_reply(&self, text: &str) -> Result<String, TurnError> {
        let answers = self.qna.get_answers(text).await.map_err(TurnError::Collaborator)?;

        answers.into_iter().next().map(|a| a.answer).ok_or(TurnError::QnaNoAnswer)
    }
}

// Tests.
