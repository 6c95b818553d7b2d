//! Shared result aliases and collaborator data types.

use serde::{Deserialize, Serialize};

/// Application-level error.
pub type Err = anyhow::Error;
/// Application-level result.
pub type Res<T> = Result<T, Err>;
/// Application-level result with no value.
pub type Void = Res<()>;

/// A classified user-request category with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Opaque intent name, as emitted by the recognizer.
    pub name: String,
    /// Recognizer confidence; only used to pick the top entry.
    pub confidence: f64,
}

impl Intent {
    /// Create a new intent.
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self { name: name.into(), confidence }
    }
}

/// The recognizer's view of a single turn.
///
/// `connected_intent` is populated when the top intent is a dispatch category that
/// delegates to a child model (e.g., the statistics model), and holds that child
/// model's own top-scoring intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerResult {
    /// Highest-scoring intent of the dispatch model.
    pub top_intent: Intent,
    /// Highest-scoring intent of the child model the dispatch intent points to, if any.
    pub connected_intent: Option<Intent>,
}

impl RecognizerResult {
    /// Create a result with only a top intent.
    pub fn new(top_intent: Intent) -> Self {
        Self { top_intent, connected_intent: None }
    }

    /// Create a result whose top intent delegated to a child model.
    pub fn with_connected(top_intent: Intent, connected_intent: Intent) -> Self {
        Self {
            top_intent,
            connected_intent: Some(connected_intent),
        }
    }
}

/// One canned answer returned by the question-answering service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QnaAnswer {
    /// Answer text, relayed verbatim.
    pub answer: String,
    /// Service-specific relevance score; higher is better.
    pub score: f64,
}
