//! Natural-language understanding service.
//!
//! Defines the `GenericRecognizer` trait that classifies a turn's text into intents,
//! with a default implementation backed by a LUIS dispatch application.

pub mod luis;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{RecognizerResult, Res};

// Traits.

/// Generic recognizer trait that clients must implement.
#[async_trait]
pub trait GenericRecognizer: Send + Sync + 'static {
    /// Classify `text`.
    ///
    /// The result carries the single top-scoring intent; ties resolve to whichever the
    /// underlying model ranks first.
    async fn recognize(&self, text: &str) -> Res<RecognizerResult>;
}

// Structs.

/// Recognizer for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Recognizer {
    inner: Arc<dyn GenericRecognizer>,
}

impl Deref for Recognizer {
    type Target = dyn GenericRecognizer;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl Recognizer {
    pub fn new(inner: Arc<dyn GenericRecognizer>) -> Self {
        Self { inner }
    }
}
