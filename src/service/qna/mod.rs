//! Question-answering service.
//!
//! Defines the `GenericQnaClient` trait that looks up canned answers for a turn's text,
//! with a default implementation backed by a QnA Maker knowledge base.

pub mod qnamaker;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{QnaAnswer, Res};

// Traits.

/// Generic question-answering trait that clients must implement.
#[async_trait]
pub trait GenericQnaClient: Send + Sync + 'static {
    /// Get the answers for `text`, best first.
    ///
    /// An empty list means the knowledge base has nothing relevant.
    async fn get_answers(&self, text: &str) -> Res<Vec<QnaAnswer>>;
}

// Structs.

/// Question-answering client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct QnaClient {
    inner: Arc<dyn GenericQnaClient>,
}

impl Deref for QnaClient {
    type Target = dyn GenericQnaClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl QnaClient {
    pub fn new(inner: Arc<dyn GenericQnaClient>) -> Self {
        Self { inner }
    }
}
