pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::{base::types::Void, runtime::Runtime};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the transport boundary: receiving turns from a chat platform
/// like Slack and delivering the single reply produced for each of them.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform, which is used to
    /// detect mentions and to avoid welcoming the bot itself.
    fn bot_user_id(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This sets up event listeners for the chat platform and hands incoming messages and
    /// channel joins to `runtime` until the process is asked to stop.
    async fn start(&self, runtime: Runtime) -> Void;

    /// Send a message to a channel, optionally inside a thread.
    async fn send_message(&self, channel_id: &str, thread_ts: Option<&str>, text: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
