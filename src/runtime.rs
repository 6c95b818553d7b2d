//! Runtime services and shared state for the covid-bot.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{self, dispatch::Dispatcher},
    service::{chat::ChatClient, covid::StatsClient, nlu::Recognizer, qna::QnaClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the dispatcher (with its recognizer, QnA and
/// statistics clients), the chat client, and the shutdown signal for in-flight turns.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The dispatcher that turns messages into replies.
    pub dispatcher: Dispatcher,
    /// The chat client instance.
    pub chat: ChatClient,
    /// Flips to `true` when the runtime stops; in-flight turns are abandoned.
    pub shutdown: Arc<watch::Sender<bool>>,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the collaborators.
        let recognizer = Recognizer::luis(&config)?;
        let qna = QnaClient::qnamaker(&config)?;
        let stats = StatsClient::http(&config)?;

        // Initialize the dispatcher.
        let dispatcher = Dispatcher::new(config.clone(), recognizer, qna, stats);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            config,
            dispatcher,
            chat,
            shutdown: Arc::new(shutdown),
        })
    }

    /// Run the chat listener until it stops, then abandon any turns still in flight.
    pub async fn start(&self) -> Void {
        let result = self.chat.start(self.clone()).await;

        info!("Chat listener stopped; abandoning in-flight turns ...");
        self.shutdown.send_replace(true);

        result
    }

    /// Handle one chat message as a turn on its own task.
    ///
    /// This is the entry point chat transports use for every incoming message.
    pub fn handle_chat_event(&self, text: impl Into<String>, channel_id: impl Into<String>, thread_ts: Option<String>) -> JoinHandle<()> {
        interaction::chat_event::handle_chat_event(
            text.into(),
            channel_id.into(),
            thread_ts,
            self.dispatcher.clone(),
            self.chat.clone(),
            self.shutdown.subscribe(),
        )
    }

    /// Welcome a user who joined a channel.
    pub fn handle_member_joined(&self, user_id: impl Into<String>, channel_id: impl Into<String>) -> JoinHandle<()> {
        interaction::welcome::handle_member_joined(user_id.into(), channel_id.into(), self.config.clone(), self.chat.clone())
    }
}
