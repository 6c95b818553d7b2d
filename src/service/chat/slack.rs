//! Chat service integration for covid-bot.
//!
//! This module provides the Slack transport:
//! - Receiving messages, @-mentions and channel joins over socket mode
//! - Sending replies back into the originating thread
//!
//! It implements the `GenericChatClient` trait, so the rest of the bot never touches
//! Slack types directly.

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    runtime::Runtime,
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    runtime: Runtime,
    bot_user_id: String,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self, runtime: Runtime) -> Void {
        // Initialize the socket mode listener. Only push events produce turns.
        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            runtime,
            bot_user_id: self.bot_user_id.clone(),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        socket_mode_listener.listen_for(&self.app_token).await?;

        info!("Listening for Slack events ...");

        // Returns once Ctrl-C is received.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, channel_id: &str, thread_ts: Option<&str>, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let mut request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_as_user(true)
            .with_link_names(true);

        if let Some(thread_ts) = thread_ts {
            request = request.with_thread_ts(SlackTs(thread_ts.to_string()));
        }

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Socket mode listener callbacks for Slack.

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            info!("Received message event ...");

            if !is_turn(&slack_message_event, &user_state.bot_user_id) {
                return Ok(());
            }

            let channel_id = slack_message_event.origin.channel.as_ref().ok_or(anyhow::anyhow!("Failed to get channel ID"))?.0.to_owned();
            let text = slack_message_event.content.as_ref().and_then(|c| c.text.clone()).unwrap_or_default();
            let thread_ts = slack_message_event.origin.ts.0.clone();

            user_state.runtime.handle_chat_event(text, channel_id, Some(thread_ts));
        }
        SlackEventCallbackBody::AppMention(slack_app_mention_event) => {
            info!("Received app mention event ...");

            let channel_id = slack_app_mention_event.channel.0.to_owned();
            let text = slack_app_mention_event.content.text.clone().unwrap_or_default();
            let thread_ts = slack_app_mention_event.origin.thread_ts.clone().unwrap_or_else(|| slack_app_mention_event.origin.ts.clone()).0;

            user_state.runtime.handle_chat_event(text, channel_id, Some(thread_ts));
        }
        SlackEventCallbackBody::MemberJoinedChannel(slack_member_joined_event) => {
            info!("Received member joined event ...");

            user_state.runtime.handle_member_joined(slack_member_joined_event.user.0, slack_member_joined_event.channel.0);
        }
        _ => {
            warn!("Received unhandled push event.")
        }
    }

    Ok(())
}

/// Whether a plain channel message starts a turn.
///
/// Edits, joins and other subtyped messages are skipped, as are messages from bots (including
/// us). Messages that mention the bot arrive again as app mentions, and thread replies only
/// count when the bot is mentioned, so both are skipped here as well.
fn is_turn(event: &SlackMessageEvent, bot_user_id: &str) -> bool {
    if event.subtype.is_some() || event.sender.bot_id.is_some() {
        debug!("Skipping non-user message event.");
        return false;
    }

    let text = event.content.as_ref().and_then(|c| c.text.as_deref()).unwrap_or_default();

    if text.contains(bot_user_id) {
        debug!("Skipping message event because it mentions the bot.");
        return false;
    }

    if event.origin.thread_ts.is_some() {
        debug!("Skipping message event because it is in a thread.");
        return false;
    }

    true
}

// Tests.
