//! Greets users joining a channel the bot is in.

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, instrument};

use crate::{base::config::Config, base::types::Void, service::chat::ChatClient};

/// Handles a member-joined event.
///
/// This function spawns a new task that posts the welcome message to the channel.
#[instrument(skip_all)]
pub fn handle_member_joined(user_id: String, channel_id: String, config: Config, chat: ChatClient) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            // Process the event.
            let result = handle_member_joined_internal(user_id, channel_id, &config, &chat).await;

            // Log any errors.
            if let Err(err) = &result {
                error!("Error while handling: {}", err);
            }
        }
        .in_current_span(),
    )
}

/// Internal function to handle the member-joined event.
#[instrument(skip_all)]
async fn handle_member_joined_internal(user_id: String, channel_id: String, config: &Config, chat: &ChatClient) -> Void {
    if user_id == chat.bot_user_id() {
        debug!("Skipping welcome for the bot itself.");
        return Ok(());
    }

    chat.send_message(&channel_id, None, &config.welcome_message).await
}
