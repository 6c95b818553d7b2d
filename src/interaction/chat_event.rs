//! This module turns an incoming chat message into a reply in the same conversation.

use tokio::{sync::watch, task::JoinHandle};
use tracing::{Instrument, debug, error, instrument};

use crate::{
    base::types::Void,
    interaction::dispatch::Dispatcher,
    service::chat::ChatClient,
};

/// Handles one chat message as an independent turn.
///
/// The turn runs on its own task and is abandoned, without a reply, once `shutdown` flips to `true`.
#[instrument(skip_all)]
pub fn handle_chat_event(text: String, channel_id: String, thread_ts: Option<String>, dispatcher: Dispatcher, chat: ChatClient, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            // Process the event.
            let result = handle_chat_event_internal(text, channel_id, thread_ts, &dispatcher, &chat, shutdown).await;

            // Log any errors.
            if let Err(err) = &result {
                error!("Error while handling: {}", err);
            }
        }
        .in_current_span(),
    )
}

#[instrument(skip_all)]
async fn handle_chat_event_internal(text: String, channel_id: String, thread_ts: Option<String>, dispatcher: &Dispatcher, chat: &ChatClient, shutdown: watch::Receiver<bool>) -> Void {
    let text = strip_mentions(&text);

    let Some(reply) = dispatcher.handle_turn_until(&text, shutdown_requested(shutdown)).await else {
        return Ok(());
    };

    debug!("Replying in {} ...", channel_id);

    chat.send_message(&channel_id, thread_ts.as_deref(), &reply).await
}

/// Resolves once shutdown is requested.
///
/// If the sender is gone without ever requesting shutdown, this never resolves.
pub async fn shutdown_requested(mut shutdown: watch::Receiver<bool>) {
    let requested = shutdown.wait_for(|stopped| *stopped).await.is_ok();

    if !requested {
        futures::future::pending::<()>().await;
    }
}

/// Remove Slack user mentions (`<@U123>`) so the recognizer only sees the question.
fn strip_mentions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("<@") {
        out.push_str(&rest[..start]);

        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                rest = &rest[start..];
                break;
            }
        }
    }
    out.push_str(rest);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Tests.
