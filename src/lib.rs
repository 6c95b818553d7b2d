//! Library root for `covid-bot`.
//!
//! Covid-bot is a Slack assistant for pandemic questions designed to:
//! - Answer informational questions from a question-answering knowledge base
//! - Report live confirmed/deaths/recovered counts for countries, US states and the world
//! - Greet users joining a channel
//!
//! Each message is classified by a language-understanding recognizer and dispatched on its
//! top intent. Locations are resolved through a static registry and matched by name in freshly
//! fetched statistics. Every service sits behind a trait so it can be swapped or mocked.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;
pub mod stats;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the covid-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with recognizer, QnA, statistics and chat clients
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting covid-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
