//! Event handling and user interactions for covid-bot.
//!
//! This module provides functionality for handling chat events:
//! - Routing each message (a "turn") to statistics, QnA or the fallback reply
//! - Running turns as independent tasks and delivering their replies
//! - Greeting users who join a channel

pub mod chat_event;
pub mod dispatch;
pub mod welcome;
