//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the covid-bot:
//! - Chat services (e.g., Slack)
//! - Statistics services (e.g., the public COVID-19 APIs)
//! - Language understanding services (e.g., LUIS)
//! - Question-answering services (e.g., QnA Maker)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod covid;
pub mod nlu;
pub mod qna;
