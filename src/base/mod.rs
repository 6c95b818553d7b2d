//! Core components, types, and utilities for the covid-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Fixed reply texts sent back to users.
//! - Common types and result handling.

pub mod config;
pub mod replies;
pub mod types;
