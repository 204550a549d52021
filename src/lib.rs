//! # Reminder Bot
//!
//! A Telegram bot for one-shot text reminders with custom reply keyboards.
//!
//! ## Features
//! - Remind at an absolute moment (`/timer 18:00 пей чай`)
//! - Remind after a delay (`/5м чай`)
//! - Cancel pending reminders by id (`/cancel 3`)
//! - Build a custom reply keyboard from labels (`/see да,нет`), hide with `/stop`
//! - Webhook or long-polling transport, chosen by configuration

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// In-memory services: timer scheduling, keyboard state, health endpoints
pub mod services;
/// Utility functions for datetime parsing, user feedback, and logging
pub mod utils;
