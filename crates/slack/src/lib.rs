//! Slack integration - slash command webhook interface
//!
//! This crate provides the Slack-facing surface for retrobot:
//! - **Slash Commands** (`commands`) - parsing `/retro good ...` and friends,
//!   routing to a command service
//! - **Attachments** (`attachments`) - per-category attachment blocks for
//!   retrospective items
//! - **Response** (`response`) - the JSON reply payload Slack expects back
//!   from a slash-command webhook
//!
//! # Architecture
//!
//! ```text
//! Slash Command → parse_command → CommandRouter → RetroCommandService
//!                                      ↓
//!                           SlackResponse ← Attachments
//! ```
//!
//! The command service trait is implemented by the server crate against the
//! record store; everything in here is transport- and storage-free.

pub mod attachments;
pub mod commands;
pub mod response;
