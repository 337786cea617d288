pub mod config;
pub mod domain;

pub use domain::{Category, RetroItem, BOT_NAME};
