//! Hyperliquid API client for read-only trader data.

mod info_client;
mod types;

pub use info_client::{InfoClient, InfoSource, TraderState};
