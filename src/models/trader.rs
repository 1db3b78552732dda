//! Tracked trader entries and the text formats they are entered in.

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Validated Hyperliquid account address (0x-prefixed, 20 bytes hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Parse and normalize to lowercase.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        else {
            bail!("address must start with 0x: {:?}", trimmed);
        };
        if hex.len() != 40 {
            bail!(
                "address must have 40 hex digits after 0x, got {}: {:?}",
                hex.len(),
                trimmed
            );
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("address contains non-hex characters: {:?}", trimmed);
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A trader entered in the sidebar: display label plus raw address text.
///
/// The address is kept unvalidated so a malformed entry can still be shown
/// next to its error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTrader {
    pub label: String,
    pub address: String,
}

impl TrackedTrader {
    pub fn new(label: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            address: address.into(),
        }
    }

    /// Label, or the address when no label was given.
    pub fn display_name(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.address
        } else {
            &self.label
        }
    }

    /// Serialize back to the sidebar line format.
    pub fn to_line(&self) -> String {
        if self.label.trim().is_empty() || self.label == self.address {
            self.address.clone()
        } else {
            format!("{} = {}", self.label, self.address)
        }
    }
}

/// Parse the sidebar text: one trader per line, `address` or `label = address`.
///
/// Blank lines and lines with an empty address are dropped. Unlabelled
/// entries get `Trader N` where N is the 1-based position in the list.
pub fn parse_trader_lines(text: &str) -> Vec<TrackedTrader> {
    let mut traders = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (label, address) = match line.split_once('=') {
            Some((label, address)) => (label.trim(), address.trim()),
            None => ("", line),
        };
        if address.is_empty() {
            continue;
        }

        let label = if label.is_empty() {
            format!("Trader {}", traders.len() + 1)
        } else {
            label.to_string()
        };
        traders.push(TrackedTrader::new(label, address));
    }

    traders
}

/// Parse an uploaded wallet list (txt or single-column csv).
///
/// Every line is split on commas; each non-empty trimmed token is an address.
pub fn parse_wallet_list(raw: &str) -> Vec<String> {
    raw.lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
