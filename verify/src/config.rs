//! # Configuration

use serde::{Deserialize, Serialize};

use crate::channel::{DEFAULT_WALLET_URL, QrOptions};

/// Backend serving the sign-in envelope unless configured otherwise.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Verifier configuration.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Origin of the relying party backend issuing sign-in envelopes.
    pub backend_url: String,

    /// Base URL of the mobile wallet used for deep links.
    pub wallet_url: String,

    /// QR code rendering options.
    pub qr: QrOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            wallet_url: DEFAULT_WALLET_URL.to_string(),
            qr: QrOptions::default(),
        }
    }
}

impl Config {
    /// Use `backend_url` as the envelope backend.
    #[must_use]
    pub fn backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into();
        self
    }

    /// Use `wallet_url` for deep links.
    #[must_use]
    pub fn wallet_url(mut self, wallet_url: impl Into<String>) -> Self {
        self.wallet_url = wallet_url.into();
        self
    }
}
