//! # Verify
//!
//! Compose verifiable credential proof requests and deliver them to a wallet
//! over three channels: a browser extension signal, a mobile wallet deep link,
//! and a QR code.
//!
//! A relying party's backend issues a "shell" authorization request (an
//! [`AuthEnvelope`]) with no proof scope. When the user picks a proof type from
//! the [`ProofCatalog`], [`compose`] scopes the envelope to that proof and the
//! [`channel`] module renders the resulting [`ScopedRequest`] for each channel.
//! Every channel is derived from the same request, so a wallet receives the
//! same request whichever channel it is reached by.
//!
//! A [`Verifier`] ties the pieces together: it fetches the envelope, applies
//! proof selections, emits `request-ready` signals for the browser extension,
//! and listens for `proof-complete` signals correlated to the active
//! selection.
//!
//! # Example
//!
//! ```rust,ignore
//! use credibil_verify::{Config, Event, ProofCatalog, Signals, Verifier};
//!
//! let verifier = Verifier::new(Config::default(), ProofCatalog::builtin(), Signals::new());
//! verifier.load(&reqwest::Client::new()).await;
//!
//! let session = verifier.update(Event::Select("age-over-18".to_string()));
//! if let Some(selection) = session.selection() {
//!     println!("{}", selection.payload.wallet_link);
//! }
//! ```

pub mod app;
pub mod catalog;
pub mod channel;
pub mod client;
pub mod config;
pub mod listener;
pub mod session;
pub mod signal;
pub mod types;
pub mod view;

mod compose;
mod error;

pub use self::app::{Event, Verifier};
pub use self::catalog::{Operator, ProofCatalog, ProofDescriptor, Query};
pub use self::channel::{ChannelPayload, QrLevel, QrOptions};
pub use self::client::fetch_envelope;
pub use self::compose::compose;
pub use self::config::Config;
pub use self::error::Error;
pub use self::listener::{ConnectionStatus, ResponseListener};
pub use self::session::{Selection, Session};
pub use self::signal::{ProofComplete, RequestReady, SelectionId, Signals, Subscription};
pub use self::types::*;
pub use self::view::ViewModel;

/// Result type for the proof request flow.
pub type Result<T, E = Error> = anyhow::Result<T, E>;
