//! # Session
//!
//! An immutable snapshot of one verification session. Every transition
//! (envelope loaded, proof selected, proof received) returns a new snapshot;
//! existing snapshots, and any channel payload taken from them, never change.

use std::sync::Arc;

use crate::Result;
use crate::catalog::ProofDescriptor;
use crate::channel::ChannelPayload;
use crate::compose::compose;
use crate::error::Error;
use crate::listener::{ConnectionStatus, ResponseListener};
use crate::signal::{ProofComplete, SelectionId};
use crate::types::AuthEnvelope;

/// The state of a verification session.
#[derive(Clone, Debug, Default)]
pub enum Session {
    /// Waiting for the sign-in envelope.
    #[default]
    Loading,

    /// The envelope could not be fetched. Terminal.
    Failed(Error),

    /// The envelope is loaded and proof types can be selected.
    Ready(Ready),
}

/// A session with a loaded envelope.
#[derive(Clone, Debug)]
pub struct Ready {
    envelope: Arc<AuthEnvelope>,
    selection: Option<Selection>,
    listener: ResponseListener,
    error: Option<Error>,
}

/// The active proof type selection and its channel payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Correlates completion signals with this selection.
    pub id: SelectionId,

    /// Id of the selected proof descriptor.
    pub proof: String,

    /// Channel representations of the scoped request.
    pub payload: ChannelPayload,
}

impl Session {
    /// Apply the result of fetching the envelope.
    ///
    /// Only a `Loading` session accepts the result; any other session is
    /// returned unchanged.
    #[must_use]
    pub fn loaded(&self, result: Result<AuthEnvelope>) -> Self {
        if !matches!(self, Self::Loading) {
            tracing::warn!("envelope already loaded");
            return self.clone();
        }

        match result {
            Ok(envelope) => Self::Ready(Ready {
                envelope: Arc::new(envelope),
                selection: None,
                listener: ResponseListener::new(),
                error: None,
            }),
            Err(e) => {
                tracing::error!("failed to load auth request: {e}");
                Self::Failed(e)
            }
        }
    }

    /// Select a proof type.
    ///
    /// The new snapshot carries a fresh selection with its listener reset to
    /// `Idle`. When composition or encoding fails, the snapshot has no
    /// selection and records the error so another proof type can be chosen.
    #[must_use]
    pub fn select(&self, descriptor: &ProofDescriptor, wallet_url: &str) -> Self {
        let Self::Ready(ready) = self else {
            tracing::warn!(proof = %descriptor.id, "no envelope to select against");
            return self.clone();
        };

        let id = SelectionId::new();
        let ready = match select(&ready.envelope, descriptor, wallet_url) {
            Ok(payload) => Ready {
                envelope: Arc::clone(&ready.envelope),
                selection: Some(Selection {
                    id,
                    proof: descriptor.id.clone(),
                    payload,
                }),
                listener: ResponseListener::reset(id),
                error: None,
            },
            Err(e) => {
                tracing::error!(proof = %descriptor.id, "selection failed: {e}");
                Ready {
                    envelope: Arc::clone(&ready.envelope),
                    selection: None,
                    listener: ResponseListener::new(),
                    error: Some(e),
                }
            }
        };
        Self::Ready(ready)
    }

    /// Apply a `proof-complete` signal.
    #[must_use]
    pub fn complete(&self, signal: &ProofComplete) -> Self {
        let Self::Ready(ready) = self else {
            tracing::warn!(selection = %signal.selection_id, "no session for proof-complete signal");
            return self.clone();
        };

        Self::Ready(Ready {
            listener: ready.listener.observe(signal),
            ..ready.clone()
        })
    }

    /// Connection status of the active selection.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        match self {
            Self::Ready(ready) => ready.listener.status(),
            Self::Loading | Self::Failed(_) => ConnectionStatus::Idle,
        }
    }

    /// The active selection, if any.
    #[must_use]
    pub const fn selection(&self) -> Option<&Selection> {
        match self {
            Self::Ready(ready) => ready.selection.as_ref(),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    /// The loaded envelope, if any.
    #[must_use]
    pub fn envelope(&self) -> Option<&AuthEnvelope> {
        match self {
            Self::Ready(ready) => Some(ready.envelope.as_ref()),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    /// The error raised by the last transition: fatal when the session has
    /// `Failed`, recoverable when `Ready`.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Ready(ready) => ready.error.as_ref(),
            Self::Loading => None,
        }
    }
}

fn select(
    envelope: &AuthEnvelope, descriptor: &ProofDescriptor, wallet_url: &str,
) -> Result<ChannelPayload> {
    let request = compose(envelope, descriptor)?;
    ChannelPayload::new(Arc::new(request), wallet_url)
}
