//! # Response Listener
//!
//! Tracks whether the wallet has answered the current selection.
//!
//! The listener starts `Idle` for every selection and moves to `Connected`
//! when a `proof-complete` signal for that selection arrives. Signals for an
//! earlier selection are ignored. There is no terminal state and no timeout:
//! the listener stays `Connected` until the next selection resets it.

use serde::{Deserialize, Serialize};

use crate::signal::{ProofComplete, SelectionId};

/// Connection state of the current selection.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Waiting for the wallet.
    #[default]
    Idle,

    /// The wallet delivered a proof for the current selection.
    Connected,
}

/// Two-state listener for completion signals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResponseListener {
    selection: Option<SelectionId>,
    status: ConnectionStatus,
}

impl ResponseListener {
    /// A listener that is not waiting on any selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selection: None,
            status: ConnectionStatus::Idle,
        }
    }

    /// An `Idle` listener waiting on `selection`.
    #[must_use]
    pub const fn reset(selection: SelectionId) -> Self {
        Self {
            selection: Some(selection),
            status: ConnectionStatus::Idle,
        }
    }

    /// Apply a completion signal.
    ///
    /// Returns a `Connected` listener when the signal answers the current
    /// selection, otherwise the listener unchanged.
    #[must_use]
    pub fn observe(&self, signal: &ProofComplete) -> Self {
        if self.selection != Some(signal.selection_id) {
            tracing::warn!(selection = %signal.selection_id, "ignoring stale proof-complete signal");
            return *self;
        }

        tracing::info!(selection = %signal.selection_id, response = %signal.response, "received proof");
        Self {
            selection: self.selection,
            status: ConnectionStatus::Connected,
        }
    }

    /// Current connection status.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// The selection being listened for.
    #[must_use]
    pub const fn selection(&self) -> Option<SelectionId> {
        self.selection
    }
}
