//! # Signals
//!
//! Typed in-process channels connecting the verifier to its external
//! collaborators:
//!
//! * `request-ready` ([`RequestReady`]) is sent when the user invokes the
//!   browser extension channel. The extension consumes it.
//! * `proof-complete` ([`ProofComplete`]) is sent by the extension or a wallet
//!   callback when a proof has been produced. The verifier consumes it.
//!
//! Each listener holds a [`Subscription`] for as long as it is mounted.
//! Dropping the subscription (or calling [`Subscription::unsubscribe`])
//! removes the listener.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use uuid::Uuid;

use crate::types::ScopedRequest;

const CAPACITY: usize = 16;

/// Identifies one proof type selection. Completion signals carry the id of the
/// selection they answer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SelectionId(Uuid);

impl SelectionId {
    /// Mint a new random selection id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SelectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SelectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The `request-ready` signal: the user asked to present the request to the
/// browser extension.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RequestReady {
    /// Selection the request was composed for.
    pub selection_id: SelectionId,

    /// The scoped request, shared with the other channels.
    pub request: Arc<ScopedRequest>,
}

/// The `proof-complete` signal: a wallet produced (or attempted) the
/// requested proof.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ProofComplete {
    /// Selection the proof answers.
    pub selection_id: SelectionId,

    /// The wallet's response. Logged, not interpreted.
    #[serde(default)]
    pub response: Value,

    /// When the signal was received.
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl ProofComplete {
    /// Create a signal for `selection_id`, received now.
    #[must_use]
    pub fn new(selection_id: SelectionId, response: Value) -> Self {
        Self {
            selection_id,
            response,
            received_at: Utc::now(),
        }
    }
}

/// Broadcast hub for the `request-ready` and `proof-complete` signals.
///
/// Cloning the hub yields another handle to the same channels.
#[derive(Clone, Debug)]
pub struct Signals {
    request_ready: broadcast::Sender<RequestReady>,
    proof_complete: broadcast::Sender<ProofComplete>,
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

impl Signals {
    /// Create a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_ready: broadcast::channel(CAPACITY).0,
            proof_complete: broadcast::channel(CAPACITY).0,
        }
    }

    /// Subscribe to `request-ready` signals.
    #[must_use]
    pub fn subscribe_request_ready(&self) -> Subscription<RequestReady> {
        Subscription::new("request-ready", self.request_ready.subscribe())
    }

    /// Subscribe to `proof-complete` signals.
    #[must_use]
    pub fn subscribe_proof_complete(&self) -> Subscription<ProofComplete> {
        Subscription::new("proof-complete", self.proof_complete.subscribe())
    }

    /// Send a `request-ready` signal, returning the number of subscribers that
    /// will receive it.
    pub fn request_ready(&self, signal: RequestReady) -> usize {
        self.request_ready.send(signal).unwrap_or_else(|_| {
            tracing::warn!("request-ready: no subscribers");
            0
        })
    }

    /// Send a `proof-complete` signal, returning the number of subscribers that
    /// will receive it.
    pub fn proof_complete(&self, signal: ProofComplete) -> usize {
        self.proof_complete.send(signal).unwrap_or_else(|_| {
            tracing::warn!("proof-complete: no subscribers");
            0
        })
    }
}

/// A registered listener for one signal.
#[derive(Debug)]
pub struct Subscription<T> {
    name: &'static str,
    receiver: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    const fn new(name: &'static str, receiver: broadcast::Receiver<T>) -> Self {
        Self { name, receiver }
    }

    /// Wait for the next signal. Returns `None` once every sender is gone.
    ///
    /// A slow listener skips signals it has fallen behind on.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.recv().await {
                Ok(signal) => return Some(signal),
                Err(RecvError::Lagged(n)) => tracing::warn!("{}: skipped {n} signals", self.name),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next signal if one is waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(signal) => return Some(signal),
                Err(TryRecvError::Lagged(n)) => tracing::warn!("{}: skipped {n} signals", self.name),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Remove the listener.
    pub fn unsubscribe(self) {
        tracing::debug!("{}: unsubscribed", self.name);
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn subscribe_unsubscribe() {
        let signals = Signals::new();
        let selection_id = SelectionId::new();

        let mut first = signals.subscribe_proof_complete();
        let second = signals.subscribe_proof_complete();
        assert_eq!(signals.proof_complete(ProofComplete::new(selection_id, json!({}))), 2);

        second.unsubscribe();
        assert_eq!(signals.proof_complete(ProofComplete::new(selection_id, json!({}))), 1);

        assert_eq!(first.try_recv().map(|s| s.selection_id), Some(selection_id));
        assert!(first.try_recv().is_some());
        assert!(first.try_recv().is_none());

        first.unsubscribe();
        assert_eq!(signals.proof_complete(ProofComplete::new(selection_id, json!({}))), 0);
    }

    #[test]
    fn proof_complete_wire_format() {
        let selection_id = SelectionId::new();
        let signal: ProofComplete = serde_json::from_value(json!({
            "selection_id": selection_id.to_string(),
            "response": {"token": "eyJhbGciOi..."}
        }))
        .expect("should deserialize");

        assert_eq!(signal.selection_id, selection_id);
        assert_eq!(signal.response["token"], "eyJhbGciOi...");
    }

    #[test]
    fn selection_id_parse() {
        let id = SelectionId::new();
        assert_eq!(id.to_string().parse::<SelectionId>().unwrap(), id);
        assert!("not-a-uuid".parse::<SelectionId>().is_err());
    }
}
