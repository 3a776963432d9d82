use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::Query;

/// Request id placed on every scope entry.
pub const REQUEST_ID: u64 = 1;

/// An authorization request scoped to exactly one proof type.
///
/// Created by [`crate::compose`] from an [`crate::AuthEnvelope`]. A new
/// instance is built for every selection and none is modified afterwards, so
/// every channel derived from it sees the same request.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScopedRequest {
    /// The request body carrying the proof scope.
    pub body: ScopedBody,

    /// Envelope fields outside `body`, passed through unchanged.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// The body of a [`ScopedRequest`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScopedBody {
    /// Proof queries demanded of the credential holder.
    pub scope: Vec<ScopeRequest>,

    /// Remaining body fields (callback URL, reason, ...) from the envelope.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A single proof query in the request scope.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRequest {
    /// Request id, unique within the scope.
    pub id: u64,

    /// Verification circuit the wallet must use.
    pub circuit_id: String,

    /// The credential query.
    pub query: Query,
}

impl ScopedRequest {
    /// The single scope entry of a composed request.
    #[must_use]
    pub fn scope(&self) -> Option<&ScopeRequest> {
        self.body.scope.first()
    }
}
