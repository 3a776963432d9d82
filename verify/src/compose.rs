//! # Request Composer
//!
//! Builds a [`ScopedRequest`] from the sign-in envelope and the proof type
//! the user selected.

use serde_json::Value;

use crate::Result;
use crate::catalog::ProofDescriptor;
use crate::error::contract;
use crate::types::{AuthEnvelope, BODY, REQUEST_ID, SCOPE, ScopeRequest, ScopedBody, ScopedRequest};

/// Compose a request scoped to `descriptor`.
///
/// The result is built from copies of the envelope's fields and shares no
/// state with `envelope`, which is left untouched. Any scope already present
/// in the envelope is replaced by a single entry for `descriptor`.
///
/// # Errors
///
/// Returns `Error::CompositionContract` if the envelope has no `body` object.
pub fn compose(envelope: &AuthEnvelope, descriptor: &ProofDescriptor) -> Result<ScopedRequest> {
    let mut metadata = envelope.fields().clone();
    let body = match metadata.remove(BODY) {
        Some(Value::Object(body)) => body,
        Some(other) => {
            return Err(contract!("envelope `body` must be an object, found {}", kind(&other)));
        }
        None => return Err(contract!("envelope has no `body`")),
    };

    let mut fields = body;
    if let Some(existing) = fields.remove(SCOPE)
        && existing.as_array().is_some_and(|s| !s.is_empty())
    {
        tracing::debug!("replacing non-empty envelope scope");
    }

    tracing::debug!(proof = %descriptor.id, circuit = %descriptor.circuit_id, "compose");

    Ok(ScopedRequest {
        body: ScopedBody {
            scope: vec![ScopeRequest {
                id: REQUEST_ID,
                circuit_id: descriptor.circuit_id.clone(),
                query: descriptor.query.clone(),
            }],
            fields,
        },
        metadata,
    })
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
