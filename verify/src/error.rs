//! # Verify Errors
//!
//! This module defines the errors raised while loading a sign-in envelope,
//! composing a proof request from it, and encoding the request for delivery.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the proof request flow.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The sign-in envelope could not be fetched: a network failure, a
    /// non-success HTTP status, or a response body that is not valid JSON.
    ///
    /// Not retried. The session cannot continue without an envelope.
    #[error(r#"{{"error": "envelope_fetch", "error_description": "{0}"}}"#)]
    EnvelopeFetch(String),

    /// The envelope is missing fields the composer relies on. This indicates a
    /// schema mismatch between the backend and this client.
    #[error(r#"{{"error": "composition_contract", "error_description": "{0}"}}"#)]
    CompositionContract(String),

    /// A composed request could not be serialized for one of the delivery
    /// channels.
    #[error(r#"{{"error": "encoding", "error_description": "{0}"}}"#)]
    Encoding(String),
}

impl Error {
    /// Returns `true` when the error ends the session. Only envelope fetch
    /// failures are fatal; composition and encoding errors are raised in
    /// response to a single selection and the user may pick again.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::EnvelopeFetch(_))
    }

    /// The error detail without the JSON wrapping used by `Display`.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::EnvelopeFetch(d) | Self::CompositionContract(d) | Self::Encoding(d) => d,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<Self>() {
            Some(Self::EnvelopeFetch(e)) => Self::EnvelopeFetch(format!("{err}: {e}")),
            Some(Self::CompositionContract(e)) => Self::CompositionContract(format!("{err}: {e}")),
            Some(Self::Encoding(e)) => Self::Encoding(format!("{err}: {e}")),
            // untyped causes are recoverable, like a contract violation
            None => {
                let stack = err.chain().fold(String::new(), |cause, e| format!("{cause} -> {e}"));
                let stack = stack.trim_start_matches(" -> ").to_string();
                Self::CompositionContract(stack)
            }
        }
    }
}

/// Construct an `Error::CompositionContract` error from a string or existing
/// error value.
macro_rules! contract {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::CompositionContract(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::CompositionContract(format!($err))
    };
}
pub(crate) use contract;

/// Construct an `Error::EnvelopeFetch` error from a string or existing error
/// value.
macro_rules! fetch {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::EnvelopeFetch(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::EnvelopeFetch(format!($err))
    };
}
pub(crate) use fetch;

#[cfg(test)]
mod test {
    use anyhow::{Context, Result, anyhow};
    use serde_json::{Value, json};

    use super::*;

    // Test that the variant survives added context.
    #[test]
    fn contract_context() {
        let result = Err::<(), Error>(Error::CompositionContract("missing body".to_string()))
            .context("composing request");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            r#"{"error": "composition_contract", "error_description": "composing request: missing body"}"#
        );
    }

    #[test]
    fn anyhow_context() {
        let result = Err::<(), anyhow::Error>(anyhow!("one-off error")).context("error context");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            r#"{"error": "composition_contract", "error_description": "error context -> one-off error"}"#
        );
    }

    #[test]
    fn serde_context() {
        let result: Result<Value, anyhow::Error> =
            serde_json::from_str(r#"{"foo": "bar""#).context("error context");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            r#"{"error": "composition_contract", "error_description": "error context -> EOF while parsing an object at line 1 column 13"}"#
        );
    }

    // Errors from outside the flow (catalog files, I/O) are not reported as
    // encoding failures and do not end the session.
    #[test]
    fn untyped_is_recoverable() {
        let result = crate::catalog::ProofCatalog::from_json("[{}]");
        let err: Error = result.unwrap_err().into();

        assert!(matches!(err, Error::CompositionContract(_)));
        assert!(!err.is_fatal());
        assert!(err.description().starts_with("issue parsing proof catalog -> "));
    }

    #[test]
    fn json() {
        let err = Error::EnvelopeFetch("HTTP 500".to_string());
        let ser = serde_json::to_value(&err).unwrap();
        assert_eq!(ser, json!({"error":"envelope_fetch", "error_description": "HTTP 500"}));
    }

    #[test]
    fn fatal() {
        assert!(fetch!("HTTP {}", 502).is_fatal());
        assert!(!contract!("no body").is_fatal());
        assert!(!Error::Encoding("bad".to_string()).is_fatal());
        assert_eq!(contract!("no body").description(), "no body");
    }
}
