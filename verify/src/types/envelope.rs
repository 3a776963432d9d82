use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The "shell" authorization request returned by the relying party's backend.
///
/// The envelope is opaque apart from its `body`, whose `scope` is filled in
/// by [`crate::compose`]. Everything else (callback URL, nonce, thread id,
/// sender) is passed through to the wallet untouched.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuthEnvelope(Map<String, Value>);

impl AuthEnvelope {
    /// The envelope `body`, when present and a JSON object.
    #[must_use]
    pub fn body(&self) -> Option<&Map<String, Value>> {
        self.0.get(BODY).and_then(Value::as_object)
    }

    /// The envelope's fields, including `body`.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for AuthEnvelope {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for AuthEnvelope {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).context("envelope is not a JSON object")
    }
}

impl FromStr for AuthEnvelope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).context("issue parsing envelope")
    }
}

pub(crate) const BODY: &str = "body";
pub(crate) const SCOPE: &str = "scope";
