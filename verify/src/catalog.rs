//! # Proof Catalog
//!
//! The catalog is the read-only registry of proof types a user can choose
//! from. Each [`ProofDescriptor`] carries the query object that is injected
//! into the sign-in envelope when the proof type is selected.
//!
//! Adding a proof type is a data change: extend the built-in list or load a
//! catalog from JSON with [`ProofCatalog::from_json`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Verification circuit used by all built-in proof types.
pub const CIRCUIT_ID: &str = "credentialAtomicQueryV3-beta.1";

/// Issuer filter accepting credentials from any issuer.
pub const ANY_ISSUER: &str = "*";

/// A named, reusable template for one type of verifiable claim.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofDescriptor {
    /// Stable identifier used to select the proof type.
    pub id: String,

    /// Human readable label.
    pub label: String,

    /// Identifier of the verification circuit the wallet must use.
    pub circuit_id: String,

    /// The query placed in the request scope.
    pub query: Query,
}

/// Query object describing the credential a wallet must prove.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Issuers whose credentials are accepted. `"*"` accepts any issuer.
    pub allowed_issuers: Vec<String>,

    /// Credential type name.
    #[serde(rename = "type")]
    pub type_: String,

    /// JSON-LD context of the credential schema.
    pub context: String,

    /// Conditions on credential subject fields, keyed by field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<BTreeMap<String, Predicate>>,

    /// Other query members (`proofType`, `skipClaimRevocationCheck`, ...),
    /// passed to the wallet as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Conditions applied to a single credential subject field. An empty
/// predicate only asks for the field to be disclosed.
pub type Predicate = BTreeMap<Operator, Value>;

/// Comparison operators understood by the query language.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// Equal to.
    #[serde(rename = "$eq")]
    Eq,

    /// Not equal to.
    #[serde(rename = "$ne")]
    Ne,

    /// Less than. Dates are compared as `YYYYMMDD` integers.
    #[serde(rename = "$lt")]
    Lt,

    /// Less than or equal to.
    #[serde(rename = "$lte")]
    Lte,

    /// Greater than.
    #[serde(rename = "$gt")]
    Gt,

    /// Greater than or equal to.
    #[serde(rename = "$gte")]
    Gte,

    /// One of the listed values.
    #[serde(rename = "$in")]
    In,

    /// None of the listed values.
    #[serde(rename = "$nin")]
    Nin,

    /// Within an inclusive `[low, high]` range.
    #[serde(rename = "$between")]
    Between,

    /// Field is (or is not) present.
    #[serde(rename = "$exists")]
    Exists,
}

impl Query {
    /// Create a query for `type_` in `context`, accepting any issuer.
    #[must_use]
    pub fn new(type_: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            allowed_issuers: vec![ANY_ISSUER.to_string()],
            type_: type_.into(),
            context: context.into(),
            credential_subject: None,
            extra: Map::new(),
        }
    }

    /// Add a condition on a credential subject field.
    #[must_use]
    pub fn condition(mut self, field: impl Into<String>, op: Operator, value: Value) -> Self {
        self.credential_subject
            .get_or_insert_with(BTreeMap::new)
            .entry(field.into())
            .or_default()
            .insert(op, value);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.type_.is_empty() {
            bail!("query type is empty");
        }
        if self.context.is_empty() {
            bail!("query context is empty");
        }
        if self.allowed_issuers.is_empty() {
            bail!("query has no allowed issuers");
        }
        Ok(())
    }
}

/// An ordered, read-only collection of proof descriptors.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProofCatalog(Vec<ProofDescriptor>);

impl ProofCatalog {
    /// The proof types offered out of the box.
    #[must_use]
    pub fn builtin() -> Self {
        Self(vec![
            ProofDescriptor {
                id: "proof-of-life".to_string(),
                label: "Proof of Life".to_string(),
                circuit_id: CIRCUIT_ID.to_string(),
                query: Query::new(
                    "AnimaProofOfLife",
                    "https://raw.githubusercontent.com/anima-protocol/claims-polygonid/main/schemas/json-ld/pol-v1.json-ld",
                ),
            },
            ProofDescriptor {
                id: "age-over-18".to_string(),
                label: "Age Over 18".to_string(),
                circuit_id: CIRCUIT_ID.to_string(),
                query: Query::new(
                    "KYCAgeCredential",
                    "https://raw.githubusercontent.com/iden3/protocols/master/polygonid/examples/ageCredential/schema.json-ld",
                ),
            },
            ProofDescriptor {
                id: "membership".to_string(),
                label: "Membership Proof".to_string(),
                circuit_id: CIRCUIT_ID.to_string(),
                query: Query::new(
                    "DAOAccessCredential",
                    "https://example.com/schemas/daoAccess.json-ld",
                ),
            },
        ])
    }

    /// Parse a catalog from a JSON array of descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a descriptor id is repeated,
    /// or a query is missing its type, context, or issuer filter.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<ProofDescriptor> =
            serde_json::from_str(json).context("issue parsing proof catalog")?;

        let mut ids = HashSet::new();
        for descriptor in &descriptors {
            if !ids.insert(descriptor.id.as_str()) {
                return Err(anyhow!("duplicate proof type: {}", descriptor.id));
            }
            descriptor.query.validate().with_context(|| format!("proof type {}", descriptor.id))?;
        }

        Ok(Self(descriptors))
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not contain a valid
    /// catalog.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("issue reading {}", path.display()))?;
        Self::from_json(&json)
    }

    /// The descriptors, in presentation order.
    #[must_use]
    pub fn descriptors(&self) -> &[ProofDescriptor] {
        &self.0
    }

    /// Look up a descriptor by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ProofDescriptor> {
        self.0.iter().find(|d| d.id == id)
    }
}

impl Default for ProofCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn builtin_order() {
        let catalog = ProofCatalog::builtin();
        let labels: Vec<&str> = catalog.descriptors().iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["Proof of Life", "Age Over 18", "Membership Proof"]);

        for descriptor in catalog.descriptors() {
            assert_eq!(descriptor.circuit_id, CIRCUIT_ID);
            assert_eq!(descriptor.query.allowed_issuers, [ANY_ISSUER]);
            assert!(descriptor.query.validate().is_ok());
        }
    }

    #[test]
    fn query_wire_format() {
        let query = Query::new("KYCAgeCredential", "https://example.com/age.json-ld").condition(
            "birthDate",
            Operator::Lt,
            json!(20_060_101),
        );

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "allowedIssuers": ["*"],
                "type": "KYCAgeCredential",
                "context": "https://example.com/age.json-ld",
                "credentialSubject": {"birthDate": {"$lt": 20_060_101}}
            })
        );
    }

    #[test]
    fn load_json() {
        let json = json!([{
            "id": "employee",
            "label": "Employee",
            "circuitId": CIRCUIT_ID,
            "query": {
                "allowedIssuers": ["did:example:issuer"],
                "type": "EmployeeCredential",
                "context": "https://example.com/employee.json-ld",
                "credentialSubject": {"role": {"$in": ["admin", "owner"]}}
            }
        }]);

        let catalog = ProofCatalog::from_json(&json.to_string()).expect("should load");
        let employee = catalog.find("employee").expect("should find");
        assert_eq!(employee.query.allowed_issuers, ["did:example:issuer"]);

        let subject = employee.query.credential_subject.as_ref().expect("has conditions");
        assert_eq!(subject["role"][&Operator::In], json!(["admin", "owner"]));
    }

    #[test]
    fn load_json_extra_members() {
        let query = json!({
            "allowedIssuers": ["*"],
            "type": "KYCAgeCredential",
            "context": "https://example.com/age.json-ld",
            "credentialSubject": {"birthDate": {"$lt": 20_060_101}},
            "proofType": "BJJSignature2021",
            "skipClaimRevocationCheck": true
        });
        let json = json!([{"id": "age", "label": "Age", "circuitId": CIRCUIT_ID, "query": query}]);

        let catalog = ProofCatalog::from_json(&json.to_string()).expect("should load");
        let age = catalog.find("age").expect("should find");
        assert_eq!(age.query.extra["proofType"], "BJJSignature2021");
        assert_eq!(serde_json::to_value(&age.query).unwrap(), query);
    }

    #[test]
    fn reject_duplicates() {
        let catalog = serde_json::to_string(&[
            ProofCatalog::builtin().descriptors()[0].clone(),
            ProofCatalog::builtin().descriptors()[0].clone(),
        ])
        .unwrap();

        let err = ProofCatalog::from_json(&catalog).expect_err("should reject");
        assert_eq!(err.to_string(), "duplicate proof type: proof-of-life");
    }

    #[test]
    fn reject_missing_issuers() {
        let json = json!([{
            "id": "empty",
            "label": "Empty",
            "circuitId": CIRCUIT_ID,
            "query": {"allowedIssuers": [], "type": "T", "context": "https://example.com"}
        }]);

        let err = ProofCatalog::from_json(&json.to_string()).expect_err("should reject");
        assert!(format!("{err:#}").contains("no allowed issuers"));
    }
}
