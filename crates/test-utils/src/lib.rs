//! # Test Utilities
//!
//! Fixture envelopes and a mock relying party backend for tests.

pub mod backend;

pub use backend::Backend;

/// Fixture envelopes.
pub mod data {
    /// A sign-in envelope as issued by the relying party backend, with an
    /// empty scope.
    pub const SIGN_IN: &str = include_str!("../data/sign-in.json");

    /// The smallest envelope the composer accepts.
    pub const EMPTY_BODY: &str = r#"{"body":{}}"#;
}
