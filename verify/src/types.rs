//! # Request Types
//!
//! Wire types for the sign-in envelope issued by the relying party's backend
//! and the scoped request composed from it.

mod envelope;
mod request;

pub use self::envelope::*;
pub(crate) use self::envelope::{BODY, SCOPE};
pub use self::request::*;
