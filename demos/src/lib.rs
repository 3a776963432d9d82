//! # Demos
//!
//! Runnable companions to the verifier library: an HTTP endpoint accepting
//! `proof-complete` signals, a development reverse proxy, and a terminal
//! renderer for the verification view.

pub mod callback;
pub mod proxy;
pub mod render;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
