//! permsync CLI library.
//!
//! The binary in `main.rs` is a thin clap dispatcher over this crate;
//! integration tests exercise the command implementations directly.

pub mod commands;
pub mod error;
pub mod output;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Initialize tracing to stderr, honoring `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
