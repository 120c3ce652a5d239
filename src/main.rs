//! Binary entrypoint.
//!
//! This crate is split into Clean Architecture layers:
//! - domain: pure, synchronous bookmark rules
//! - usecase: orchestration + progress events
//! - infrastructure: plist codec + async IO + implementations of ports
//! - interface: CLI wiring

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    safari_bookmark_editor::interface::cli::run().await
}
