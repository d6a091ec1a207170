//! Log output for the `turboflake` binary.
//!
//! Logs go to stderr so that stdout carries nothing but IDs. The level is
//! taken from `RUST_LOG` and defaults to `info`; `RUST_LOG=turboflake=debug`
//! shows every exhausted tick and interrupted wait.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_target(false),
        )
        .try_init()?;
    Ok(())
}
