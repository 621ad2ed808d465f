// src/logging.rs

//! Diagnostic logging for the generator.
//!
//! All `tracing` output goes to stderr: stdout is reserved for the
//! generation progress and statistics lines that scripts may parse. The
//! default level is `warn` for the same reason - resolution progress is
//! already reported through the normal output path.
//!
//! `--log-level` sets a global level. Without it, `BUILDGEN_LOG` is read
//! as a full filter spec, so per-module directives like
//! `BUILDGEN_LOG=buildgen::graph=debug` work during development.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => EnvFilter::try_from_env("BUILDGEN_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}
