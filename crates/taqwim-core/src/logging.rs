use std::io::IsTerminal;

use anyhow::anyhow;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter used when `RUST_LOG` is unset: the configured `log_filter`, or
/// `warn`.
pub fn fallback_directive(cfg: &Config) -> &str {
    cfg.log_filter
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE)
}

/// Install a stderr fmt subscriber for the calendar. `RUST_LOG` takes
/// precedence over the config. Calling it again is a no-op.
pub fn init_tracing(cfg: &Config) -> anyhow::Result<()> {
    let directive = fallback_directive(cfg);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive)
            .map_err(|e| anyhow!("invalid log_filter {directive:?}: {e}"))?,
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    match installed {
        Ok(()) => debug!(directive, "calendar logging ready"),
        Err(err) => debug!(error = %err, "subscriber already installed"),
    }
    Ok(())
}
