//! Logging setup for the quill binary.
//!
//! The library only emits `tracing` events; this module installs the
//! subscriber that prints them.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "quill=debug,quill_core=debug,quill_cli=debug";
const QUIET_FILTER: &str = "quill=error,quill_core=error,quill_cli=error";
const DEFAULT_FILTER: &str = "quill=info,quill_core=info,quill_cli=info";

/// Select the log filter.
///
/// `--verbose` wins over `--quiet`; with neither flag `RUST_LOG` is honored
/// before falling back to info level.
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let ansi = !no_color && std::env::var_os("NO_COLOR").is_none();

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_quiet() {
        let filter = build_filter(true, true).to_string();
        assert!(filter.contains("quill_core=debug"));
    }

    #[test]
    fn test_quiet_filter() {
        let filter = build_filter(false, true).to_string();
        assert!(filter.contains("quill_cli=error"));
    }
}
