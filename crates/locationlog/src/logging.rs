//! Tracing setup for the `locationlog` binary.
//!
//! Log lines come from three places: the store (open, insert), the route
//! handlers (saves, rejected payloads, storage failures) and `tower_http`
//! request tracing. All of them share one level, picked from `-v`/`-q`
//! unless `RUST_LOG` is set.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the service logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Startup, saves and request summaries.
    #[default]
    Normal,
    /// Adds empty-store lookups and database open details (`-v`).
    Verbose,
    /// Everything, including per-request spans (`-vv`).
    Trace,
}

impl Verbosity {
    /// Pick a verbosity from the repeatable `-v` count and the `-q` flag.
    ///
    /// `-q` wins over any number of `-v`.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Tracing level for this verbosity.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directives used when `RUST_LOG` is unset.
    ///
    /// Request tracing from `tower_http` follows the same level as the crate.
    #[must_use]
    pub fn default_directives(self) -> String {
        let level = self.level();
        format!("locationlog={level},tower_http={level}")
    }

    fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directives()))
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity`. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
///
/// ```no_run
/// use locationlog::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let subscriber = tracing_subscriber::registry()
        .with(verbosity.env_filter())
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        );

    let _ = subscriber.try_init();
}

/// Route warnings and errors to the test harness writer.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_flag_beats_verbose_count() {
        assert_eq!(Verbosity::from_flags(0, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(3, true), Verbosity::Quiet);
    }

    #[test]
    fn test_verbose_count_steps_up_to_trace() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(2, false), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(u8::MAX, false), Verbosity::Trace);
    }

    #[test]
    fn test_normal_logs_saves_but_not_empty_lookups() {
        // Saves log at info, empty-store lookups at debug.
        let level = Verbosity::default().level();
        assert!(Level::INFO <= level);
        assert!(Level::DEBUG > level);
        assert!(Verbosity::Verbose.level() >= Level::DEBUG);
    }

    #[test]
    fn test_directives_cover_request_tracing() {
        assert_eq!(
            Verbosity::Normal.default_directives(),
            "locationlog=INFO,tower_http=INFO"
        );
        assert_eq!(
            Verbosity::Quiet.default_directives(),
            "locationlog=ERROR,tower_http=ERROR"
        );
    }

    #[test]
    fn test_every_verbosity_yields_a_valid_filter() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ] {
            assert!(EnvFilter::try_new(verbosity.default_directives()).is_ok());
        }
    }

    #[test]
    fn test_repeated_init_keeps_first_subscriber() {
        init_test_logging();
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Trace);
    }
}
