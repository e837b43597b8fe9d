//! Logging initialisation for Auto Eden binaries
//!
//! Filter priority:
//! 1. CLI flags (`-v/-q`)
//! 2. `RUST_LOG`
//! 3. The binary's default filter

use anyhow::Result;
use clap_verbosity_flag::{LogLevel, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for the given verbosity and default
pub fn build_filter<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<EnvFilter> {
    let filter = match verbosity.log_level() {
        Some(level) => EnvFilter::try_new(level.to_string())?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
    };
    Ok(filter)
}

/// Initialize logging with the specified verbosity level and default filter.
///
/// ```no_run
/// use clap::Parser;
/// use clap_verbosity_flag::{InfoLevel, Verbosity};
/// use autoeden_common::logging;
///
/// #[derive(Parser)]
/// struct Args {
///     #[clap(flatten)]
///     verbosity: Verbosity<InfoLevel>,
/// }
///
/// let args = Args::parse();
/// logging::init_logging(&args.verbosity, "autoeden=info").unwrap();
/// ```
pub fn init_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<()> {
    let filter = build_filter(verbosity, default_filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Initialize logging only when explicitly requested
///
/// User-facing CLIs stay quiet unless `-v` or `RUST_LOG` is given. Returns
/// whether a subscriber was installed.
pub fn init_cli_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<bool> {
    if verbosity.log_level().is_some() || std::env::var("RUST_LOG").is_ok() {
        init_logging(verbosity, default_filter)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use clap_verbosity_flag::WarnLevel;

    #[derive(Parser)]
    struct Args {
        #[command(flatten)]
        verbosity: Verbosity<WarnLevel>,
    }

    #[test]
    fn test_verbosity_flag_wins() {
        let args = Args::parse_from(["test", "-vv"]);
        let filter = build_filter(&args.verbosity, "autoeden=error").unwrap();
        assert!(filter.to_string().eq_ignore_ascii_case("debug"));
    }

    #[test]
    fn test_quiet_flag_maps_to_error() {
        let args = Args::parse_from(["test", "-q"]);
        let filter = build_filter(&args.verbosity, "autoeden=info").unwrap();
        assert!(filter.to_string().eq_ignore_ascii_case("error"));
    }
}
