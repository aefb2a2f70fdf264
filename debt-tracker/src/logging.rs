//! Tracing setup for the API server and the query smoke binary.
//!
//! Events go to stderr. `pretty` is for a terminal, `json` is one object per
//! line for whatever collects the server's output. Handlers log with
//! `user_id` / `debt_id` fields, so the JSON form can be filtered per user.
//!
//! `RUST_LOG` replaces the built-in filter entirely, e.g.
//!
//! ```text
//! RUST_LOG=debt_tracker=debug,tower_http=debug,sqlx::query=info
//! ```

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// "json" in any case selects JSON; everything else is pretty.
    pub fn from_str_lossy(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// sqlx logs every statement at info; keep that out unless asked for.
fn directives(level: &str) -> String {
    format!("{level},sqlx::query=warn")
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(level));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    match format {
        LogFormat::Pretty => registry.with(layer.with_file(true).with_line_number(true)).try_init()?,
        LogFormat::Json => registry.with(layer.json().with_current_span(true)).try_init()?,
    }

    tracing::debug!(?format, level, "tracing ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_is_lenient() {
        assert_eq!(LogFormat::from_str_lossy(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::from_str_lossy("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str_lossy("yaml"), LogFormat::Pretty);
    }

    #[test]
    fn statement_logging_is_quiet_by_default() {
        assert_eq!(directives("debt_tracker=debug"), "debt_tracker=debug,sqlx::query=warn");
        EnvFilter::try_new(directives("info")).unwrap();
    }
}
