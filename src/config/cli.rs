//! Command-line flags.
//!
//! `--dest` and `--port` are required, but clap is not told so: a missing
//! flag must surface as a logged configuration error rather than clap's
//! usage text, so both default to an "unset" value and are checked in
//! [`validate`](crate::config::validation::validate).

use clap::Parser;

/// Default cap on a buffered request or response body (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "body-logging-proxy")]
#[command(about = "Reverse proxy that logs request and response bodies as JSON", long_about = None)]
pub struct Cli {
    /// Upstream base URL, e.g. http://localhost:9000
    #[arg(long, default_value = "")]
    pub dest: String,

    /// Local TCP port to listen on
    #[arg(long, default_value_t = 0)]
    pub port: u16,

    /// Largest body that will be buffered for inspection
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Abort a whole exchange after this many seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Give up waiting for upstream response headers after this many seconds
    #[arg(long)]
    pub upstream_timeout_secs: Option<u64>,
}

impl Cli {
    /// Flags for a proxy in front of `dest`, listening on `port`, with defaults elsewhere.
    pub fn new(dest: impl Into<String>, port: u16) -> Self {
        Self {
            dest: dest.into(),
            port,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout_secs: None,
            upstream_timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_flags() {
        let cli = Cli::parse_from(["body-logging-proxy", "--dest", "http://localhost:9000", "--port", "8080"]);
        assert_eq!(cli.dest, "http://localhost:9000");
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(cli.request_timeout_secs, None);
    }

    #[test]
    fn missing_flags_fall_back_to_unset() {
        let cli = Cli::parse_from(["body-logging-proxy", "--port", "8080"]);
        assert!(cli.dest.is_empty());
        assert_eq!(cli.port, 8080);
    }
}
