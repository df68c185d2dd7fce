//! Configuration validation.
//!
//! Turns raw [`Cli`] flags into a [`ProxyConfig`]. Every problem is
//! collected before failing so a single run reports all of them.

use thiserror::Error;

use crate::config::cli::Cli;
use crate::config::schema::{
    LimitsConfig, ListenerConfig, ProxyConfig, TimeoutConfig, UpstreamTarget,
};

/// A single semantic problem with the flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required flag --{0}")]
    MissingFlag(&'static str),

    #[error("invalid --dest {dest:?}: {reason}")]
    InvalidDest { dest: String, reason: String },

    #[error("unsupported --dest scheme {0:?}, only http is supported")]
    UnsupportedScheme(String),

    #[error("--{0} must be greater than zero")]
    Zero(&'static str),
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
#[error("Validation failed: {}", join(.0))]
pub struct ConfigError(pub Vec<ValidationError>);

impl ConfigError {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate flags into an immutable config.
pub fn validate(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut errors = Vec::new();

    let upstream = if cli.dest.trim().is_empty() {
        errors.push(ValidationError::MissingFlag("dest"));
        None
    } else {
        match UpstreamTarget::parse(cli.dest.trim()) {
            Ok(target) => Some(target),
            Err(e) => {
                errors.push(e);
                None
            }
        }
    };

    if cli.port == 0 {
        errors.push(ValidationError::MissingFlag("port"));
    }
    if cli.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("max-body-bytes"));
    }
    if cli.request_timeout_secs == Some(0) {
        errors.push(ValidationError::Zero("request-timeout-secs"));
    }
    if cli.upstream_timeout_secs == Some(0) {
        errors.push(ValidationError::Zero("upstream-timeout-secs"));
    }

    match upstream {
        Some(upstream) if errors.is_empty() => Ok(ProxyConfig {
            upstream,
            listener: ListenerConfig::for_port(cli.port),
            limits: LimitsConfig {
                max_body_bytes: cli.max_body_bytes,
            },
            timeouts: TimeoutConfig {
                request_secs: cli.request_timeout_secs,
                upstream_secs: cli.upstream_timeout_secs,
            },
        }),
        _ => Err(ConfigError(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_flags() {
        let config = validate(&Cli::new("http://localhost:9000", 8080)).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.authority().as_str(), "localhost:9000");
        assert_eq!(config.timeouts.upstream_secs, None);
    }

    #[test]
    fn reports_every_missing_flag() {
        let err = validate(&Cli::new("", 0)).unwrap_err();
        assert_eq!(
            err.errors(),
            &[
                ValidationError::MissingFlag("dest"),
                ValidationError::MissingFlag("port"),
            ]
        );
        assert_eq!(
            err.to_string(),
            "Validation failed: missing required flag --dest, missing required flag --port"
        );
    }

    #[test]
    fn missing_dest_alone_is_fatal() {
        let err = validate(&Cli::new("", 8080)).unwrap_err();
        assert_eq!(err.errors(), &[ValidationError::MissingFlag("dest")]);
    }

    #[test]
    fn rejects_zero_limits() {
        let mut cli = Cli::new("http://localhost:9000", 8080);
        cli.max_body_bytes = 0;
        cli.upstream_timeout_secs = Some(0);
        let err = validate(&cli).unwrap_err();
        assert_eq!(
            err.errors(),
            &[
                ValidationError::Zero("max-body-bytes"),
                ValidationError::Zero("upstream-timeout-secs"),
            ]
        );
    }

    #[test]
    fn bad_dest_is_reported_with_other_errors() {
        let err = validate(&Cli::new("ftp://files", 0)).unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert!(matches!(err.errors()[0], ValidationError::UnsupportedScheme(_)));
    }
}
