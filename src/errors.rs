// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Error Types
 * Source-attributed error taxonomy surfaced in-band through result streams
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;

use thiserror::Error;

/// An error produced while querying a single source.
///
/// Every error is attributed to the source that produced it so that a
/// failure in one provider can be told apart from the others when many
/// sources run concurrently. Errors travel in-band through the result
/// stream; a failing source never aborts its siblings.
#[derive(Debug, Error)]
#[error("{source_name}: {kind}")]
pub struct SourceError {
    source_name: &'static str,
    #[source]
    kind: ErrorKind,
}

impl SourceError {
    pub fn new(source_name: &'static str, kind: impl Into<ErrorKind>) -> Self {
        Self {
            source_name,
            kind: kind.into(),
        }
    }

    /// Name of the source this error is attributed to.
    pub fn source_name(&self) -> &'static str {
        self.source_name
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

/// Classification of source failures.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// DNS, TCP, TLS, or HTTP-level failure, including rejected redirects.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a status the adapter does not accept.
    #[error("unexpected status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The provider answered 2xx but the body did not parse.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The target domain is not a well-formed DNS name.
    #[error("invalid target domain {0:?}")]
    InvalidDomain(String),

    /// The per-source deadline expired before the source finished.
    #[error("timed out after {0:?}")]
    DeadlineExceeded(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_prefixed_with_source_name() {
        let err = SourceError::new("crtsh", ErrorKind::InvalidDomain("..".into()));
        assert!(err.to_string().starts_with("crtsh: "));
        assert_eq!(err.source_name(), "crtsh");
    }

    #[test]
    fn test_decode_failure_is_malformed() {
        let decode_err = serde_json::from_slice::<Vec<String>>(b"not json").unwrap_err();
        let err = SourceError::new("anubis", decode_err);
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));
    }

    #[test]
    fn test_deadline_kind_carries_duration() {
        let err = SourceError::new("slow", ErrorKind::DeadlineExceeded(Duration::from_secs(30)));
        assert!(matches!(
            err.kind(),
            ErrorKind::DeadlineExceeded(d) if *d == Duration::from_secs(30)
        ));
    }
}
