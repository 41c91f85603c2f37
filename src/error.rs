use thiserror::Error;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

#[derive(Error, Debug)]
pub enum OddsError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Upstream answered with a non-2xx status.
    #[error("API error: {reason}")]
    UpstreamStatus { status: u16, reason: String },

    /// Network, timeout, body decoding or anything else that went wrong.
    #[error("{0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl OddsError {
    pub fn upstream_status(status: reqwest::StatusCode) -> Self {
        Self::UpstreamStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed => 405,
            Self::UpstreamStatus { status, .. } => *status,
            Self::Unexpected(_) => 500,
        }
    }

    /// Whether the error body should carry a mock envelope for the client to render.
    pub fn wants_fallback(&self) -> bool {
        !matches!(self, Self::MethodNotAllowed)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use reqwest::StatusCode;

    use super::OddsError;

    #[test]
    fn upstream_status_keeps_code_and_reason() {
        let err = OddsError::upstream_status(StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.to_string(), "API error: Too Many Requests");
        assert!(err.wants_fallback());
    }

    #[test]
    fn unexpected_is_500_and_shows_context_chain() {
        let err = OddsError::from(anyhow!("connection reset").context("odds request failed"));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "odds request failed: connection reset");
    }

    #[test]
    fn method_not_allowed_has_no_fallback() {
        let err = OddsError::MethodNotAllowed;
        assert_eq!(err.status_code(), 405);
        assert!(!err.wants_fallback());
        assert_eq!(err.to_string(), super::METHOD_NOT_ALLOWED);
    }
}
