//! EnvioClick failure modes.
//!
//! The aggregator reports problems in two layers: the HTTP status, and a
//! `status` field inside the JSON envelope of an otherwise successful
//! response. Both surface here.

use std::time::Duration;

use reqwest::StatusCode;

use super::types::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum EnvioclickError {
    /// The request never got an answer (DNS, connect, TLS, timeout).
    #[error("request to EnvioClick failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The answer was not the envelope we expected. EnvioClick serves HTML
    /// error pages from its edge during outages, hence the captured body.
    #[error("unreadable EnvioClick response: {message}")]
    Decode {
        message: String,
        body: Option<String>,
    },

    /// Any other non-2xx answer; `message` is the envelope's message when
    /// the body carried one.
    #[error("EnvioClick answered HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// HTTP 2xx with envelope `status` other than `OK`. This is how the
    /// aggregator reports an expired or unknown `idRate`, an address the
    /// carrier refuses, or a missing field.
    #[error("EnvioClick rejected the request: {message}")]
    Rejected { message: String },

    /// Envelope said `OK` but had no `data` member.
    #[error("EnvioClick answered OK without data")]
    MissingData,

    /// HTTP 429: the account's request quota is spent. EnvioClick may send
    /// `Retry-After` in seconds.
    #[error("EnvioClick request quota exceeded")]
    RateLimited { retry_after: Option<Duration> },

    /// HTTP 401 for a missing or unknown key, 403 for a key that exists but
    /// was revoked or lacks API access on the account.
    #[error("EnvioClick refused the API key (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The configured key cannot be sent as a header value.
    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,
}

impl EnvioclickError {
    /// Classify a non-2xx answer.
    pub(crate) fn from_status(status: StatusCode, retry_after: Option<&str>, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized {
                status: status.as_u16(),
            },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited {
                retry_after: retry_after
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs),
            },
            _ => {
                let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                    .map(|env| env.message())
                    .unwrap_or(body);
                Self::Status {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_problems_keep_the_status() {
        let err = EnvioclickError::from_status(StatusCode::UNAUTHORIZED, None, String::new());
        assert!(matches!(err, EnvioclickError::Unauthorized { status: 401 }));

        let err = EnvioclickError::from_status(StatusCode::FORBIDDEN, None, "Forbidden".into());
        assert_eq!(err.to_string(), "EnvioClick refused the API key (HTTP 403)");
    }

    #[test]
    fn quota_exhaustion_reads_retry_after() {
        let err = EnvioclickError::from_status(StatusCode::TOO_MANY_REQUESTS, Some("30"), String::new());
        assert!(matches!(
            err,
            EnvioclickError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(30)
        ));

        // HTTP-date form is not worth parsing; treat as unknown.
        let err = EnvioclickError::from_status(
            StatusCode::TOO_MANY_REQUESTS,
            Some("Wed, 21 Oct 2026 07:28:00 GMT"),
            String::new(),
        );
        assert!(matches!(err, EnvioclickError::RateLimited { retry_after: None }));
    }

    #[test]
    fn server_error_prefers_envelope_message() {
        let err = EnvioclickError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            None,
            r#"{"status":"ERROR","status_messages":["El código DANE de destino no es válido"]}"#.into(),
        );
        assert_eq!(
            err.to_string(),
            "EnvioClick answered HTTP 422: El código DANE de destino no es válido"
        );

        let err = EnvioclickError::from_status(
            StatusCode::BAD_GATEWAY,
            None,
            "<html>502 Bad Gateway</html>".into(),
        );
        assert!(matches!(
            err,
            EnvioclickError::Status { status: 502, ref message } if message.contains("Bad Gateway")
        ));
    }

    #[test]
    fn rejected_envelope_display() {
        let err = EnvioclickError::Rejected {
            message: "El idRate 8812 ha expirado".into(),
        };
        assert_eq!(
            err.to_string(),
            "EnvioClick rejected the request: El idRate 8812 ha expirado"
        );
    }
}
