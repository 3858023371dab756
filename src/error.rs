// Remote service error types
use serde_json::Value;

/// Failure reported by (or while talking to) Identity Toolkit or Firestore
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    // Non-2xx response with the service's error envelope decoded
    #[error("{service} returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {service}: {detail}")]
    Decode { service: &'static str, detail: String },

    #[error("access token unavailable: {0}")]
    Token(String),
}

impl ServiceError {
    pub fn transport(service: &'static str, source: reqwest::Error) -> Self {
        ServiceError::Transport { service, source }
    }

    pub fn decode(service: &'static str, detail: impl Into<String>) -> Self {
        ServiceError::Decode {
            service,
            detail: detail.into(),
        }
    }

    /// Build from a non-success status and the raw response body.
    ///
    /// Google APIs answer with `{"error": {"code": 400, "message": "EMAIL_EXISTS", "status": "..."}}`.
    /// Identity Toolkit packs its error code into `message`, sometimes followed by ` : detail`.
    pub fn from_response(service: &'static str, status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error"));

        let message = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                }
            });

        let code = error
            .and_then(|e| e.get("status"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                // "EMAIL_EXISTS : The email address is already in use"
                let head = message.split(" : ").next().unwrap_or_default().trim();
                let looks_like_code = !head.is_empty()
                    && head.chars().all(|c| c.is_ascii_uppercase() || c == '_');
                looks_like_code.then(|| head.to_string())
            });

        ServiceError::Api {
            service,
            status,
            code,
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The resource being created already exists
    pub fn is_conflict(&self) -> bool {
        match self {
            ServiceError::Api {
                status,
                code,
                message,
                ..
            } => {
                *status == 409
                    || message.starts_with("EMAIL_EXISTS")
                    || matches!(code.as_deref(), Some("ALREADY_EXISTS") | Some("EMAIL_EXISTS"))
            }
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::Api {
                status,
                code,
                message,
                ..
            } => {
                *status == 404
                    || message.starts_with("USER_NOT_FOUND")
                    || code.as_deref() == Some("NOT_FOUND")
            }
            _ => false,
        }
    }
}
