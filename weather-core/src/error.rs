//! Error types shared by the resolver, the renderer and the web front end.
//!
//! `Display` carries the technical detail meant for logs, while
//! [`WeatherError::user_message`] is what ends up on the rendered page.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Render error: {0}")]
    Render(String),
}

/// Failures talking to the weather provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("provider rejected the API key")]
    Unauthorized,

    #[error("location not found")]
    NotFound,

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("provider server error: HTTP {status}")]
    Server { status: u16 },

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("malformed provider payload: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Classify a non-success provider status.
    pub fn from_status(status: u16, retry_after: Option<u64>, body: &str) -> Self {
        match status {
            401 => UpstreamError::Unauthorized,
            404 => UpstreamError::NotFound,
            429 => UpstreamError::RateLimited { retry_after },
            500..=599 => UpstreamError::Server { status },
            _ => UpstreamError::Status {
                status,
                body: truncate_body(body),
            },
        }
    }

    /// Provider HTTP status, or 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            UpstreamError::Unauthorized => 401,
            UpstreamError::NotFound => 404,
            UpstreamError::RateLimited { .. } => 429,
            UpstreamError::Server { status } | UpstreamError::Status { status, .. } => *status,
            UpstreamError::Malformed(_) => 200,
            UpstreamError::Unreachable(_) => 0,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            UpstreamError::Unauthorized => {
                "Invalid API key. Please check your configuration.".to_string()
            }
            UpstreamError::NotFound => "City not found. Please check the city name.".to_string(),
            UpstreamError::RateLimited { .. } => {
                "Request rate limit reached. Please try again in a moment.".to_string()
            }
            UpstreamError::Server { .. } => {
                "The weather service is having trouble. Please try again later.".to_string()
            }
            UpstreamError::Status { status, .. } => format!("Error fetching data: HTTP {status}"),
            UpstreamError::Unreachable(_) => {
                "The weather service is unreachable. Please try again later.".to_string()
            }
            UpstreamError::Malformed(_) => "Error processing the received data.".to_string(),
        }
    }
}

impl WeatherError {
    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Configuration(_) => {
                "The weather service is not configured. Please contact the site administrator."
                    .to_string()
            }
            WeatherError::InvalidQuery(msg) => msg.clone(),
            WeatherError::Upstream(e) => e.user_message(),
            WeatherError::Render(_) => {
                "Something went wrong while preparing the forecast. Please try again.".to_string()
            }
        }
    }

    /// HTTP status the front end should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            WeatherError::Configuration(_) => 500,
            WeatherError::InvalidQuery(_) => 400,
            WeatherError::Upstream(UpstreamError::NotFound) => 404,
            WeatherError::Upstream(_) | WeatherError::Render(_) => 502,
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(UpstreamError::from_status(401, None, ""), UpstreamError::Unauthorized));
        assert!(matches!(UpstreamError::from_status(404, None, ""), UpstreamError::NotFound));
        assert!(matches!(
            UpstreamError::from_status(429, Some(30), ""),
            UpstreamError::RateLimited { retry_after: Some(30) }
        ));
        assert!(matches!(
            UpstreamError::from_status(503, None, ""),
            UpstreamError::Server { status: 503 }
        ));
        assert!(matches!(
            UpstreamError::from_status(418, None, "teapot"),
            UpstreamError::Status { status: 418, .. }
        ));
    }

    #[test]
    fn provider_status_for_logging() {
        assert_eq!(UpstreamError::NotFound.status(), 404);
        assert_eq!(UpstreamError::RateLimited { retry_after: None }.status(), 429);
        assert_eq!(UpstreamError::Server { status: 502 }.status(), 502);
        assert_eq!(UpstreamError::Malformed("x".into()).status(), 200);
        assert_eq!(UpstreamError::Unreachable("refused".into()).status(), 0);
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(WeatherError::Configuration("x".into()).http_status(), 500);
        assert_eq!(WeatherError::InvalidQuery("x".into()).http_status(), 400);
        assert_eq!(WeatherError::from(UpstreamError::NotFound).http_status(), 404);
        assert_eq!(WeatherError::from(UpstreamError::Unauthorized).http_status(), 502);
        assert_eq!(WeatherError::Render("x".into()).http_status(), 502);
    }

    #[test]
    fn user_message_hides_technical_detail() {
        let err = WeatherError::Render("missing field `main.temp`".into());
        assert!(!err.user_message().contains("main.temp"));
        assert!(err.to_string().contains("main.temp"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }
}
