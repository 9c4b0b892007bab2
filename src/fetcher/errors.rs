use thiserror::Error;

/// Failures while loading page content. All of these are fatal to the
/// analysis of the URL they occur on; retriable kinds are retried inside the
/// fetcher before surfacing.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("dns failure: {0}")]
    Dns(String),

    #[error("tls error: {0}")]
    Tls(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http {
        status: reqwest::StatusCode,
        retriable: bool,
    },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("render failure: {0}")]
    RenderFailure(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn should_retry(&self) -> bool {
        match self {
            // Fatal for this URL, retrying cannot help
            Self::InvalidUrl(_) => false,
            Self::BodyTooLarge(_) => false,
            Self::UnsupportedContentType(_) => false,
            Self::Charset(_) => false,
            Self::RenderFailure(_) => false,
            Self::Http { retriable, .. } => *retriable,

            // Transient
            Self::Dns(_) => true,
            Self::Tls(_) => true,
            Self::ConnectTimeout => true,
            Self::RequestTimeout => true,
            Self::RedirectLoop => true,
            Self::Io(_) => true,
            Self::Unknown(_) => true,
        }
    }

    /// Coarse error kind for the report boundary and log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectTimeout | Self::RequestTimeout => "timeout",
            Self::Http { .. } => "http_status",
            Self::RenderFailure(_) => "render_failure",
            _ => "network",
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http {
                status,
                retriable: status.is_server_error(),
            }
        } else if err.is_request() {
            // DNS, connection errors
            Self::Dns(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(FetchError::RequestTimeout.kind(), "timeout");
        assert_eq!(FetchError::ConnectTimeout.kind(), "timeout");
        assert_eq!(
            FetchError::RenderFailure("browser crashed".into()).kind(),
            "render_failure"
        );
        assert_eq!(FetchError::Dns("nope".into()).kind(), "network");
        assert_eq!(
            FetchError::Http {
                status: reqwest::StatusCode::NOT_FOUND,
                retriable: false,
            }
            .kind(),
            "http_status"
        );
    }

    #[test]
    fn test_retry_policy() {
        assert!(FetchError::RequestTimeout.should_retry());
        assert!(!FetchError::RenderFailure("x".into()).should_retry());
        assert!(!FetchError::BodyTooLarge(1).should_retry());
        assert!(
            FetchError::Http {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                retriable: true,
            }
            .should_retry()
        );
    }
}
