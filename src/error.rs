use reqwest::StatusCode;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network, timeout or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },
    /// Request body could not be encoded for the wire.
    #[error("encode error: {0}")]
    Encode(String),
    /// Successful response whose body does not match the expected content type.
    #[error("decode error: {message}")]
    Decode {
        status: u16,
        message: String,
        body: String,
    },
    /// The private runtime behind a blocking call could not be started.
    #[error("runtime error: {0}")]
    Runtime(std::io::Error),
}

impl FetchError {
    /// HTTP status of the failed attempt, `0` when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            Self::Transport(err) => err.status().map_or(0, |status| status.as_u16()),
            Self::Http { status, .. } | Self::Decode { status, .. } => *status,
            Self::Encode(_) | Self::Runtime(_) => 0,
        }
    }

    /// Reason phrase matching [`FetchError::status`], empty when unknown.
    pub fn status_text(&self) -> String {
        match self {
            Self::Http { status_text, .. } => status_text.clone(),
            _ => StatusCode::from_u16(self.status())
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or_default()
                .to_owned(),
        }
    }

    /// Raw response body, if a response was received.
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } | Self::Decode { body, .. } => Some(body),
            Self::Transport(_) | Self::Encode(_) | Self::Runtime(_) => None,
        }
    }

    /// Coarse failure class: `"timeout"`, `"parsererror"` or `"error"`.
    pub fn text_status(&self) -> &'static str {
        match self {
            Self::Transport(err) if err.is_timeout() => "timeout",
            Self::Decode { .. } => "parsererror",
            _ => "error",
        }
    }

    /// Human-readable description of what went wrong.
    pub fn description(&self) -> String {
        match self {
            Self::Transport(err) => err.to_string(),
            Self::Http { status_text, .. } => status_text.clone(),
            Self::Encode(message) => message.clone(),
            Self::Decode { message, .. } => message.clone(),
            Self::Runtime(err) => err.to_string(),
        }
    }

    /// Whether the failure may resolve on its own (timeout, unavailable,
    /// gateway error).
    ///
    /// Transport failures count as status `0`. Builder errors (such as an
    /// unparsable URL) never reach the network and are not transient.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => {
                !err.is_builder() && crate::retry::is_retryable_status(self.status())
            }
            Self::Http { status, .. } => crate::retry::is_retryable_status(*status),
            Self::Encode(_) | Self::Decode { .. } | Self::Runtime(_) => false,
        }
    }
}
