use std::fmt::{self, Write};

use crate::{FetchClient, FetchError, RequestDescriptor, Result, Success};

/// Sink that presents terminal failures to the user when the caller did not
/// supply an error handler.
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

impl<F> Alert for F
where
    F: Fn(&str) + Send + Sync,
{
    fn alert(&self, message: &str) {
        self(message)
    }
}

// tracing already carries the message when enabled
const ALERT_ON_STDERR: bool = cfg!(all(not(target_arch = "wasm32"), not(feature = "tracing")));

/// Browser `window.alert` on wasm. Elsewhere an error event when the
/// `tracing` feature is on, stderr otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAlert;

impl Alert for DefaultAlert {
    fn alert(&self, message: &str) {
        #[cfg(feature = "tracing")]
        tracing::error!("request failed\n{}", message);

        #[cfg(target_arch = "wasm32")]
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }

        if ALERT_ON_STDERR {
            eprint!("{message}");
        }
    }
}

/// Multi-line diagnostic shown for an unhandled terminal failure.
pub fn diagnostic_message(err: &FetchError, url: &str) -> String {
    let mut msg = String::new();
    let _ = writeln!(msg, "Status: {}", err.status());
    if let Some(text) = err.response_text() {
        let _ = writeln!(msg, "ResponseText: {text}");
    }
    let _ = writeln!(msg, "TextStatus: {}", err.text_status());
    let _ = writeln!(msg, "ErrorThrown: {}", err.description());
    let _ = writeln!(msg, "URL: {url}");
    msg
}

/// Everything an error handler needs to decide what to do with a terminal
/// failure: the failure itself, the request that produced it and a way to
/// issue it again.
pub struct ErrorContext {
    pub error: FetchError,
    pub request: RequestDescriptor,
    client: FetchClient,
}

impl fmt::Debug for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorContext")
            .field("error", &self.error)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl ErrorContext {
    pub(crate) fn new(error: FetchError, request: RequestDescriptor, client: FetchClient) -> Self {
        Self {
            error,
            request,
            client,
        }
    }

    pub fn status(&self) -> u16 {
        self.error.status()
    }

    pub fn status_text(&self) -> String {
        self.error.status_text()
    }

    pub fn response_text(&self) -> Option<&str> {
        self.error.response_text()
    }

    pub fn description(&self) -> String {
        self.error.description()
    }

    pub fn diagnostic_message(&self) -> String {
        diagnostic_message(&self.error, &self.request.url)
    }

    /// Presents the failure through the client's alert sink, the same way
    /// an unhandled failure would be.
    pub fn alert(&self) {
        self.client.alert(&self.diagnostic_message());
    }

    /// Issues the same request again as attempt `attempt + 1`.
    ///
    /// The retry runs under the client's usual policy, so a transient
    /// failure may still be retried automatically within the budget.
    pub async fn retry(self) -> Result<Success> {
        self.client.execute(self.request.next_attempt()).await
    }

    /// Issues the same request again as attempt `attempt + 1` and hands the
    /// outcome to the caller's original continuation.
    ///
    /// Pass the `on_success` and `param` the error handler received from
    /// [`FetchClient::dispatch_with_handler`].
    pub async fn retry_dispatch<P, S, E>(self, on_success: S, param: P, on_error: E)
    where
        S: FnOnce(Success, P),
        E: FnOnce(ErrorContext, S, P),
    {
        self.client
            .dispatch_with_handler(self.request.next_attempt(), on_success, param, on_error)
            .await
    }

    pub fn into_error(self) -> FetchError {
        self.error
    }
}
