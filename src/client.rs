use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use serde::Serialize;

// tokio::time::sleep is only available on non-WASM targets.
#[cfg(not(target_arch = "wasm32"))]
use tokio::time::sleep;

#[cfg(target_arch = "wasm32")]
use gloo_timers::future::sleep;

use crate::{
    busy::BusyIndicator,
    report::{Alert, DefaultAlert, ErrorContext},
    response::decode_payload,
    retry::{RetryPolicy, Step},
    ClientOptions, FetchError, Method, RequestDescriptor, Result, Success,
};

#[derive(Clone)]
/// Resilient HTTP client for ERMrest catalog requests.
///
/// Every attempt is bounded by [`ClientOptions::timeout_ms`]; transient
/// failures are retried with jittered exponential backoff while the
/// attempt number is within [`ClientOptions::max_retries`].
pub struct FetchClient {
    http: reqwest::Client,
    options: ClientOptions,
    busy: BusyIndicator,
    alert: Arc<dyn Alert>,
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("options", &self.options)
            .field("busy", &self.busy)
            .finish()
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Creates a client with default options, a private busy indicator and
    /// the default alert sink.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            options: ClientOptions::default(),
            busy: BusyIndicator::new(),
            alert: Arc::new(DefaultAlert),
        }
    }

    /// Applies client options such as timeout, retry behavior and headers.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Shares `busy` with the embedding application.
    ///
    /// In the browser, [`BusyIndicator::wait_cursor`] reproduces the classic
    /// wait cursor.
    pub fn with_busy_indicator(mut self, busy: BusyIndicator) -> Self {
        self.busy = busy;
        self
    }

    /// Replaces the sink used for failures nobody handled.
    pub fn with_alert(mut self, alert: impl Alert + 'static) -> Self {
        self.alert = Arc::new(alert);
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn busy_indicator(&self) -> &BusyIndicator {
        &self.busy
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.options)
    }

    /// Reads the JSON document at `url`.
    pub async fn get(&self, url: impl Into<String>) -> Result<Success> {
        self.fetch(RequestDescriptor::new(Method::Get, url)).await
    }

    /// Sends `body` as JSON and returns the text acknowledgment.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        url: impl Into<String>,
        body: &T,
    ) -> Result<Success> {
        let request = RequestDescriptor::new(Method::Post, url)
            .with_content_type("application/json")
            .with_json_body(to_json(body)?);
        self.execute(request).await
    }

    /// Sends `body` as JSON and returns the JSON response.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        url: impl Into<String>,
        body: &T,
    ) -> Result<Success> {
        let request = RequestDescriptor::new(Method::Put, url)
            .with_content_type("application/json")
            .with_json_body(to_json(body)?);
        self.fetch(request).await
    }

    /// Deletes the resource at `url`.
    pub async fn delete(&self, url: impl Into<String>) -> Result<Success> {
        self.remove(RequestDescriptor::new(Method::Delete, url)).await
    }

    /// Generic read operation; the response is decoded as the request's
    /// method dictates.
    pub async fn fetch(&self, request: RequestDescriptor) -> Result<Success> {
        self.execute(request).await
    }

    /// Generic delete operation. The method is forced to DELETE and any
    /// body is dropped.
    pub async fn remove(&self, request: RequestDescriptor) -> Result<Success> {
        let request = RequestDescriptor {
            method: Method::Delete,
            body: None,
            ..request
        };
        self.execute(request).await
    }

    /// Runs `request` to its final outcome, retrying transient failures.
    ///
    /// The busy indicator stays raised until the outcome is known, pending
    /// retries included.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Success> {
        self.run(request).await.map_err(ErrorContext::into_error)
    }

    /// Runs `request` and hands the outcome to a continuation.
    ///
    /// `on_success` receives the decoded response and `param`. Terminal
    /// failures are shown through the client's alert sink.
    pub async fn dispatch<P, S>(&self, request: RequestDescriptor, on_success: S, param: P)
    where
        S: FnOnce(Success, P),
    {
        self.dispatch_with_handler(
            request,
            on_success,
            param,
            |ctx: ErrorContext, _, _| ctx.alert(),
        )
        .await
    }

    /// Like [`FetchClient::dispatch`], but terminal failures go to
    /// `on_error` instead of the alert sink.
    ///
    /// `on_error` also receives the unused `on_success` and `param`, so it
    /// can resume them with [`ErrorContext::retry_dispatch`].
    pub async fn dispatch_with_handler<P, S, E>(
        &self,
        request: RequestDescriptor,
        on_success: S,
        param: P,
        on_error: E,
    ) where
        S: FnOnce(Success, P),
        E: FnOnce(ErrorContext, S, P),
    {
        match self.run(request).await {
            Ok(success) => on_success(success, param),
            Err(ctx) => on_error(ctx, on_success, param),
        }
    }

    /// Fire-and-forget [`FetchClient::dispatch`] on the tokio runtime.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn_dispatch<P, S>(
        &self,
        request: RequestDescriptor,
        on_success: S,
        param: P,
    ) -> tokio::task::JoinHandle<()>
    where
        P: Send + 'static,
        S: FnOnce(Success, P) + Send + 'static,
    {
        self.spawn_dispatch_with_handler(
            request,
            on_success,
            param,
            |ctx: ErrorContext, _, _| ctx.alert(),
        )
    }

    /// Fire-and-forget [`FetchClient::dispatch_with_handler`] on the tokio
    /// runtime.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn_dispatch_with_handler<P, S, E>(
        &self,
        request: RequestDescriptor,
        on_success: S,
        param: P,
        on_error: E,
    ) -> tokio::task::JoinHandle<()>
    where
        P: Send + 'static,
        S: FnOnce(Success, P) + Send + 'static,
        E: FnOnce(ErrorContext, S, P) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            client
                .dispatch_with_handler(request, on_success, param, on_error)
                .await
        })
    }

    /// Fire-and-forget [`FetchClient::dispatch`] on the browser event loop.
    #[cfg(target_arch = "wasm32")]
    pub fn spawn_dispatch<P, S>(&self, request: RequestDescriptor, on_success: S, param: P)
    where
        P: 'static,
        S: FnOnce(Success, P) + 'static,
    {
        self.spawn_dispatch_with_handler(
            request,
            on_success,
            param,
            |ctx: ErrorContext, _, _| ctx.alert(),
        )
    }

    /// Fire-and-forget [`FetchClient::dispatch_with_handler`] on the browser
    /// event loop.
    #[cfg(target_arch = "wasm32")]
    pub fn spawn_dispatch_with_handler<P, S, E>(
        &self,
        request: RequestDescriptor,
        on_success: S,
        param: P,
        on_error: E,
    ) where
        P: 'static,
        S: FnOnce(Success, P) + 'static,
        E: FnOnce(ErrorContext, S, P) + 'static,
    {
        let client = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            client
                .dispatch_with_handler(request, on_success, param, on_error)
                .await
        });
    }

    /// Blocks the calling thread until `request` completes.
    ///
    /// Drives [`FetchClient::execute`] on a private current-thread runtime
    /// with its own connection pool. Panics if called from within an async
    /// runtime.
    #[cfg(not(target_arch = "wasm32"))]
    #[deprecated(note = "blocks the calling thread; await `FetchClient::execute` instead")]
    pub fn execute_blocking(&self, request: RequestDescriptor) -> Result<Success> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FetchError::Runtime)?;
        let client = Self {
            http: reqwest::Client::new(),
            ..self.clone()
        };
        runtime.block_on(client.execute(request))
    }

    pub(crate) fn alert(&self, message: &str) {
        self.alert.alert(message);
    }

    async fn run(
        &self,
        mut request: RequestDescriptor,
    ) -> std::result::Result<Success, ErrorContext> {
        let _busy = self.busy.acquire();
        let policy = self.retry_policy();
        loop {
            let outcome = self.send_once(&request).await;
            match policy.next_step(request.attempt, outcome) {
                Step::Completed(Ok(success)) => return Ok(success),
                Step::Completed(Err(err)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        method = request.method.as_str(),
                        url = %request.url,
                        attempt = request.attempt,
                        status = err.status(),
                        "request failed: {}",
                        err
                    );
                    return Err(ErrorContext::new(err, request, self.clone()));
                }
                Step::ScheduleRetry(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        method = request.method.as_str(),
                        url = %request.url,
                        attempt = request.attempt,
                        "retrying request after {} ms",
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    request = request.next_attempt();
                }
            }
        }
    }

    async fn send_once(&self, request: &RequestDescriptor) -> Result<Success> {
        let encoded = request.encode()?;
        let kind = request.method.response_kind();

        // On WASM, reqwest uses AbortController for timeout; the
        // `.timeout()` method is available on both targets.
        let mut builder = self
            .http
            .request(request.method.to_reqwest(), &encoded.url)
            .header(header::ACCEPT, kind.accept())
            .timeout(Duration::from_millis(self.options.timeout_ms));
        for (name, value) in &self.options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = &request.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
        }
        if let Some(body) = encoded.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(FetchError::Transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(FetchError::Transport)?;
        let status_text = status.canonical_reason().unwrap_or_default().to_owned();

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text,
                body,
            });
        }

        Ok(Success {
            data: decode_payload(kind, status.as_u16(), body)?,
            status: status.as_u16(),
            status_text,
            headers,
        })
    }
}

fn to_json<T: Serialize + ?Sized>(body: &T) -> Result<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|err| FetchError::Encode(format!("body is not serializable as JSON: {err}")))
}
