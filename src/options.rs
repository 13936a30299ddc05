use serde::Deserialize;

/// Identifying header attached to every outgoing request by default.
pub const DEFAULT_USER_AGENT: (&str, &str) = ("User-Agent", "ERMREST/1.0");

/// Configures HTTP timeout, retry behavior and identifying headers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Highest attempt number that may still be retried.
    ///
    /// A failed attempt `n` is retried only while `n <= max_retries`.
    pub max_retries: u32,
    /// Backoff scale `k` in milliseconds; the delay before retrying attempt
    /// `n` is about `10^n * k`, jittered by ±25%.
    pub backoff_scale_ms: f64,
    /// Headers sent with every request.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 300_000,
            max_retries: 1,
            backoff_scale_ms: 1.0,
            headers: vec![(
                DEFAULT_USER_AGENT.0.to_owned(),
                DEFAULT_USER_AGENT.1.to_owned(),
            )],
        }
    }
}
