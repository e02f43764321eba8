use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::fmt;
use std::thread;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) lukhed-sports/0.5";
const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_PAUSE: Duration = Duration::from_secs(2);

/// Blocking JSON client shared by the provider wrappers.
///
/// Transient failures (connection errors and 5xx responses) are retried a
/// fixed number of times with a fixed pause in between.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    attempts: u32,
    retry_pause: Duration,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(15),
            attempts: DEFAULT_ATTEMPTS,
            retry_pause: DEFAULT_RETRY_PAUSE,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    RateLimited(String),
    Other(String),
}

impl ApiError {
    fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(..) => true,
            ApiError::Api(e, _) => e.status().map(|s| s.is_server_error()).unwrap_or(false),
            _ => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::RateLimited(msg) => write!(f, "Rate limited: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the attempt count (minimum 1) and the pause between attempts.
    pub fn with_retry(mut self, attempts: u32, pause: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.retry_pause = pause;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// GET `url` and decode the body as JSON, sending any extra `headers`.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str, headers: &[(&str, &str)]) -> ApiResult<T> {
        self.get_json_with_headers(url, headers).map(|(body, _)| body)
    }

    /// Like [`HttpClient::get_json`], also returning the response headers.
    pub fn get_json_with_headers<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> ApiResult<(T, HeaderMap)> {
        let mut attempt = 1;
        loop {
            match self.get_once(url, headers) {
                Err(e) if e.is_transient() && attempt < self.attempts => {
                    warn!("request failed (attempt {attempt}/{}): {e}", self.attempts);
                    attempt += 1;
                    thread::sleep(self.retry_pause);
                }
                result => return result,
            }
        }
    }

    fn get_once<T: DeserializeOwned>(&self, url: &str, headers: &[(&str, &str)]) -> ApiResult<(T, HeaderMap)> {
        debug!("GET {url}");
        let mut request = self.client.get(url).timeout(self.timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request
            .send()
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => {
                let response_headers = res.headers().clone();
                let body = res
                    .json::<T>()
                    .map_err(|e| ApiError::Parsing(e, url.to_owned()))?;
                Ok((body, response_headers))
            }
            Err(e) => {
                if e.status().map(|s| s.as_u16() == 404).unwrap_or(false) {
                    Err(ApiError::NotFound(url.to_owned()))
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}
