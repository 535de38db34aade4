//! Minimal HTTP transport boundary.
//!
//! All upstream I/O goes through the [`HttpTransport`] trait so the fetch
//! pipeline can be exercised against scripted responses in tests without
//! touching the network.

use async_trait::async_trait;
use thiserror::Error;

/// HTTP headers represented as key/value pairs.
///
/// Header names are treated case-insensitively by helper functions.
pub type HttpHeaders = Vec<(String, String)>;

/// A GET request to the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HttpHeaders,
}

/// A provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no scripted response for GET {url}")]
    NoScriptedResponse { url: String },
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Get the first header value matching `name` (case-insensitive).
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// A real HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hubsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.client.get(&request.url);
        for (k, v) in request.headers {
            builder = builder.header(k, v);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|value| (k.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Scripted transport for tests.
///
/// Responses are registered per URL suffix and consumed in order, so a test
/// can script "403 then 200" for the same resource. A `Transport` error can
/// be scripted by pushing `Err` into the queue.
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    type Scripted = Result<HttpResponse, String>;

    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<Vec<(String, VecDeque<Scripted>)>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response for requests whose URL contains `url_part`.
        pub fn push(&self, url_part: &str, response: HttpResponse) {
            self.push_scripted(url_part, Ok(response));
        }

        /// Queue a transport-level error for requests matching `url_part`.
        pub fn push_error(&self, url_part: &str, message: &str) {
            self.push_scripted(url_part, Err(message.to_string()));
        }

        fn push_scripted(&self, url_part: &str, scripted: Scripted) {
            let mut responses = self.responses.lock().expect("mock lock");
            if let Some((_, queue)) = responses.iter_mut().find(|(p, _)| p == url_part) {
                queue.push_back(scripted);
            } else {
                responses.push((url_part.to_string(), VecDeque::from([scripted])));
            }
        }

        /// URLs requested so far, in order.
        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().expect("mock lock").clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.requests
                .lock()
                .expect("mock lock")
                .push(request.url.clone());

            let mut responses = self.responses.lock().expect("mock lock");
            let scripted = responses
                .iter_mut()
                .find(|(part, queue)| request.url.contains(part.as_str()) && !queue.is_empty())
                .and_then(|(_, queue)| queue.pop_front());

            match scripted {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(HttpError::Transport(message)),
                None => Err(HttpError::NoScriptedResponse { url: request.url }),
            }
        }
    }

    /// Build a JSON response with the given status and rate-limit headers.
    pub fn json_response(
        status: u16,
        body: &serde_json::Value,
        remaining: Option<u32>,
        reset_epoch: Option<i64>,
    ) -> HttpResponse {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(remaining) = remaining {
            headers.push(("x-ratelimit-remaining".to_string(), remaining.to_string()));
        }
        if let Some(reset) = reset_epoch {
            headers.push(("x-ratelimit-reset".to_string(), reset.to_string()));
        }
        HttpResponse {
            status,
            headers,
            body: serde_json::to_vec(body).expect("serialize mock body"),
        }
    }
}
