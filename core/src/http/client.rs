use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Proxy, Response};

use super::USER_AGENT;

/// Shared wrapper around a single reqwest client.
///
/// Certificate validation is deliberately disabled: probe targets routinely
/// sit behind self-signed or mismatched certificates, and reachability
/// matters more than trust for a scanner.
pub struct HttpClient {
    inner: Client,
    default_headers: HeaderMap,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(
        timeout_seconds: u64,
        proxy_url: Option<&str>,
        custom_headers: &[(String, String)],
    ) -> Self {
        let timeout = Duration::from_secs(timeout_seconds);

        let mut builder = ClientBuilder::new()
            .timeout(timeout)
            .danger_accept_invalid_certs(true);

        if let Some(proxy) = proxy_url {
            if let Ok(p) = Proxy::all(proxy) {
                builder = builder.proxy(p);
            }
        }

        let inner = builder.build().expect("failed to build reqwest client");

        let mut default_headers = HeaderMap::new();
        for (key, val) in custom_headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(val),
            ) {
                default_headers.insert(name, value);
            }
        }

        Self {
            inner,
            default_headers,
            timeout,
        }
    }

    pub async fn get(&self, url: &str) -> Result<Response, reqwest::Error> {
        let mut req = self
            .inner
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout);

        for (name, value) in self.default_headers.iter() {
            req = req.header(name, value);
        }

        req.send().await
    }
}
