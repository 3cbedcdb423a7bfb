use std::io;
use std::time::Duration;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::{HeaderMap, Method, Request, Response, Transport};

/// reqwest-backed transport for daemons reachable over `https://` (rustls).
///
/// Also usable for plain `http://` when connection reuse matters more than the
/// zero-dependency socket path.
#[derive(Debug, Clone)]
pub struct RemoteTransport {
    client: reqwest::blocking::Client,
}

impl RemoteTransport {
    /// Build a client with the given overall request timeout (`None`: no timeout).
    pub fn new(timeout: Option<Duration>) -> io::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(io::Error::other)?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client (custom roots, client identity, proxies).
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for RemoteTransport {
    #[cfg_attr(feature = "telemetry", instrument(level = "trace", skip_all))]
    fn send(&self, request: Request) -> io::Result<Response> {
        let Request {
            method,
            uri,
            headers,
            body,
        } = request;
        let method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, uri);
        for (k, v) in &headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let resp = builder.send().map_err(io::Error::other)?;

        let status = resp.status().as_u16();
        let headers: HeaderMap = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        Ok(Response::new(status, headers, Box::new(resp)))
    }
}
