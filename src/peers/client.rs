//! Outbound peer client.

use async_trait::async_trait;
use prost::Message;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::{FetchRequest, FetchResponse};
use crate::peers::PeerGetter;

/// Fetches keys from one peer's cache endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    addr: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    /// `addr` is the peer's URL (e.g. `http://10.0.0.2:8001`), `base_path` the
    /// path its cache endpoint is mounted under.
    pub fn new(addr: impl Into<String>, base_path: &str, client: reqwest::Client) -> Self {
        let addr = addr.into();
        let base_url = format!("{}{}", addr.trim_end_matches('/'), base_path);
        Self {
            addr,
            base_url,
            client,
        }
    }

    /// URL for `req`: `<base_url><group>/<key>`, both segments escaped.
    pub fn url_for(&self, req: &FetchRequest) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(&req.group),
            urlencoding::encode(&req.key)
        )
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, req: &FetchRequest) -> Result<FetchResponse> {
        let url = self.url_for(req);
        debug!(peer = %self.addr, %url, "fetching from peer");

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::peer(&self.addr, e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(CacheError::peer(
                &self.addr,
                format!("server returned: {status}"),
            ));
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| CacheError::peer(&self.addr, format!("reading response body: {e}")))?;

        FetchResponse::decode(body)
            .map_err(|e| CacheError::peer(&self.addr, format!("decoding response body: {e}")))
    }

    fn addr(&self) -> &str {
        &self.addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_escapes_segments() {
        let getter = HttpGetter::new(
            "http://10.0.0.2:8001/",
            "/_peercache/",
            reqwest::Client::new(),
        );
        let url = getter.url_for(&FetchRequest::new("my scores", "a/b?c"));

        assert_eq!(url, "http://10.0.0.2:8001/_peercache/my%20scores/a%2Fb%3Fc");
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let getter = HttpGetter::new(addr, "/_peercache/", reqwest::Client::new());
        let err = getter
            .get(&FetchRequest::new("scores", "Tom"))
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::Peer { .. }));
    }
}
