use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{header, Url};
use tracing::{debug, trace};

use crate::error::{CoreError, RpcError};
use crate::settings::WalletSettings;

use super::super::failover::{FailoverClient, Transport};
use super::super::node::NodeClient;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Node client over HTTP(S) with independent RPC and work endpoint lists.
pub type HttpRpcClient = NodeClient<HttpTransport>;

/// JSON-over-HTTP transport shared by every endpoint of a list.
///
/// Cloning is cheap: the connection pool and rate limiter are shared.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl HttpTransport {
    /// If `requests_per_second` is set, every outbound request (across all
    /// endpoints using this transport) waits for the limiter.
    pub fn new(requests_per_second: Option<u32>) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(RpcError::Transport)?;

        let limiter = match requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::InvalidData("requests_per_second must be at least 1".to_owned())
                })?;
                Some(Arc::new(RateLimiter::direct(Quota::per_second(limit))))
            }
        };

        Ok(Self { client, limiter })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        endpoint: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, RpcError> {
        self.wait_for_rate_limit().await;

        let response = self
            .client
            .post(endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;
        let status = response.status();

        let text = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;
        debug!(%endpoint, %status, body_len = text.len(), "rpc response");
        trace!(%endpoint, body = %text, "rpc response body");

        if !status.is_success() {
            return Err(RpcError::HttpStatus(status.as_u16()));
        }

        serde_json::from_str(&text)
            .map_err(|e| RpcError::InvalidResponse(format!("decode JSON response: {e}; body={text}")))
    }
}

fn classify_reqwest_error(err: reqwest::Error, timeout: Duration) -> RpcError {
    if err.is_timeout() {
        RpcError::Timeout(timeout)
    } else {
        RpcError::Transport(err)
    }
}

impl NodeClient<HttpTransport> {
    /// Build both failover lists from `settings`. Each list must be non-empty
    /// and every entry a well-formed HTTP(S) URL.
    pub fn from_settings(
        settings: &WalletSettings,
        requests_per_second: Option<u32>,
    ) -> Result<Self, CoreError> {
        let transport = HttpTransport::new(requests_per_second)?;
        let rpc = FailoverClient::new(
            "rpc",
            &settings.rpc_endpoints,
            transport.clone(),
            settings.request_timeout,
        )?;
        let work = FailoverClient::new(
            "work",
            &settings.work_endpoints,
            transport,
            settings.request_timeout,
        )?;
        Ok(NodeClient::new(rpc, work))
    }
}
