use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CoreError, RpcError};

use super::http_adapter::parse_endpoint;
use super::protocol::split_node_error;

/// One request/response exchange with a single endpoint.
///
/// Implementations return the decoded JSON body of a successful exchange
/// and classify everything else as an [`RpcError`]. They do not interpret
/// node-level `error` fields; [`FailoverClient`] does that.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        endpoint: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, RpcError>;
}

// ==============================================================================
// FailoverClient: ordered endpoint list, one attempt per endpoint
// ==============================================================================

pub struct FailoverClient<T> {
    label: &'static str,
    endpoints: Vec<Url>,
    transport: T,
    timeout: Duration,
}

impl<T: Transport> FailoverClient<T> {
    /// Validate `endpoints` and build a client. `label` names the list in
    /// errors and logs (`"rpc"`, `"work"`).
    pub fn new(
        label: &'static str,
        endpoints: &[String],
        transport: T,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        if endpoints.is_empty() {
            return Err(CoreError::NoEndpoints(label));
        }
        let endpoints = endpoints
            .iter()
            .map(|endpoint| parse_endpoint(endpoint))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            label,
            endpoints,
            transport,
            timeout,
        })
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// Send `request` to the first endpoint whose reply `decode` accepts.
    ///
    /// Transient failures, including a reply `decode` rejects, move on to
    /// the next endpoint; a node-level error is returned immediately. When
    /// every endpoint fails, the last transient error is returned.
    pub async fn send<R, D, O>(&self, request: &R, decode: D) -> Result<O, CoreError>
    where
        R: Serialize + Sync + ?Sized,
        D: Fn(serde_json::Value) -> Result<O, RpcError> + Sync,
        O: Send,
    {
        let body = serde_json::to_value(request)
            .map_err(|e| CoreError::InvalidData(format!("serialize RPC request: {e}")))?;
        let action = body
            .get("action")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown")
            .to_owned();

        let mut last_error = None;
        for (attempt, endpoint) in self.endpoints.iter().enumerate() {
            debug!(
                rpc.list = self.label,
                rpc.action = %action,
                rpc.endpoint = %endpoint,
                attempt = attempt + 1,
                "rpc call"
            );

            let outcome = self
                .transport
                .post(endpoint, &body, self.timeout)
                .await
                .and_then(split_node_error)
                .and_then(&decode);

            match outcome {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_transient() => {
                    warn!(
                        rpc.list = self.label,
                        rpc.action = %action,
                        rpc.endpoint = %endpoint,
                        error = %err,
                        "endpoint failed; trying next"
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        warn!(
            rpc.list = self.label,
            rpc.action = %action,
            attempts = self.endpoints.len(),
            "all endpoints failed"
        );
        Err(last_error
            .unwrap_or_else(|| RpcError::InvalidResponse("no endpoint attempted".to_owned()))
            .into())
    }
}
