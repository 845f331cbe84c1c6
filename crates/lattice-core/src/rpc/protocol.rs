use crate::error::RpcError;
use crate::types::{Address, BlockHash, WorkThreshold};

use super::types::BlockSubtype;

/// Request bodies for the node actions we call. Every request is a flat
/// JSON object tagged by `action`; numeric parameters travel as strings.
#[derive(serde::Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(super) enum NodeRequest<'a> {
    AccountInfo {
        account: &'a Address,
        representative: &'static str,
    },
    Receivable {
        account: &'a Address,
        count: String,
        threshold: String,
    },
    WorkGenerate {
        hash: &'a BlockHash,
        difficulty: WorkThreshold,
    },
    Process {
        json_block: &'static str,
        subtype: BlockSubtype,
        block: &'a serde_json::Value,
    },
}

/// Separate a node's application-level error from a successful reply.
///
/// Nodes answer a rejected request with HTTP 200 and `{"error": "..."}`.
/// That shape is final for the request. Anything that is not a JSON object
/// is a broken endpoint and stays transient.
pub(super) fn split_node_error(body: serde_json::Value) -> Result<serde_json::Value, RpcError> {
    let Some(object) = body.as_object() else {
        return Err(RpcError::InvalidResponse(format!(
            "expected a JSON object, got {body}"
        )));
    };

    match object.get("error") {
        None => Ok(body),
        Some(serde_json::Value::String(message)) => Err(RpcError::Node(message.clone())),
        Some(other) => Err(RpcError::InvalidResponse(format!(
            "non-standard node error: {other}"
        ))),
    }
}
