use serde::Deserialize;

use crate::account::ReceivableBlock;
use crate::error::RpcError;
use crate::types::{Address, BlockHash, Raw, Work, WorkThreshold};

use super::types::{AccountInfo, WorkGenerated};

fn invalid(what: &str, err: impl std::fmt::Display) -> RpcError {
    RpcError::InvalidResponse(format!("invalid {what} result: {err}"))
}

#[derive(Deserialize)]
struct AccountInfoResponse {
    frontier: BlockHash,
    balance: Raw,
    representative: Option<Address>,
}

pub(super) fn parse_account_info(raw: serde_json::Value) -> Result<AccountInfo, RpcError> {
    let response: AccountInfoResponse =
        serde_json::from_value(raw).map_err(|e| invalid("account_info", e))?;
    Ok(AccountInfo {
        frontier: Some(response.frontier),
        balance: response.balance,
        representative: response.representative,
    })
}

/// Decode `{"blocks": {hash: amount}}`.
///
/// Nodes send `"blocks": ""` when nothing is receivable, and send
/// `{hash: {"amount": ..}}` entries when source details were requested.
pub(super) fn parse_receivable(raw: serde_json::Value) -> Result<Vec<ReceivableBlock>, RpcError> {
    let blocks = match raw.get("blocks") {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::String(s)) if s.is_empty() => return Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) if items.is_empty() => return Ok(Vec::new()),
        Some(serde_json::Value::Object(map)) => map,
        Some(other) => return Err(invalid("receivable", format!("unexpected blocks {other}"))),
    };

    blocks
        .iter()
        .map(|(hash, entry)| -> Result<ReceivableBlock, RpcError> {
            let hash: BlockHash = hash.parse().map_err(|e| invalid("receivable", e))?;
            let amount = match entry {
                serde_json::Value::String(amount) => amount.as_str(),
                serde_json::Value::Object(detail) => detail
                    .get("amount")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| invalid("receivable", format!("missing amount for {hash}")))?,
                other => {
                    return Err(invalid(
                        "receivable",
                        format!("unexpected amount {other} for {hash}"),
                    ))
                }
            };
            let amount: Raw = amount.parse().map_err(|e| invalid("receivable", e))?;
            Ok(ReceivableBlock { hash, amount })
        })
        .collect()
}

#[derive(Deserialize)]
struct WorkGenerateResponse {
    work: Option<Work>,
    difficulty: Option<WorkThreshold>,
}

pub(super) fn parse_work_generate(raw: serde_json::Value) -> Result<WorkGenerated, RpcError> {
    let response: WorkGenerateResponse =
        serde_json::from_value(raw).map_err(|e| invalid("work_generate", e))?;
    Ok(WorkGenerated {
        work: response.work.filter(|work| !work.as_str().is_empty()),
        difficulty: response.difficulty,
    })
}

#[derive(Deserialize)]
struct ProcessResponse {
    hash: BlockHash,
}

pub(super) fn parse_process(raw: serde_json::Value) -> Result<BlockHash, RpcError> {
    let response: ProcessResponse =
        serde_json::from_value(raw).map_err(|e| invalid("process", e))?;
    Ok(response.hash)
}
