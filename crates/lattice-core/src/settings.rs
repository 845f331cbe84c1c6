use std::time::Duration;

use crate::state::Snapshot;
use crate::types::{Address, Raw, WorkThreshold, RECEIVE_THRESHOLD, SEND_THRESHOLD};

/// Receivable blocks below this amount (10^24 raw) are ignored by default.
pub const DEFAULT_MIN_RECEIVABLE: u128 = 1_000_000_000_000_000_000_000_000;
pub const DEFAULT_RECEIVABLE_COUNT: u32 = 100;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wallet configuration. Endpoint lists are consumed when the node client
/// is constructed; later changes to them do not rewire the client.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSettings {
    pub rpc_endpoints: Vec<String>,
    pub work_endpoints: Vec<String>,
    /// Used for blocks when the account has no representative of its own.
    pub default_representative: Option<Address>,
    pub min_receivable: Raw,
    pub receivable_count: u32,
    /// Applied to each endpoint attempt separately.
    pub request_timeout: Duration,
    pub send_threshold: WorkThreshold,
    pub receive_threshold: WorkThreshold,
    /// Generate work for every new frontier in the background.
    pub precompute_work: bool,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            rpc_endpoints: Vec::new(),
            work_endpoints: Vec::new(),
            default_representative: None,
            min_receivable: Raw::from(DEFAULT_MIN_RECEIVABLE),
            receivable_count: DEFAULT_RECEIVABLE_COUNT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            send_threshold: SEND_THRESHOLD,
            receive_threshold: RECEIVE_THRESHOLD,
            precompute_work: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WalletSettingsPatch {
    pub rpc_endpoints: Option<Vec<String>>,
    pub work_endpoints: Option<Vec<String>>,
    pub default_representative: Option<Option<Address>>,
    pub min_receivable: Option<Raw>,
    pub receivable_count: Option<u32>,
    pub request_timeout: Option<Duration>,
    pub send_threshold: Option<WorkThreshold>,
    pub receive_threshold: Option<WorkThreshold>,
    pub precompute_work: Option<bool>,
}

impl Snapshot for WalletSettings {
    type Patch = WalletSettingsPatch;

    fn apply(&mut self, patch: WalletSettingsPatch) {
        let WalletSettingsPatch {
            rpc_endpoints,
            work_endpoints,
            default_representative,
            min_receivable,
            receivable_count,
            request_timeout,
            send_threshold,
            receive_threshold,
            precompute_work,
        } = patch;

        if let Some(v) = rpc_endpoints {
            self.rpc_endpoints = v;
        }
        if let Some(v) = work_endpoints {
            self.work_endpoints = v;
        }
        if let Some(v) = default_representative {
            self.default_representative = v;
        }
        if let Some(v) = min_receivable {
            self.min_receivable = v;
        }
        if let Some(v) = receivable_count {
            self.receivable_count = v;
        }
        if let Some(v) = request_timeout {
            self.request_timeout = v;
        }
        if let Some(v) = send_threshold {
            self.send_threshold = v;
        }
        if let Some(v) = receive_threshold {
            self.receive_threshold = v;
        }
        if let Some(v) = precompute_work {
            self.precompute_work = v;
        }
    }
}
