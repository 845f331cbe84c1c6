pub mod account;
pub mod error;
pub mod primitives;
pub mod rpc;
pub mod settings;
pub mod state;
pub mod sync;
pub mod types;
pub mod wallet;
pub mod work;

#[cfg(test)]
pub(crate) mod test_util;

pub use account::AccountState;
pub use error::CoreError;
pub use settings::WalletSettings;
pub use state::StateStore;
pub use wallet::Wallet;
