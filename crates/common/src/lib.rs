//! Shared primitive types for the drip faucet.

pub mod amount;
pub mod types;

pub use amount::{format_ether, parse_ether, AmountError};
pub use types::{Address, ParseError, TxHash, ADDRESS_LENGTH, TX_HASH_LENGTH};
