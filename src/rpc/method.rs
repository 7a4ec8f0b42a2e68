//! Supported JSON-RPC methods
//!
//! Each method carries the fixed parameter list sent with every call.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::RpcError;

/// Block tag used for `eth_getBlockByNumber`
pub const DEFAULT_BLOCK_TAG: &str = "latest";

/// Whether `eth_getBlockByNumber` asks for full transaction objects
pub const DEFAULT_FULL_TRANSACTIONS: bool = false;

/// JSON-RPC method under benchmark
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcMethod {
    /// `eth_blockNumber` with no params
    #[serde(rename = "eth_blockNumber")]
    BlockNumber,
    /// `eth_getBlockByNumber` for the latest block header
    #[serde(rename = "eth_getBlockByNumber")]
    GetBlockByNumber,
}

impl RpcMethod {
    /// All supported methods
    pub fn all() -> Vec<RpcMethod> {
        vec![RpcMethod::BlockNumber, RpcMethod::GetBlockByNumber]
    }

    /// Wire name of the method
    pub fn name(&self) -> &'static str {
        match self {
            RpcMethod::BlockNumber => "eth_blockNumber",
            RpcMethod::GetBlockByNumber => "eth_getBlockByNumber",
        }
    }

    /// Fixed params sent with every call
    pub fn params(&self) -> Value {
        match self {
            RpcMethod::BlockNumber => json!([]),
            RpcMethod::GetBlockByNumber => json!([DEFAULT_BLOCK_TAG, DEFAULT_FULL_TRANSACTIONS]),
        }
    }

    /// Short human description
    pub fn description(&self) -> &'static str {
        match self {
            RpcMethod::BlockNumber => "Current block height",
            RpcMethod::GetBlockByNumber => "Latest block, transaction hashes only",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RpcMethod {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "eth_blockNumber" => Ok(RpcMethod::BlockNumber),
            "eth_getBlockByNumber" => Ok(RpcMethod::GetBlockByNumber),
            other => Err(RpcError::UnsupportedMethod(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            "eth_blockNumber".parse::<RpcMethod>().unwrap(),
            RpcMethod::BlockNumber
        );
        assert_eq!(
            " eth_getBlockByNumber ".parse::<RpcMethod>().unwrap(),
            RpcMethod::GetBlockByNumber
        );
        assert!("eth_call".parse::<RpcMethod>().is_err());
        assert!("ETH_BLOCKNUMBER".parse::<RpcMethod>().is_err());
    }

    #[test]
    fn test_method_params() {
        assert_eq!(RpcMethod::BlockNumber.params(), json!([]));
        assert_eq!(RpcMethod::GetBlockByNumber.params(), json!(["latest", false]));
    }

    #[test]
    fn test_method_serde_uses_wire_name() {
        let encoded = serde_json::to_string(&RpcMethod::GetBlockByNumber).unwrap();
        assert_eq!(encoded, "\"eth_getBlockByNumber\"");

        let decoded: RpcMethod = serde_json::from_str("\"eth_blockNumber\"").unwrap();
        assert_eq!(decoded, RpcMethod::BlockNumber);
    }
}
