//! JSON-RPC protocol module
//!
//! Envelopes and method definitions for the calls issued by the benchmark.

mod envelope;
mod method;

pub use envelope::{JsonRpcRequest, RpcReply};
pub use method::RpcMethod;

use thiserror::Error;

/// JSON-RPC protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("Unsupported method: {0} (expected eth_blockNumber or eth_getBlockByNumber)")]
    UnsupportedMethod(String),
}
