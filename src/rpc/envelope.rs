//! JSON-RPC 2.0 request and response envelopes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RpcMethod;

/// Protocol version string
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request envelope
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Build the envelope for a benchmark call
    pub fn new(method: RpcMethod, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.name().to_string(),
            params: method.params(),
            id,
        }
    }

    /// Serialize to the request body
    pub fn to_body(&self) -> String {
        // Only strings, numbers and arrays; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Error object returned by a node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// What a response body turned out to contain
#[derive(Clone, Debug, PartialEq)]
pub enum RpcReply {
    /// `result` present and no `error`
    Result(Value),
    /// `error` present
    Error(JsonRpcErrorObject),
    /// Body was not a JSON-RPC response object
    Malformed(String),
}

impl RpcReply {
    /// Inspect a raw response body
    pub fn parse(body: &str) -> Self {
        let value: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => return RpcReply::Malformed(format!("invalid JSON: {e}")),
        };

        let Some(object) = value.as_object() else {
            return RpcReply::Malformed("response is not a JSON object".to_string());
        };

        if let Some(error) = object.get("error") {
            let parsed = serde_json::from_value::<JsonRpcErrorObject>(error.clone())
                .unwrap_or_else(|_| JsonRpcErrorObject {
                    code: 0,
                    message: error.to_string(),
                });
            return RpcReply::Error(parsed);
        }

        match object.get("result") {
            Some(result) => RpcReply::Result(result.clone()),
            None => RpcReply::Malformed("response has neither result nor error".to_string()),
        }
    }

    pub fn is_result(&self) -> bool {
        matches!(self, RpcReply::Result(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_envelope() {
        let req = JsonRpcRequest::new(RpcMethod::GetBlockByNumber, 7);
        let body: Value = serde_json::from_str(&req.to_body()).unwrap();

        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "method": "eth_getBlockByNumber",
                "params": ["latest", false],
                "id": 7
            })
        );
    }

    #[test]
    fn test_reply_result() {
        let reply = RpcReply::parse(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#);
        assert_eq!(reply, RpcReply::Result(json!("0x10")));
        assert!(reply.is_result());
    }

    #[test]
    fn test_reply_null_result_is_still_result() {
        let reply = RpcReply::parse(r#"{"jsonrpc":"2.0","id":1,"result":null}"#);
        assert!(reply.is_result());
    }

    #[test]
    fn test_reply_error_wins_over_result() {
        let reply = RpcReply::parse(
            r#"{"id":1,"result":"0x1","error":{"code":-32601,"message":"Method not found"}}"#,
        );
        match reply {
            RpcReply::Error(e) => {
                assert_eq!(e.code, -32601);
                assert_eq!(e.message, "Method not found");
            }
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    #[test]
    fn test_reply_malformed() {
        assert!(matches!(RpcReply::parse("not json"), RpcReply::Malformed(_)));
        assert!(matches!(RpcReply::parse("[1,2]"), RpcReply::Malformed(_)));
        assert!(matches!(RpcReply::parse(r#"{"id":1}"#), RpcReply::Malformed(_)));
    }

    #[test]
    fn test_reply_nonstandard_error_shape() {
        match RpcReply::parse(r#"{"error":"rate limited"}"#) {
            RpcReply::Error(e) => assert!(e.message.contains("rate limited")),
            other => panic!("expected error reply, got {other:?}"),
        }
    }
}
