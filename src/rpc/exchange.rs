//! Single request/response JSON-RPC exchanges over a session.
//!
//! # Responsibilities
//! - Encode one call and write it as one text frame
//! - Read exactly one reply and decode the JSON-RPC envelope
//! - Surface RPC error objects as `ProtocolError`, socket failures as
//!   `TransportError`

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::rpc::session::Session;
use crate::rpc::types::{ProtocolError, RequestEnvelope, ResponseEnvelope, RpcError};

/// One JSON-RPC request.
#[derive(Debug, Clone)]
pub struct RpcCall {
    pub id: u64,
    pub method: &'static str,
    pub params: Vec<Value>,
}

impl RpcCall {
    pub fn new(id: u64, method: &'static str) -> Self {
        Self {
            id,
            method,
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    /// Serialize as a JSON-RPC 2.0 request object.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(&RequestEnvelope {
            jsonrpc: "2.0",
            id: self.id,
            method: self.method,
            params: &self.params,
        })
    }

    /// Decode a reply to this call into `T`.
    pub fn decode_reply<T: DeserializeOwned>(&self, reply: &str) -> Result<T, ProtocolError> {
        let method = self.method;
        let envelope: ResponseEnvelope = serde_json::from_str(reply)
            .map_err(|source| ProtocolError::Decode { method, source })?;

        if let Some(error) = envelope.error {
            return Err(ProtocolError::Rpc {
                method,
                code: error.code,
                message: error.message,
            });
        }

        if let Some(id) = envelope.id {
            if id.as_u64() != Some(self.id) {
                return Err(ProtocolError::IdMismatch {
                    method,
                    expected: self.id,
                    actual: id,
                });
            }
        }

        let result = envelope
            .result
            .ok_or(ProtocolError::EmptyResult { method })?;
        serde_json::from_value(result).map_err(|source| ProtocolError::Decode { method, source })
    }
}

/// Send `call` over `session` and decode the single reply.
pub async fn send<T: DeserializeOwned>(
    session: &mut dyn Session,
    call: &RpcCall,
) -> Result<T, RpcError> {
    let payload = call.encode().map_err(|source| ProtocolError::Encode {
        method: call.method,
        source,
    })?;
    tracing::trace!(method = call.method, id = call.id, payload = %payload, "Sending RPC request");

    session.send_text(payload).await?;
    let reply = session.recv_text().await?;

    tracing::trace!(method = call.method, id = call.id, reply = %reply, "Received RPC reply");
    Ok(call.decode_reply(&reply)?)
}

/// Issues a sequence of calls over one session with increasing ids.
pub struct RpcExchange<'a> {
    session: &'a mut dyn Session,
    next_id: u64,
}

impl<'a> RpcExchange<'a> {
    pub fn new(session: &'a mut dyn Session) -> Self {
        Self {
            session,
            next_id: 1,
        }
    }

    /// Call `method` and decode its result.
    pub async fn call<T: DeserializeOwned>(
        &mut self,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let call = RpcCall::new(self.next_id, method).with_params(params);
        self.next_id += 1;

        let result = send(&mut *self.session, &call).await;
        if let Err(e) = &result {
            tracing::debug!(method, error = %e, "RPC call failed");
        } else {
            tracing::debug!(method, "RPC call succeeded");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::ScriptedSession;
    use crate::rpc::types::{SystemHealth, TransportError};
    use serde_json::json;

    #[test]
    fn test_encode_request() {
        let call = RpcCall::new(7, "chain_getBlock").with_params(vec![json!("0xabc")]);
        let encoded: Value = serde_json::from_str(&call.encode().unwrap()).unwrap();
        assert_eq!(
            encoded,
            json!({"jsonrpc": "2.0", "id": 7, "method": "chain_getBlock", "params": ["0xabc"]})
        );
    }

    #[test]
    fn test_decode_error_object_carries_no_payload() {
        let call = RpcCall::new(1, "system_chain");
        let err = call
            .decode_reply::<Value>(
                r#"{"jsonrpc":"2.0","id":1,"result":"Polkadot","error":{"code":-32000,"message":"boom"}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Rpc { code: -32000, .. }));
    }

    #[test]
    fn test_decode_rejects_mismatched_id() {
        let call = RpcCall::new(3, "system_chain");
        let err = call
            .decode_reply::<String>(r#"{"jsonrpc":"2.0","id":2,"result":"Polkadot"}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::IdMismatch { expected: 3, .. }));
    }

    #[test]
    fn test_decode_null_result_is_empty() {
        let call = RpcCall::new(1, "chain_getBlock");
        let err = call
            .decode_reply::<Value>(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::EmptyResult { .. }));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let call = RpcCall::new(1, "system_health");
        let err = call
            .decode_reply::<SystemHealth>(r#"{"jsonrpc":"2.0","id":1,"result":"healthy"}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode { .. }));

        let err = call.decode_reply::<SystemHealth>("not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_exchange_assigns_increasing_ids() {
        let mut session = ScriptedSession::new(|_, _| Ok(json!("ok")));
        {
            let mut rpc = RpcExchange::new(&mut session);
            let _: String = rpc.call("system_chain", vec![]).await.unwrap();
            let _: String = rpc.call("system_name", vec![]).await.unwrap();
        }
        assert_eq!(session.ids(), vec![1, 2]);
        assert_eq!(session.methods(), vec!["system_chain", "system_name"]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinct() {
        let mut session = ScriptedSession::new(|_, _| Ok(json!("ok")));
        session.fail_reads_with(|| TransportError::DeadlineExceeded);

        let mut rpc = RpcExchange::new(&mut session);
        let err = rpc.call::<String>("system_chain", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(TransportError::DeadlineExceeded)));
    }
}
