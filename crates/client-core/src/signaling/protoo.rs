//! protoo framing over a text message transport.
//!
//! Every frame is one JSON object tagged by a boolean member:
//!
//! ```text
//! {"request":true,"id":12,"method":"join","data":{...}}
//! {"response":true,"id":12,"ok":true,"data":{...}}
//! {"response":true,"id":12,"ok":false,"errorCode":500,"errorReason":"..."}
//! {"notification":true,"method":"newPeer","data":{...}}
//! ```
//!
//! [`ProtooPeer`] does not own a socket. Outbound frames go to the
//! [`mpsc::Receiver`] returned by [`ProtooPeer::new`]; inbound frames are fed
//! to [`ProtooPeer::handle_incoming`]. The socket task on either side is the
//! caller's.

use super::SignalingChannel;
use crate::config::SignalingConfig;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtooRequest {
    request: bool,
    pub id: u32,
    pub method: String,
    #[serde(default)]
    pub data: Value,
}

impl ProtooRequest {
    pub fn new(id: u32, method: impl Into<String>, data: Value) -> Self {
        Self { request: true, id, method: method.into(), data }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtooResponse {
    response: bool,
    pub id: u32,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl ProtooResponse {
    pub fn success(id: u32, data: Value) -> Self {
        Self { response: true, id, ok: true, data, error_code: None, error_reason: None }
    }

    pub fn error(id: u32, code: u16, reason: impl Into<String>) -> Self {
        Self {
            response: true,
            id,
            ok: false,
            data: Value::Null,
            error_code: Some(code),
            error_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtooNotification {
    notification: bool,
    pub method: String,
    #[serde(default)]
    pub data: Value,
}

impl ProtooNotification {
    pub fn new(method: impl Into<String>, data: Value) -> Self {
        Self { notification: true, method: method.into(), data }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProtooMessage {
    Request(ProtooRequest),
    Response(ProtooResponse),
    Notification(ProtooNotification),
}

impl ProtooMessage {
    pub fn parse(text: &str) -> ClientResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        let flag = |name: &str| value.get(name).and_then(Value::as_bool).unwrap_or(false);

        if flag("request") {
            Ok(Self::Request(serde_json::from_value(value)?))
        } else if flag("response") {
            Ok(Self::Response(serde_json::from_value(value)?))
        } else if flag("notification") {
            Ok(Self::Notification(serde_json::from_value(value)?))
        } else {
            Err(ClientError::Serialization { reason: "not a protoo message".to_string() })
        }
    }

    pub fn to_json(&self) -> ClientResult<String> {
        let json = match self {
            Self::Request(request) => serde_json::to_string(request)?,
            Self::Response(response) => serde_json::to_string(response)?,
            Self::Notification(notification) => serde_json::to_string(notification)?,
        };
        Ok(json)
    }
}

/// A frame the application must act on.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Must be answered with [`ProtooPeer::respond`].
    Request(ProtooRequest),
    Notification(ProtooNotification),
}

/// Request/response correlation for one protoo connection.
///
/// ```rust
/// use ortc_client_core::signaling::{ProtooMessage, ProtooResponse};
/// use ortc_client_core::{ProtooPeer, SignalingChannel, SignalingConfig};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let (peer, mut outbound) = ProtooPeer::new(SignalingConfig::default());
///
/// let server = async {
///     let frame = outbound.recv().await.unwrap();
///     let ProtooMessage::Request(request) = ProtooMessage::parse(&frame).unwrap() else {
///         panic!("expected a request");
///     };
///     let reply = ProtooMessage::Response(ProtooResponse::success(request.id, json!({ "ok": 1 })));
///     peer.handle_incoming(&reply.to_json().unwrap()).unwrap();
/// };
///
/// let (data, ()) = tokio::join!(peer.request("getRouterRtpCapabilities", json!({})), server);
/// assert_eq!(data.unwrap()["ok"], 1);
/// assert_eq!(peer.pending_requests(), 0);
/// # });
/// ```
pub struct ProtooPeer {
    config: SignalingConfig,
    outbound: mpsc::Sender<String>,
    pending: DashMap<u32, oneshot::Sender<ProtooResponse>>,
    next_id: AtomicU32,
    closed: AtomicBool,
}

impl ProtooPeer {
    /// Returns the peer and the stream of frames to write to the socket.
    pub fn new(config: SignalingConfig) -> (Arc<Self>, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(config.outbound_capacity.max(1));
        let peer = Arc::new(Self {
            config,
            outbound,
            pending: DashMap::new(),
            next_id: AtomicU32::new(rand::random::<u32>() >> 1),
            closed: AtomicBool::new(false),
        });
        (peer, rx)
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Feed one frame received from the socket.
    ///
    /// Responses complete their pending request and yield `None`.
    pub fn handle_incoming(&self, text: &str) -> ClientResult<Option<InboundMessage>> {
        match ProtooMessage::parse(text)? {
            ProtooMessage::Response(response) => {
                match self.pending.remove(&response.id) {
                    Some((_, waiter)) => {
                        trace!(id = response.id, ok = response.ok, "response received");
                        if waiter.send(response).is_err() {
                            debug!("response arrived after its request was abandoned");
                        }
                    }
                    None => warn!(id = response.id, "response for unknown request"),
                }
                Ok(None)
            }
            ProtooMessage::Request(request) => Ok(Some(InboundMessage::Request(request))),
            ProtooMessage::Notification(notification) => Ok(Some(InboundMessage::Notification(notification))),
        }
    }

    pub async fn respond(&self, response: ProtooResponse) -> ClientResult<()> {
        self.send_frame("response", ProtooMessage::Response(response)).await
    }

    pub async fn notify(&self, method: &str, data: Value) -> ClientResult<()> {
        self.send_frame(method, ProtooMessage::Notification(ProtooNotification::new(method, data))).await
    }

    /// Fail every pending request with [`ClientError::Closed`].
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(pending = self.pending.len(), "closing protoo peer");
        self.pending.clear();
    }

    async fn send_frame(&self, method: &str, message: ProtooMessage) -> ClientResult<()> {
        if self.closed() {
            return Err(ClientError::Closed);
        }
        let frame = message.to_json()?;
        self.outbound
            .send(frame)
            .await
            .map_err(|_| ClientError::signaling(method, "outbound channel closed"))
    }
}

#[async_trait]
impl SignalingChannel for ProtooPeer {
    async fn request(&self, method: &str, data: Value) -> ClientResult<Value> {
        if self.closed() {
            return Err(ClientError::Closed);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        trace!(id, method, "sending request");

        if let Err(e) = self.send_frame(method, ProtooMessage::Request(ProtooRequest::new(id, method, data))).await {
            self.pending.remove(&id);
            return Err(e);
        }

        let response = match tokio::time::timeout(self.config.request_timeout(), rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(ClientError::Closed),
            Err(_) => {
                self.pending.remove(&id);
                warn!(id, method, "request timed out");
                return Err(ClientError::SignalingTimeout {
                    method: method.to_string(),
                    duration_ms: self.config.request_timeout_ms,
                });
            }
        };

        if response.ok {
            Ok(response.data)
        } else {
            Err(ClientError::SignalingRejected {
                method: method.to_string(),
                code: response.error_code.unwrap_or(500),
                reason: response.error_reason.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_frames() {
        let request = ProtooMessage::parse(r#"{"request":true,"id":1,"method":"newConsumer","data":{"id":"c1"}}"#)
            .unwrap();
        assert!(matches!(request, ProtooMessage::Request(ref r) if r.method == "newConsumer" && r.data["id"] == "c1"));

        let error = ProtooMessage::parse(r#"{"response":true,"id":2,"ok":false,"errorCode":403,"errorReason":"no"}"#)
            .unwrap();
        match error {
            ProtooMessage::Response(response) => {
                assert!(!response.ok);
                assert_eq!(response.error_code, Some(403));
            }
            other => panic!("unexpected {other:?}"),
        }

        let notification = ProtooMessage::parse(r#"{"notification":true,"method":"peerClosed"}"#).unwrap();
        assert!(matches!(notification, ProtooMessage::Notification(ref n) if n.data.is_null()));

        assert!(ProtooMessage::parse(r#"{"id":3}"#).is_err());
        assert!(ProtooMessage::parse("not json").is_err());
    }

    #[test]
    fn test_response_serialization() {
        let ok = serde_json::to_value(ProtooResponse::success(7, json!({}))).unwrap();
        assert_eq!(ok, json!({ "response": true, "id": 7, "ok": true, "data": {} }));

        let err = serde_json::to_value(ProtooResponse::error(7, 500, "boom")).unwrap();
        assert_eq!(err, json!({ "response": true, "id": 7, "ok": false, "errorCode": 500, "errorReason": "boom" }));
    }

    #[tokio::test]
    async fn test_request_response_roundtrip() {
        let (peer, mut outbound) = ProtooPeer::new(SignalingConfig::default());

        let requester = Arc::clone(&peer);
        let call = tokio::spawn(async move { requester.request("join", json!({ "displayName": "a" })).await });

        let frame = outbound.recv().await.unwrap();
        let ProtooMessage::Request(request) = ProtooMessage::parse(&frame).unwrap() else {
            panic!("expected a request frame");
        };
        assert_eq!(request.method, "join");

        let reply = ProtooMessage::Response(ProtooResponse::success(request.id, json!({ "peers": [] })));
        assert_eq!(peer.handle_incoming(&reply.to_json().unwrap()).unwrap(), None);

        assert_eq!(call.await.unwrap().unwrap(), json!({ "peers": [] }));
        assert_eq!(peer.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_rejected_request() {
        let (peer, mut outbound) = ProtooPeer::new(SignalingConfig::default());
        let requester = Arc::clone(&peer);
        let call = tokio::spawn(async move { requester.request("produce", Value::Null).await });

        let frame = outbound.recv().await.unwrap();
        let ProtooMessage::Request(request) = ProtooMessage::parse(&frame).unwrap() else {
            panic!("expected a request frame");
        };
        let reply = ProtooMessage::Response(ProtooResponse::error(request.id, 400, "bad rtpParameters"));
        peer.handle_incoming(&reply.to_json().unwrap()).unwrap();

        let err = call.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            ClientError::SignalingRejected { method: "produce".into(), code: 400, reason: "bad rtpParameters".into() }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout() {
        let config = SignalingConfig { request_timeout_ms: 50, ..Default::default() };
        let (peer, _outbound) = ProtooPeer::new(config);

        let err = peer.request("join", Value::Null).await.unwrap_err();
        assert!(matches!(err, ClientError::SignalingTimeout { duration_ms: 50, .. }));
        assert_eq!(peer.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_close_fails_pending_requests() {
        let (peer, mut outbound) = ProtooPeer::new(SignalingConfig::default());
        let requester = Arc::clone(&peer);
        let call = tokio::spawn(async move { requester.request("join", Value::Null).await });

        outbound.recv().await.unwrap();
        peer.close();

        assert_eq!(call.await.unwrap().unwrap_err(), ClientError::Closed);
        assert_eq!(peer.request("join", Value::Null).await.unwrap_err(), ClientError::Closed);
    }

    #[tokio::test]
    async fn test_inbound_request_is_surfaced() {
        let (peer, mut outbound) = ProtooPeer::new(SignalingConfig::default());
        let inbound = peer
            .handle_incoming(r#"{"request":true,"id":9,"method":"newConsumer","data":{}}"#)
            .unwrap();
        let Some(InboundMessage::Request(request)) = inbound else {
            panic!("expected a request");
        };

        peer.respond(ProtooResponse::success(request.id, json!({}))).await.unwrap();
        let frame = outbound.recv().await.unwrap();
        assert!(frame.contains(r#""response":true"#));
    }
}
