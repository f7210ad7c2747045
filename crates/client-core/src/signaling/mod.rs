//! Request/response signaling with the SFU server.
//!
//! [`SignalingChannel`] is the one seam the rest of the crate depends on.
//! [`protoo::ProtooPeer`] implements it over the protoo JSON framing; tests
//! implement it with canned responses.

pub mod messages;
pub mod protoo;

pub use messages::*;
pub use protoo::{InboundMessage, ProtooMessage, ProtooNotification, ProtooPeer, ProtooRequest, ProtooResponse};

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Request method names understood by the server.
pub mod methods {
    pub const GET_ROUTER_RTP_CAPABILITIES: &str = "getRouterRtpCapabilities";
    pub const CREATE_WEBRTC_TRANSPORT: &str = "createWebRtcTransport";
    pub const CONNECT_WEBRTC_TRANSPORT: &str = "connectWebRtcTransport";
    pub const RESTART_ICE: &str = "restartIce";
    pub const JOIN: &str = "join";
    pub const PRODUCE: &str = "produce";
    pub const PRODUCE_DATA: &str = "produceData";
    pub const CLOSE_PRODUCER: &str = "closeProducer";
    pub const PAUSE_PRODUCER: &str = "pauseProducer";
    pub const RESUME_PRODUCER: &str = "resumeProducer";

    /// Server to client requests and notifications.
    pub const NEW_CONSUMER: &str = "newConsumer";
    pub const NEW_DATA_CONSUMER: &str = "newDataConsumer";
    pub const NEW_PEER: &str = "newPeer";
    pub const PEER_CLOSED: &str = "peerClosed";
    pub const CONSUMER_CLOSED: &str = "consumerClosed";
    pub const CONSUMER_PAUSED: &str = "consumerPaused";
    pub const CONSUMER_RESUMED: &str = "consumerResumed";
}

#[async_trait]
pub trait SignalingChannel: Send + Sync {
    /// Send a request and wait for its response data.
    async fn request(&self, method: &str, data: Value) -> ClientResult<Value>;
}

/// Typed wrapper over [`SignalingChannel::request`].
pub async fn request<Req, Resp>(channel: &dyn SignalingChannel, method: &str, data: &Req) -> ClientResult<Resp>
where
    Req: Serialize + ?Sized + Sync,
    Resp: DeserializeOwned,
{
    let data = serde_json::to_value(data)?;
    let response = channel.request(method, data).await?;
    serde_json::from_value(response).map_err(|e| {
        ClientError::signaling(method, format!("unexpected response: {e}"))
    })
}
