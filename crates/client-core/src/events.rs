//! Transport events delivered to the application.
//!
//! A [`Transport`](crate::transport::Transport) does not talk to the server
//! itself. Whenever the server must learn something (the local DTLS
//! parameters, a new producer) the transport calls its
//! [`TransportListener`] and waits for the answer. The usual implementation
//! forwards each callback as a signaling request, which is what
//! [`RoomClient`](crate::room::RoomClient) does.
//!
//! # Usage Examples
//!
//! ```rust
//! use ortc_client_core::events::{ConnectionState, ProduceRequest, TransportListener};
//! use ortc_client_core::ClientResult;
//! use ortc_core::DtlsParameters;
//! use async_trait::async_trait;
//!
//! struct LoggingListener;
//!
//! #[async_trait]
//! impl TransportListener for LoggingListener {
//!     async fn on_connect(&self, transport_id: &str, dtls: DtlsParameters) -> ClientResult<()> {
//!         println!("{transport_id} connects as {:?}", dtls.role);
//!         Ok(())
//!     }
//!
//!     async fn on_produce(&self, transport_id: &str, request: ProduceRequest) -> ClientResult<String> {
//!         println!("{transport_id} produces {}", request.kind);
//!         Ok(uuid::Uuid::new_v4().to_string())
//!     }
//!
//!     async fn on_connection_state_change(&self, transport_id: &str, state: ConnectionState) {
//!         println!("{transport_id} is now {state}");
//!     }
//! }
//! ```

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use ortc_core::{DtlsParameters, MediaKind, RtpParameters, SctpStreamParameters};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ICE/DTLS connection state of a transport, as reported by the local stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::New => "new",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
            ConnectionState::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A new producer the server must create.
#[derive(Debug, Clone, PartialEq)]
pub struct ProduceRequest {
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
    pub app_data: serde_json::Value,
}

/// A new data producer the server must create.
#[derive(Debug, Clone, PartialEq)]
pub struct ProduceDataRequest {
    pub sctp_stream_parameters: SctpStreamParameters,
    pub label: String,
    pub protocol: String,
    pub app_data: serde_json::Value,
}

/// Callbacks a transport awaits while negotiating.
///
/// An error returned from a callback aborts the operation that triggered it.
#[async_trait]
pub trait TransportListener: Send + Sync {
    /// The transport is about to connect; the server must connect its side
    /// with these parameters. Called once per transport.
    async fn on_connect(&self, transport_id: &str, dtls_parameters: DtlsParameters) -> ClientResult<()>;

    /// Returns the server-assigned producer id.
    async fn on_produce(&self, transport_id: &str, request: ProduceRequest) -> ClientResult<String>;

    /// Returns the server-assigned data producer id.
    async fn on_produce_data(&self, transport_id: &str, request: ProduceDataRequest) -> ClientResult<String> {
        let _ = request;
        Err(ClientError::invalid_state(
            "produce_data",
            format!("no data producer handling on transport {transport_id}"),
        ))
    }

    async fn on_connection_state_change(&self, transport_id: &str, state: ConnectionState) {
        let _ = (transport_id, state);
    }
}
