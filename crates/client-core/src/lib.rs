//! # ortc-client-core
//!
//! Client side of a mediasoup-style SFU session.
//!
//! The server never exchanges SDP. It hands out RTP capabilities and
//! transport parameters over signaling; this crate turns them into the SDP
//! the local WebRTC stack understands and turns the stack's SDP back into
//! the parameters the server expects.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ RoomClient          join / produce / consume │
//! ├──────────────────────────────────────────────┤
//! │ Device ── Transport ── Producer / Consumer   │  ortc-core negotiation
//! ├──────────────────────────────────────────────┤
//! │ Handler ── RemoteSdp ── MediaSection         │  ortc-sdp-core codec
//! ├───────────────────────┬──────────────────────┤
//! │ HandlerBackend        │ SignalingChannel     │  boundaries
//! │ (local WebRTC stack)  │ (protoo peer)        │
//! └───────────────────────┴──────────────────────┘
//! ```
//!
//! - [`device`]: loads router capabilities, creates transports
//! - [`transport`]: produce, consume and their lifecycle, serialized per transport
//! - [`handler`]: offer/answer rounds against the local stack
//! - [`signaling`]: protoo framing and room protocol payloads
//! - [`room`]: the join sequence and server-initiated requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ortc_client_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(factory: Arc<dyn HandlerFactory>) -> ClientResult<()> {
//! let config = ClientConfig::new().with_display_name("alice");
//! let (peer, _outbound) = ProtooPeer::new(SignalingConfig::from(&config));
//!
//! // A socket task writes `_outbound` frames and feeds replies to `peer.handle_incoming`.
//! let room = RoomClient::new(config, peer, factory);
//! let peers = room.join().await?;
//! println!("{} peers in the room", peers.len());
//!
//! let mic = room.produce(ProduceOptions::new(MediaTrack::new(MediaKind::Audio))).await?;
//! room.pause_producer(mic.id()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod consumer;
pub mod device;
pub mod error;
pub mod events;
pub mod handler;
pub mod producer;
pub mod room;
pub mod signaling;
pub mod transport;

pub use config::{ClientConfig, DeviceInfo, ProducerCodecOptions, SignalingConfig};
pub use consumer::{Consumer, DataConsumer};
pub use device::Device;
pub use error::{ClientError, ClientResult};
pub use events::{ConnectionState, ProduceDataRequest, ProduceRequest, TransportListener};
pub use handler::{HandlerBackend, HandlerFactory, MediaTrack, SdpType, TransceiverInfo, TransceiverInit};
pub use producer::{DataProducer, Producer};
pub use room::{RoomClient, RoomEvent};
pub use signaling::{ProtooPeer, SignalingChannel};
pub use transport::{
    ConsumeDataOptions, ConsumeOptions, ProduceDataOptions, ProduceOptions, Transport, TransportDirection,
    TransportOptions,
};

/// Commonly used imports.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::consumer::*;
    pub use crate::device::Device;
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::handler::{HandlerBackend, HandlerFactory, MediaTrack, TransportDirection};
    pub use crate::producer::*;
    pub use crate::room::*;
    pub use crate::signaling::{ProtooPeer, SignalingChannel};
    pub use crate::transport::*;
    pub use ortc_core::{MediaKind, RtpCapabilities, RtpParameters};
}
