//! Local media and data sources registered with the server.
//!
//! Producers are handles. Their lifecycle operations go through the owning
//! [`Transport`](crate::transport::Transport) (`close_producer`,
//! `pause_producer`, `resume_producer`), which renegotiates and then updates
//! the flags kept here.

use crate::error::{ClientError, ClientResult};
use crate::handler::{HandlerBackend, MediaTrack};
use bytes::Bytes;
use ortc_core::{MediaKind, RtpParameters, SctpStreamParameters};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct Producer {
    id: String,
    local_id: String,
    track: MediaTrack,
    rtp_parameters: RtpParameters,
    app_data: serde_json::Value,
    paused: AtomicBool,
    closed: AtomicBool,
}

impl Producer {
    pub(crate) fn new(
        id: String,
        local_id: String,
        track: MediaTrack,
        rtp_parameters: RtpParameters,
        app_data: serde_json::Value,
    ) -> Self {
        Self {
            id,
            local_id,
            track,
            rtp_parameters,
            app_data,
            paused: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Server-assigned id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mid of the section carrying this producer.
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn kind(&self) -> MediaKind {
        self.track.kind
    }

    pub fn track(&self) -> &MediaTrack {
        &self.track
    }

    /// Parameters the server was told about.
    pub fn rtp_parameters(&self) -> &RtpParameters {
        &self.rtp_parameters
    }

    pub fn app_data(&self) -> &serde_json::Value {
        &self.app_data
    }

    pub fn paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    /// Returns whether this call did the closing.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }
}

/// A data channel the server receives from.
pub struct DataProducer {
    id: String,
    sctp_stream_parameters: SctpStreamParameters,
    label: String,
    protocol: String,
    app_data: serde_json::Value,
    backend: Arc<dyn HandlerBackend>,
    closed: AtomicBool,
}

impl DataProducer {
    pub(crate) fn new(
        id: String,
        sctp_stream_parameters: SctpStreamParameters,
        label: String,
        protocol: String,
        app_data: serde_json::Value,
        backend: Arc<dyn HandlerBackend>,
    ) -> Self {
        Self {
            id,
            sctp_stream_parameters,
            label,
            protocol,
            app_data,
            backend,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sctp_stream_parameters(&self) -> &SctpStreamParameters {
        &self.sctp_stream_parameters
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn app_data(&self) -> &serde_json::Value {
        &self.app_data
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Send one message on the channel.
    pub async fn send(&self, data: impl Into<Bytes>) -> ClientResult<()> {
        if self.closed() {
            return Err(ClientError::invalid_state("send", format!("data producer {} is closed", self.id)));
        }
        self.backend.send_data(self.sctp_stream_parameters.stream_id, data.into()).await
    }

    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }
}

impl std::fmt::Debug for DataProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProducer")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("stream_id", &self.sctp_stream_parameters.stream_id)
            .field("closed", &self.closed())
            .finish()
    }
}
