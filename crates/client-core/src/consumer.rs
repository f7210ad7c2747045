//! Server media and data delivered to this client.

use ortc_core::{MediaKind, RtpParameters, SctpStreamParameters};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct Consumer {
    id: String,
    producer_id: String,
    local_id: String,
    kind: MediaKind,
    rtp_parameters: RtpParameters,
    app_data: serde_json::Value,
    paused: AtomicBool,
    closed: AtomicBool,
}

impl Consumer {
    pub(crate) fn new(
        id: String,
        producer_id: String,
        local_id: String,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
        app_data: serde_json::Value,
    ) -> Self {
        Self {
            id,
            producer_id,
            local_id,
            kind,
            rtp_parameters,
            app_data,
            paused: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn producer_id(&self) -> &str {
        &self.producer_id
    }

    /// Mid of the section carrying this consumer.
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

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

    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }
}

#[derive(Debug)]
pub struct DataConsumer {
    id: String,
    data_producer_id: String,
    sctp_stream_parameters: SctpStreamParameters,
    label: String,
    protocol: String,
    app_data: serde_json::Value,
    closed: AtomicBool,
}

impl DataConsumer {
    pub(crate) fn new(
        id: String,
        data_producer_id: String,
        sctp_stream_parameters: SctpStreamParameters,
        label: String,
        protocol: String,
        app_data: serde_json::Value,
    ) -> Self {
        Self {
            id,
            data_producer_id,
            sctp_stream_parameters,
            label,
            protocol,
            app_data,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data_producer_id(&self) -> &str {
        &self.data_producer_id
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

    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }
}
