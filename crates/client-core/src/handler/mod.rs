//! Drives the local WebRTC stack through offer/answer for one transport.
//!
//! The local stack sits behind [`HandlerBackend`], a thin view of a peer
//! connection. The [`Handler`] owns the [`RemoteSdp`] built from the server's
//! transport parameters and runs every local change (new track, paused
//! track, new data channel) through a full offer/answer round:
//!
//! ```text
//!  send:    backend offer ──► parse ──► remote answer section ──► backend answer
//!  receive: remote offer section ──► backend answer ──► parse ──► set local
//! ```
//!
//! The first round on a transport also extracts the local DTLS parameters and
//! hands them to the [`TransportListener`] before the local description is
//! applied.

pub mod media_section;
pub mod remote_sdp;
pub mod sdp_utils;

pub use remote_sdp::RemoteSdp;

use crate::config::ProducerCodecOptions;
use crate::error::{ClientError, ClientResult};
use crate::events::{ConnectionState, TransportListener};
use async_trait::async_trait;
use bytes::Bytes;
use ortc_core::sctp_parameters::SCTP_NUM_STREAMS;
use ortc_core::{
    ortc, DtlsParameters, DtlsRole, ExtendedRtpCapabilities, IceCandidate, IceParameters, MediaKind,
    RtpCodecCapability, RtpEncodingParameters, RtpParameters, SctpCapabilities, SctpParameters,
    SctpStreamParameters,
};
use ortc_sdp_core::{parse, write, Direction, SessionDescription};
use remote_sdp::{ReceiveSection, SendSection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Direction of a transport, from the local point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportDirection {
    Send,
    Recv,
}

impl fmt::Display for TransportDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportDirection::Send => "send",
            TransportDirection::Recv => "recv",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpType {
    Offer,
    Answer,
}

/// A local media track handed to the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
    pub kind: MediaKind,
}

impl MediaTrack {
    pub fn new(kind: MediaKind) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), kind }
    }

    pub fn with_id(id: impl Into<String>, kind: MediaKind) -> Self {
        Self { id: id.into(), kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransceiverInit {
    pub direction: Direction,
    pub stream_ids: Vec<String>,
    pub send_encodings: Vec<RtpEncodingParameters>,
}

/// A transceiver as the stack reports it. `mid` is set once a local
/// description containing it has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransceiverInfo {
    pub id: String,
    pub kind: MediaKind,
    pub mid: Option<String>,
}

/// A pre-negotiated data channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChannelInit {
    pub stream_id: u16,
    pub label: String,
    pub protocol: String,
    pub ordered: bool,
    pub max_packet_life_time: Option<u16>,
    pub max_retransmits: Option<u16>,
}

/// One peer connection of the local WebRTC stack.
#[async_trait]
pub trait HandlerBackend: Send + Sync {
    /// Add a transceiver for `track`; returns the stack's transceiver id.
    async fn add_transceiver(&self, track: &MediaTrack, init: TransceiverInit) -> ClientResult<String>;

    async fn transceivers(&self) -> Vec<TransceiverInfo>;

    async fn set_transceiver_direction(&self, transceiver_id: &str, direction: Direction) -> ClientResult<()>;

    /// Detach the sending track.
    async fn remove_track(&self, transceiver_id: &str) -> ClientResult<()>;

    /// Stop the transceiver for good; its section becomes reusable.
    async fn stop_transceiver(&self, transceiver_id: &str) -> ClientResult<()>;

    async fn create_offer(&self, ice_restart: bool) -> ClientResult<String>;

    async fn create_answer(&self) -> ClientResult<String>;

    async fn set_local_description(&self, sdp_type: SdpType, sdp: &str) -> ClientResult<()>;

    async fn set_remote_description(&self, sdp_type: SdpType, sdp: &str) -> ClientResult<()>;

    async fn create_data_channel(&self, init: DataChannelInit) -> ClientResult<()>;

    async fn send_data(&self, stream_id: u16, data: Bytes) -> ClientResult<()>;

    /// Connection state changes, taken once by the owning transport.
    fn take_connection_state_events(&self) -> Option<mpsc::UnboundedReceiver<ConnectionState>> {
        None
    }

    async fn close(&self);
}

/// Creates backends and reports what the local stack supports.
#[async_trait]
pub trait HandlerFactory: Send + Sync {
    /// An offer from a throwaway peer connection with one audio and one
    /// video transceiver. Native capabilities are read from it.
    async fn capability_offer(&self) -> ClientResult<String>;

    fn sctp_capabilities(&self) -> SctpCapabilities {
        SctpCapabilities { num_streams: SCTP_NUM_STREAMS }
    }

    async fn create_backend(&self, direction: TransportDirection) -> ClientResult<Arc<dyn HandlerBackend>>;
}

/// Server transport parameters a handler starts from.
pub struct HandlerRunOptions<'a> {
    pub transport_id: String,
    pub direction: TransportDirection,
    pub ice_parameters: IceParameters,
    pub ice_candidates: Vec<IceCandidate>,
    pub dtls_parameters: DtlsParameters,
    pub sctp_parameters: Option<SctpParameters>,
    pub extended_rtp_capabilities: &'a ExtendedRtpCapabilities,
}

pub struct HandlerSendOptions {
    pub track: MediaTrack,
    pub encodings: Vec<RtpEncodingParameters>,
    pub codec_options: Option<ProducerCodecOptions>,
    /// Restrict sending to this codec.
    pub codec: Option<RtpCodecCapability>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerSendResult {
    /// Mid of the section carrying the track.
    pub local_id: String,
    pub rtp_parameters: RtpParameters,
}

pub struct HandlerReceiveOptions {
    pub track_id: String,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
    pub stream_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSendDataChannelOptions {
    pub ordered: bool,
    pub max_packet_life_time: Option<u16>,
    pub max_retransmits: Option<u16>,
    pub label: String,
    pub protocol: String,
}

pub struct Handler {
    transport_id: String,
    direction: TransportDirection,
    backend: Arc<dyn HandlerBackend>,
    listener: Arc<dyn TransportListener>,
    remote_sdp: RemoteSdp,
    sending_rtp_parameters_by_kind: HashMap<MediaKind, RtpParameters>,
    sending_remote_rtp_parameters_by_kind: HashMap<MediaKind, RtpParameters>,
    forced_local_dtls_role: Option<DtlsRole>,
    transport_ready: bool,
    /// Local id (mid) to backend transceiver id.
    transceivers: HashMap<String, String>,
    has_data_channel_media_section: bool,
    next_send_sctp_stream_id: u16,
    /// Mid for the next receive the server did not assign one to.
    next_mid: u64,
}

impl Handler {
    pub fn new(
        backend: Arc<dyn HandlerBackend>,
        listener: Arc<dyn TransportListener>,
        options: HandlerRunOptions<'_>,
    ) -> Self {
        let role = options.dtls_parameters.role;
        let forced_local_dtls_role = (role != DtlsRole::Auto).then_some(role.opposite());

        let remote_sdp = RemoteSdp::new(
            Some(options.ice_parameters),
            options.ice_candidates,
            Some(options.dtls_parameters),
            options.sctp_parameters,
        );

        let extended = options.extended_rtp_capabilities;
        let mut sending = HashMap::new();
        let mut sending_remote = HashMap::new();
        if options.direction == TransportDirection::Send {
            for kind in [MediaKind::Audio, MediaKind::Video] {
                sending.insert(kind, ortc::get_sending_rtp_parameters(kind, extended));
                sending_remote.insert(kind, ortc::get_sending_remote_rtp_parameters(kind, extended));
            }
        }

        debug!(transport_id = %options.transport_id, direction = %options.direction, "handler created");

        Self {
            transport_id: options.transport_id,
            direction: options.direction,
            backend,
            listener,
            remote_sdp,
            sending_rtp_parameters_by_kind: sending,
            sending_remote_rtp_parameters_by_kind: sending_remote,
            forced_local_dtls_role,
            transport_ready: false,
            transceivers: HashMap::new(),
            has_data_channel_media_section: false,
            next_send_sctp_stream_id: 0,
            next_mid: 0,
        }
    }

    pub fn backend(&self) -> Arc<dyn HandlerBackend> {
        Arc::clone(&self.backend)
    }

    pub fn transport_ready(&self) -> bool {
        self.transport_ready
    }

    pub fn remote_sdp(&self) -> &RemoteSdp {
        &self.remote_sdp
    }

    pub async fn send(&mut self, options: HandlerSendOptions) -> ClientResult<HandlerSendResult> {
        self.assert_direction(TransportDirection::Send, "send")?;
        let kind = options.track.kind;
        debug!(transport_id = %self.transport_id, %kind, track_id = %options.track.id, "send");

        let mut sending = sending_parameters(&self.sending_rtp_parameters_by_kind, kind)?;
        sending.codecs = ortc::reduce_codecs(&sending.codecs, options.codec.as_ref())?;
        let mut sending_remote = sending_parameters(&self.sending_remote_rtp_parameters_by_kind, kind)?;
        sending_remote.codecs = ortc::reduce_codecs(&sending_remote.codecs, options.codec.as_ref())?;

        let (idx, reuse_mid) = self.remote_sdp.next_media_section_idx();

        let mut encodings = options.encodings;
        if encodings.len() > 1 {
            for (i, encoding) in encodings.iter_mut().enumerate() {
                encoding.rid.get_or_insert_with(|| format!("r{i}"));
            }
        }

        let transceiver_id = self
            .backend
            .add_transceiver(
                &options.track,
                TransceiverInit {
                    direction: Direction::SendOnly,
                    stream_ids: vec![self.transport_id.clone()],
                    send_encodings: encodings.clone(),
                },
            )
            .await?;

        let mut answered_mid = None;
        let negotiated = self
            .negotiate_send(
                &transceiver_id,
                idx,
                reuse_mid.as_deref(),
                sending,
                &sending_remote,
                encodings,
                options.codec_options.as_ref(),
                &mut answered_mid,
            )
            .await;

        match negotiated {
            Ok(result) => {
                self.transceivers.insert(result.local_id.clone(), transceiver_id);
                info!(transport_id = %self.transport_id, %kind, mid = %result.local_id, "sending track");
                Ok(result)
            }
            Err(e) => {
                warn!(transport_id = %self.transport_id, %kind, error = %e, "send failed, detaching transceiver");
                self.abort_send(&transceiver_id, answered_mid.as_deref()).await;
                Err(e)
            }
        }
    }

    /// Offer/answer round for a transceiver that was just added.
    ///
    /// `answered_mid` is set once the remote description holds a section for
    /// the track, so a failure after that point can take it out again.
    #[allow(clippy::too_many_arguments)]
    async fn negotiate_send(
        &mut self,
        transceiver_id: &str,
        idx: usize,
        reuse_mid: Option<&str>,
        mut sending: RtpParameters,
        sending_remote: &RtpParameters,
        encodings: Vec<RtpEncodingParameters>,
        codec_options: Option<&ProducerCodecOptions>,
        answered_mid: &mut Option<String>,
    ) -> ClientResult<HandlerSendResult> {
        let offer = self.backend.create_offer(false).await?;
        let local_sdp = parse(&offer)?;

        if !self.transport_ready {
            self.setup_transport(&local_sdp).await?;
        }

        self.backend.set_local_description(SdpType::Offer, &offer).await?;

        let local_id = self.transceiver_mid(transceiver_id).await?;
        let offer_media = local_sdp
            .media
            .get(idx)
            .cloned()
            .ok_or_else(|| ClientError::transport("send", format!("local offer has no media section {idx}")))?;

        sending.mid = Some(local_id.clone());
        sending.rtcp.cname = sdp_utils::get_cname(&offer_media);
        sending.encodings = match encodings.len() {
            0 => sdp_utils::get_rtp_encodings(&offer_media)?,
            1 => {
                let mut offered = sdp_utils::get_rtp_encodings(&offer_media)?;
                if let Some(first) = offered.first_mut() {
                    first.merge_from(&encodings[0]);
                }
                offered
            }
            _ => encodings,
        };

        self.remote_sdp.send(SendSection {
            offer_media: &offer_media,
            reuse_mid,
            offer_rtp_parameters: &mut sending,
            answer_rtp_parameters: sending_remote,
            codec_options,
            extmap_allow_mixed: true,
        })?;
        *answered_mid = Some(local_id.clone());

        let answer = self.remote_sdp.get_sdp();
        self.backend.set_remote_description(SdpType::Answer, &answer).await?;

        Ok(HandlerSendResult { local_id, rtp_parameters: sending })
    }

    /// Undo a send that failed part way.
    ///
    /// The transceiver is only stopped when its remote section is closed (or
    /// never existed), so the local and remote section lists keep the same
    /// slots for the next send.
    async fn abort_send(&mut self, transceiver_id: &str, answered_mid: Option<&str>) {
        let recyclable = match answered_mid {
            Some(mid) => match self.remote_sdp.close_media_section(mid) {
                Ok(closed) => closed,
                Err(e) => {
                    warn!(mid, error = %e, "failed to close remote section");
                    false
                }
            },
            None => true,
        };

        if let Err(e) = self.backend.remove_track(transceiver_id).await {
            warn!(transceiver_id, error = %e, "failed to remove track");
        }
        if recyclable {
            if let Err(e) = self.backend.stop_transceiver(transceiver_id).await {
                warn!(transceiver_id, error = %e, "failed to stop transceiver");
            }
        }
    }

    pub async fn stop_sending(&mut self, local_id: &str) -> ClientResult<()> {
        self.assert_direction(TransportDirection::Send, "stop_sending")?;
        let transceiver_id = self.transceiver_id(local_id)?;
        debug!(transport_id = %self.transport_id, mid = local_id, "stop sending");

        self.backend.remove_track(&transceiver_id).await?;
        if self.remote_sdp.close_media_section(local_id)? {
            if let Err(e) = self.backend.stop_transceiver(&transceiver_id).await {
                warn!(mid = local_id, error = %e, "failed to stop transceiver");
            }
        }

        self.renegotiate_as_offerer(false).await?;
        self.transceivers.remove(local_id);
        Ok(())
    }

    pub async fn pause_sending(&mut self, local_id: &str) -> ClientResult<()> {
        self.assert_direction(TransportDirection::Send, "pause_sending")?;
        let transceiver_id = self.transceiver_id(local_id)?;
        self.backend.set_transceiver_direction(&transceiver_id, Direction::Inactive).await?;
        self.remote_sdp.pause_media_section(local_id)?;
        self.renegotiate_as_offerer(false).await
    }

    pub async fn resume_sending(&mut self, local_id: &str) -> ClientResult<()> {
        self.assert_direction(TransportDirection::Send, "resume_sending")?;
        let transceiver_id = self.transceiver_id(local_id)?;
        self.backend.set_transceiver_direction(&transceiver_id, Direction::SendOnly).await?;
        self.remote_sdp.resume_sending_media_section(local_id)?;
        self.renegotiate_as_offerer(false).await
    }

    /// Open a data channel on the next free SCTP stream.
    pub async fn send_data_channel(
        &mut self,
        options: HandlerSendDataChannelOptions,
    ) -> ClientResult<SctpStreamParameters> {
        self.assert_direction(TransportDirection::Send, "send_data_channel")?;

        let stream_id = self.next_send_sctp_stream_id;
        self.backend
            .create_data_channel(DataChannelInit {
                stream_id,
                label: options.label.clone(),
                protocol: options.protocol.clone(),
                ordered: options.ordered,
                max_packet_life_time: options.max_packet_life_time,
                max_retransmits: options.max_retransmits,
            })
            .await?;
        self.next_send_sctp_stream_id = (stream_id + 1) % SCTP_NUM_STREAMS.mis;

        if !self.has_data_channel_media_section {
            let offer = self.backend.create_offer(false).await?;
            let local_sdp = parse(&offer)?;
            let offer_media = local_sdp
                .media
                .iter()
                .find(|m| m.media_type == "application")
                .cloned()
                .ok_or_else(|| ClientError::transport("send_data_channel", "local offer has no application section"))?;

            if !self.transport_ready {
                self.setup_transport(&local_sdp).await?;
            }

            self.backend.set_local_description(SdpType::Offer, &offer).await?;
            self.remote_sdp.send_sctp_association(&offer_media);
            let answer = self.remote_sdp.get_sdp();
            self.backend.set_remote_description(SdpType::Answer, &answer).await?;
            self.has_data_channel_media_section = true;
        }

        Ok(SctpStreamParameters {
            stream_id,
            ordered: Some(options.ordered),
            max_packet_life_time: options.max_packet_life_time,
            max_retransmits: options.max_retransmits,
        })
    }

    /// Receive a consumer's media; returns the local id (mid).
    pub async fn receive(&mut self, options: HandlerReceiveOptions) -> ClientResult<String> {
        self.assert_direction(TransportDirection::Recv, "receive")?;

        let local_id = match &options.rtp_parameters.mid {
            Some(mid) => mid.clone(),
            None => {
                let mid = self.next_mid.to_string();
                self.next_mid += 1;
                mid
            }
        };
        debug!(transport_id = %self.transport_id, kind = %options.kind, mid = %local_id, "receive");

        let stream_id = options.stream_id.or_else(|| options.rtp_parameters.rtcp.cname.clone());
        self.remote_sdp.receive(ReceiveSection {
            mid: &local_id,
            kind: options.kind.as_str(),
            offer_rtp_parameters: &options.rtp_parameters,
            stream_id: stream_id.as_deref(),
            track_id: &options.track_id,
        })?;

        let offer = self.remote_sdp.get_sdp();
        self.backend.set_remote_description(SdpType::Offer, &offer).await?;

        let answer = self.backend.create_answer().await?;
        let mut local_sdp = parse(&answer)?;
        if let Some(answer_media) = local_sdp.media_by_mid_mut(&local_id) {
            sdp_utils::apply_codec_parameters(&options.rtp_parameters, answer_media);
        }

        if !self.transport_ready {
            self.setup_transport(&local_sdp).await?;
        }

        self.backend.set_local_description(SdpType::Answer, &write(&local_sdp)).await?;

        let transceiver_id = self
            .backend
            .transceivers()
            .await
            .into_iter()
            .find(|t| t.mid.as_deref() == Some(local_id.as_str()))
            .map(|t| t.id)
            .ok_or_else(|| ClientError::transport("receive", format!("no transceiver for mid {local_id}")))?;
        self.transceivers.insert(local_id.clone(), transceiver_id);

        info!(transport_id = %self.transport_id, kind = %options.kind, mid = %local_id, "receiving track");
        Ok(local_id)
    }

    pub async fn stop_receiving(&mut self, local_id: &str) -> ClientResult<()> {
        self.assert_direction(TransportDirection::Recv, "stop_receiving")?;
        self.transceiver_id(local_id)?;
        self.remote_sdp.close_media_section(local_id)?;
        self.renegotiate_as_answerer().await?;
        self.transceivers.remove(local_id);
        Ok(())
    }

    pub async fn pause_receiving(&mut self, local_id: &str) -> ClientResult<()> {
        self.assert_direction(TransportDirection::Recv, "pause_receiving")?;
        let transceiver_id = self.transceiver_id(local_id)?;
        self.backend.set_transceiver_direction(&transceiver_id, Direction::Inactive).await?;
        self.remote_sdp.pause_media_section(local_id)?;
        self.renegotiate_as_answerer().await
    }

    pub async fn resume_receiving(&mut self, local_id: &str) -> ClientResult<()> {
        self.assert_direction(TransportDirection::Recv, "resume_receiving")?;
        let transceiver_id = self.transceiver_id(local_id)?;
        self.backend.set_transceiver_direction(&transceiver_id, Direction::RecvOnly).await?;
        self.remote_sdp.resume_receiving_media_section(local_id)?;
        self.renegotiate_as_answerer().await
    }

    /// Attach a server data producer's stream.
    pub async fn receive_data_channel(
        &mut self,
        sctp_stream_parameters: &SctpStreamParameters,
        label: &str,
        protocol: &str,
    ) -> ClientResult<()> {
        self.assert_direction(TransportDirection::Recv, "receive_data_channel")?;

        self.backend
            .create_data_channel(DataChannelInit {
                stream_id: sctp_stream_parameters.stream_id,
                label: label.to_string(),
                protocol: protocol.to_string(),
                ordered: sctp_stream_parameters.is_ordered(),
                max_packet_life_time: sctp_stream_parameters.max_packet_life_time,
                max_retransmits: sctp_stream_parameters.max_retransmits,
            })
            .await?;

        if !self.has_data_channel_media_section {
            self.remote_sdp.receive_sctp_association()?;
            let offer = self.remote_sdp.get_sdp();
            self.backend.set_remote_description(SdpType::Offer, &offer).await?;

            let answer = self.backend.create_answer().await?;
            if !self.transport_ready {
                let local_sdp = parse(&answer)?;
                self.setup_transport(&local_sdp).await?;
            }
            self.backend.set_local_description(SdpType::Answer, &answer).await?;
            self.has_data_channel_media_section = true;
        }
        Ok(())
    }

    /// Apply new server ICE credentials and renegotiate with an ICE restart.
    pub async fn restart_ice(&mut self, ice_parameters: IceParameters) -> ClientResult<()> {
        info!(transport_id = %self.transport_id, "restarting ICE");
        self.remote_sdp.update_ice_parameters(ice_parameters);

        if !self.transport_ready {
            return Ok(());
        }
        match self.direction {
            TransportDirection::Send => self.renegotiate_as_offerer(true).await,
            TransportDirection::Recv => self.renegotiate_as_answerer().await,
        }
    }

    pub async fn close(&mut self) {
        debug!(transport_id = %self.transport_id, "closing handler");
        self.transceivers.clear();
        self.backend.close().await;
    }

    async fn setup_transport(&mut self, local_sdp: &SessionDescription) -> ClientResult<()> {
        let local_role = self.forced_local_dtls_role.unwrap_or(DtlsRole::Client);
        let mut dtls_parameters = sdp_utils::extract_dtls_parameters(local_sdp)?;
        dtls_parameters.role = local_role;

        self.remote_sdp.update_dtls_role(local_role.opposite());

        debug!(transport_id = %self.transport_id, role = ?local_role, "connecting transport");
        self.listener.on_connect(&self.transport_id, dtls_parameters).await?;
        self.transport_ready = true;
        Ok(())
    }

    async fn renegotiate_as_offerer(&mut self, ice_restart: bool) -> ClientResult<()> {
        let offer = self.backend.create_offer(ice_restart).await?;
        self.backend.set_local_description(SdpType::Offer, &offer).await?;
        let answer = self.remote_sdp.get_sdp();
        self.backend.set_remote_description(SdpType::Answer, &answer).await
    }

    async fn renegotiate_as_answerer(&mut self) -> ClientResult<()> {
        let offer = self.remote_sdp.get_sdp();
        self.backend.set_remote_description(SdpType::Offer, &offer).await?;
        let answer = self.backend.create_answer().await?;
        self.backend.set_local_description(SdpType::Answer, &answer).await
    }

    async fn transceiver_mid(&self, transceiver_id: &str) -> ClientResult<String> {
        self.backend
            .transceivers()
            .await
            .into_iter()
            .find(|t| t.id == transceiver_id)
            .and_then(|t| t.mid)
            .ok_or_else(|| ClientError::transport("send", format!("transceiver {transceiver_id} has no mid")))
    }

    fn transceiver_id(&self, local_id: &str) -> ClientResult<String> {
        self.transceivers
            .get(local_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found("transceiver", local_id))
    }

    fn assert_direction(&self, expected: TransportDirection, operation: &str) -> ClientResult<()> {
        if self.direction == expected {
            Ok(())
        } else {
            Err(ClientError::invalid_state(
                operation,
                format!("not allowed on a {} transport", self.direction),
            ))
        }
    }
}

fn sending_parameters(by_kind: &HashMap<MediaKind, RtpParameters>, kind: MediaKind) -> ClientResult<RtpParameters> {
    by_kind
        .get(&kind)
        .cloned()
        .ok_or_else(|| ortc_core::NegotiationError::UnsupportedKind { kind: kind.to_string() }.into())
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("transport_id", &self.transport_id)
            .field("direction", &self.direction)
            .field("transport_ready", &self.transport_ready)
            .field("mids", &self.remote_sdp.mids())
            .finish()
    }
}
