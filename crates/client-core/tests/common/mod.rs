//! Test doubles for the local WebRTC stack, the transport listener and the
//! signaling server.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use ortc_client_core::events::ProduceDataRequest;
use ortc_client_core::handler::{DataChannelInit, HandlerBackend, HandlerFactory, TransportDirection};
use ortc_client_core::{
    ClientError, ClientResult, ConnectionState, MediaTrack, ProduceRequest, SdpType, SignalingChannel,
    TransceiverInfo, TransceiverInit, TransportListener,
};
use ortc_core::{DtlsParameters, MediaKind, RtpCapabilities};
use ortc_sdp_core::{parse, write, Direction};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const LOCAL_FINGERPRINT: &str =
    "E5:F5:CA:A7:2D:93:E6:16:AC:21:09:9F:23:51:62:8C:D0:66:E9:0C:22:54:2B:82:0C:DF:E0:C5:2C:7E:CD:53";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ortc_client_core=debug")
        .with_test_writer()
        .try_init();
}

fn audio_lines() -> &'static str {
    "a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level\r\n\
     a=extmap:2 http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time\r\n\
     a=extmap:3 http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01\r\n\
     a=extmap:4 urn:ietf:params:rtp-hdrext:sdes:mid\r\n\
     a=rtpmap:111 opus/48000/2\r\n\
     a=rtcp-fb:111 transport-cc\r\n\
     a=fmtp:111 minptime=10;useinbandfec=1\r\n\
     a=rtpmap:0 PCMU/8000\r\n"
}

fn video_lines() -> &'static str {
    "a=extmap:2 http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time\r\n\
     a=extmap:3 http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01\r\n\
     a=extmap:4 urn:ietf:params:rtp-hdrext:sdes:mid\r\n\
     a=rtpmap:96 VP8/90000\r\n\
     a=rtcp-fb:96 goog-remb\r\n\
     a=rtcp-fb:96 transport-cc\r\n\
     a=rtcp-fb:96 ccm fir\r\n\
     a=rtcp-fb:96 nack\r\n\
     a=rtcp-fb:96 nack pli\r\n\
     a=rtpmap:97 rtx/90000\r\n\
     a=fmtp:97 apt=96\r\n\
     a=rtpmap:102 H264/90000\r\n\
     a=rtcp-fb:102 transport-cc\r\n\
     a=rtcp-fb:102 nack\r\n\
     a=fmtp:102 level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42e01f\r\n\
     a=rtpmap:103 rtx/90000\r\n\
     a=fmtp:103 apt=102\r\n"
}

fn transport_lines() -> String {
    format!(
        "c=IN IP4 0.0.0.0\r\n\
         a=rtcp:9 IN IP4 0.0.0.0\r\n\
         a=ice-ufrag:Lq8x\r\n\
         a=ice-pwd:wmLJ1fIjxJKmV04H7bZ9N4cW\r\n\
         a=ice-options:trickle\r\n\
         a=fingerprint:sha-256 {LOCAL_FINGERPRINT}\r\n\
         a=setup:actpass\r\n"
    )
}

fn session_header(version: u32, mids: &[String]) -> String {
    let mut header = format!(
        "v=0\r\no=- 4611731400430051336 {version} IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n\
         a=extmap-allow-mixed\r\na=msid-semantic: WMS\r\n"
    );
    if !mids.is_empty() {
        header.push_str(&format!("a=group:BUNDLE {}\r\n", mids.join(" ")));
    }
    header
}

/// The offer a browser makes with one audio and one video transceiver.
pub fn capability_offer() -> String {
    format!(
        "{}m=audio 9 UDP/TLS/RTP/SAVPF 111 0\r\n{}a=mid:0\r\na=sendrecv\r\na=rtcp-mux\r\n{}\
         m=video 9 UDP/TLS/RTP/SAVPF 96 97 102 103\r\n{}a=mid:1\r\na=sendrecv\r\na=rtcp-mux\r\na=rtcp-rsize\r\n{}",
        session_header(1, &["0".to_string(), "1".to_string()]),
        transport_lines(),
        audio_lines(),
        transport_lines(),
        video_lines(),
    )
}

/// Router capabilities in the shape the server sends them.
pub fn router_rtp_capabilities() -> RtpCapabilities {
    serde_json::from_value(router_rtp_capabilities_json()).expect("router capabilities")
}

pub fn router_rtp_capabilities_json() -> Value {
    json!({
        "codecs": [
            {
                "kind": "audio", "mimeType": "audio/opus", "preferredPayloadType": 100,
                "clockRate": 48000, "channels": 2,
                "rtcpFeedback": [{ "type": "nack" }, { "type": "transport-cc" }]
            },
            {
                "kind": "video", "mimeType": "video/VP8", "preferredPayloadType": 101, "clockRate": 90000,
                "rtcpFeedback": [
                    { "type": "nack" }, { "type": "nack", "parameter": "pli" },
                    { "type": "ccm", "parameter": "fir" }, { "type": "goog-remb" }, { "type": "transport-cc" }
                ]
            },
            {
                "kind": "video", "mimeType": "video/rtx", "preferredPayloadType": 102,
                "clockRate": 90000, "parameters": { "apt": 101 }
            },
            {
                "kind": "video", "mimeType": "video/H264", "preferredPayloadType": 107, "clockRate": 90000,
                "parameters": {
                    "packetization-mode": 1, "profile-level-id": "42e01f", "level-asymmetry-allowed": 1
                },
                "rtcpFeedback": [{ "type": "nack" }, { "type": "transport-cc" }]
            },
            {
                "kind": "video", "mimeType": "video/rtx", "preferredPayloadType": 108,
                "clockRate": 90000, "parameters": { "apt": 107 }
            }
        ],
        "headerExtensions": [
            { "kind": "audio", "uri": "urn:ietf:params:rtp-hdrext:sdes:mid", "preferredId": 1, "direction": "sendrecv" },
            { "kind": "video", "uri": "urn:ietf:params:rtp-hdrext:sdes:mid", "preferredId": 1, "direction": "sendrecv" },
            { "kind": "audio", "uri": "http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time", "preferredId": 4 },
            { "kind": "video", "uri": "http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time", "preferredId": 4 },
            { "kind": "audio", "uri": "http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01", "preferredId": 5, "direction": "recvonly" },
            { "kind": "video", "uri": "http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01", "preferredId": 5 },
            { "kind": "audio", "uri": "urn:ietf:params:rtp-hdrext:ssrc-audio-level", "preferredId": 10 }
        ]
    })
}

pub fn transport_options_json(id: &str, with_sctp: bool) -> Value {
    let mut options = json!({
        "id": id,
        "iceParameters": { "usernameFragment": format!("{id}-ufrag"), "password": "server-password", "iceLite": true },
        "iceCandidates": [{
            "foundation": "udpcandidate", "priority": 1076302079, "ip": "203.0.113.10",
            "protocol": "udp", "port": 44444, "type": "host"
        }],
        "dtlsParameters": {
            "role": "auto",
            "fingerprints": [
                { "algorithm": "sha-384", "value": "AA:AA" },
                { "algorithm": "sha-256", "value": "82:5A:68:3D:36:C3:0A:DE:AF:E7:32:43:D2:88:83:57" }
            ]
        }
    });
    if with_sctp {
        options["sctpParameters"] = json!({ "port": 5000, "OS": 1024, "MIS": 1024, "maxMessageSize": 262144 });
    }
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    Media(MediaKind),
    Data,
}

#[derive(Debug, Clone)]
struct Slot {
    transceiver_id: String,
    kind: SlotKind,
    mid: Option<String>,
    direction: Direction,
    stopped: bool,
    has_track: bool,
    ssrc: u32,
    rids: Vec<String>,
}

#[derive(Debug, Default)]
struct BackendState {
    slots: Vec<Slot>,
    next_mid: u32,
    next_transceiver: u32,
    next_ssrc: u32,
    version: u32,
    remote_offer: Option<String>,
    local: Vec<(SdpType, String)>,
    remote: Vec<(SdpType, String)>,
    data_channels: Vec<DataChannelInit>,
    sent: Vec<(u16, Bytes)>,
    ice_restarts: u32,
    failing_remote: u32,
    closed: bool,
}

/// A peer connection that writes browser-like SDP.
pub struct FakeBackend {
    pub direction: TransportDirection,
    state: Mutex<BackendState>,
    state_tx: mpsc::UnboundedSender<ConnectionState>,
    state_rx: Mutex<Option<mpsc::UnboundedReceiver<ConnectionState>>>,
}

impl FakeBackend {
    pub fn new(direction: TransportDirection) -> Self {
        let (state_tx, state_rx) = mpsc::unbounded_channel();
        Self {
            direction,
            state: Mutex::new(BackendState { next_ssrc: 1000, ..Default::default() }),
            state_tx,
            state_rx: Mutex::new(Some(state_rx)),
        }
    }

    pub fn emit_state(&self, state: ConnectionState) {
        let _ = self.state_tx.send(state);
    }

    pub fn last_remote_description(&self) -> Option<(SdpType, String)> {
        self.state.lock().remote.last().cloned()
    }

    pub fn last_local_description(&self) -> Option<(SdpType, String)> {
        self.state.lock().local.last().cloned()
    }

    pub fn remote_description_count(&self) -> usize {
        self.state.lock().remote.len()
    }

    pub fn data_channels(&self) -> Vec<DataChannelInit> {
        self.state.lock().data_channels.clone()
    }

    pub fn sent_data(&self) -> Vec<(u16, Bytes)> {
        self.state.lock().sent.clone()
    }

    pub fn ice_restarts(&self) -> u32 {
        self.state.lock().ice_restarts
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Reject the next `n` remote descriptions without applying them.
    pub fn fail_next_remote_descriptions(&self, n: u32) {
        self.state.lock().failing_remote = n;
    }

    fn write_offer(state: &mut BackendState) -> String {
        for slot in state.slots.iter_mut().filter(|s| s.mid.is_none()) {
            slot.mid = Some(state.next_mid.to_string());
            state.next_mid += 1;
        }
        state.version += 1;

        let mids: Vec<String> =
            state.slots.iter().filter(|s| !s.stopped).filter_map(|s| s.mid.clone()).collect();
        let mut sdp = session_header(state.version, &mids);

        for slot in &state.slots {
            let mid = slot.mid.clone().unwrap_or_default();
            let port = if slot.stopped { 0 } else { 9 };
            match slot.kind {
                SlotKind::Data => {
                    sdp.push_str(&format!("m=application {port} UDP/DTLS/SCTP webrtc-datachannel\r\n"));
                    sdp.push_str(&transport_lines());
                    sdp.push_str(&format!("a=mid:{mid}\r\na=sctp-port:5000\r\na=max-message-size:262144\r\n"));
                }
                SlotKind::Media(kind) => {
                    let (formats, lines) = match kind {
                        MediaKind::Audio => ("111 0", audio_lines()),
                        MediaKind::Video => ("96 97 102 103", video_lines()),
                    };
                    sdp.push_str(&format!("m={kind} {port} UDP/TLS/RTP/SAVPF {formats}\r\n"));
                    sdp.push_str(&transport_lines());
                    sdp.push_str(&format!("a=mid:{mid}\r\n"));
                    if slot.stopped {
                        sdp.push_str("a=inactive\r\n");
                        continue;
                    }
                    sdp.push_str(lines);
                    sdp.push_str(&format!("a={}\r\na=rtcp-mux\r\na=rtcp-rsize\r\n", slot.direction));
                    if !slot.has_track {
                        continue;
                    }
                    if slot.rids.is_empty() {
                        let ssrc = slot.ssrc;
                        match kind {
                            MediaKind::Audio => sdp.push_str(&format!("a=ssrc:{ssrc} cname:localcname\r\n")),
                            MediaKind::Video => sdp.push_str(&format!(
                                "a=ssrc-group:FID {ssrc} {rtx}\r\na=ssrc:{ssrc} cname:localcname\r\n\
                                 a=ssrc:{rtx} cname:localcname\r\n",
                                rtx = ssrc + 1
                            )),
                        }
                    } else {
                        for rid in &slot.rids {
                            sdp.push_str(&format!("a=rid:{rid} send\r\n"));
                        }
                        sdp.push_str(&format!("a=simulcast:send {}\r\n", slot.rids.join(";")));
                    }
                }
            }
        }
        sdp
    }

    /// Mirror a remote offer: one transceiver per section, in order.
    fn apply_remote_offer(state: &mut BackendState, offer: &str) -> ClientResult<()> {
        let sdp = parse(offer)?;
        for (idx, media) in sdp.media.iter().enumerate() {
            let kind = match media.media_type.as_str() {
                "audio" => SlotKind::Media(MediaKind::Audio),
                "video" => SlotKind::Media(MediaKind::Video),
                _ => SlotKind::Data,
            };
            let recycled = state.slots.get(idx).map(|s| s.mid != media.mid).unwrap_or(true);
            if recycled {
                state.next_transceiver += 1;
                let slot = Slot {
                    transceiver_id: format!("transceiver-{}", state.next_transceiver),
                    kind,
                    mid: media.mid.clone(),
                    direction: Direction::RecvOnly,
                    stopped: false,
                    has_track: false,
                    ssrc: 0,
                    rids: Vec::new(),
                };
                if idx < state.slots.len() {
                    state.slots[idx] = slot;
                } else {
                    state.slots.push(slot);
                }
            }
            state.slots[idx].stopped = media.port == 0;
        }
        state.remote_offer = Some(offer.to_string());
        Ok(())
    }

    fn write_answer(state: &mut BackendState) -> ClientResult<String> {
        let offer = state
            .remote_offer
            .clone()
            .ok_or_else(|| ClientError::transport("create_answer", "no remote offer"))?;
        let mut sdp = parse(&offer)?;
        state.version += 1;
        sdp.origin.username = "-".to_string();
        sdp.origin.session_version = u64::from(state.version);
        sdp.ice_lite = false;
        sdp.fingerprint = None;

        for (idx, media) in sdp.media.iter_mut().enumerate() {
            let local_direction = state.slots.get(idx).map(|s| s.direction).unwrap_or(Direction::RecvOnly);
            media.direction = media.direction.map(|remote| match (remote, local_direction) {
                (Direction::Inactive, _) | (_, Direction::Inactive) => Direction::Inactive,
                _ => Direction::RecvOnly,
            });
            media.connection = None;
            media.candidates.clear();
            media.end_of_candidates = false;
            media.ice_options = None;
            media.ice_ufrag = Some("Lq8x".to_string());
            media.ice_pwd = Some("wmLJ1fIjxJKmV04H7bZ9N4cW".to_string());
            media.fingerprint = Some(ortc_sdp_core::Fingerprint {
                hash_type: "sha-256".to_string(),
                hash: LOCAL_FINGERPRINT.to_string(),
            });
            media.setup = Some("active".to_string());
            media.ssrcs.clear();
            media.ssrc_groups.clear();
            media.msid = None;
        }
        Ok(write(&sdp))
    }
}

#[async_trait]
impl HandlerBackend for FakeBackend {
    async fn add_transceiver(&self, track: &MediaTrack, init: TransceiverInit) -> ClientResult<String> {
        let mut state = self.state.lock();
        state.next_transceiver += 1;
        state.next_ssrc += 10;
        let slot = Slot {
            transceiver_id: format!("transceiver-{}", state.next_transceiver),
            kind: SlotKind::Media(track.kind),
            mid: None,
            direction: init.direction,
            stopped: false,
            has_track: true,
            ssrc: state.next_ssrc,
            rids: init.send_encodings.iter().filter_map(|e| e.rid.clone()).collect(),
        };
        let id = slot.transceiver_id.clone();
        match state.slots.iter().position(|s| s.stopped) {
            Some(idx) => state.slots[idx] = slot,
            None => state.slots.push(slot),
        }
        Ok(id)
    }

    async fn transceivers(&self) -> Vec<TransceiverInfo> {
        self.state
            .lock()
            .slots
            .iter()
            .filter_map(|s| match s.kind {
                SlotKind::Media(kind) => {
                    Some(TransceiverInfo { id: s.transceiver_id.clone(), kind, mid: s.mid.clone() })
                }
                SlotKind::Data => None,
            })
            .collect()
    }

    async fn set_transceiver_direction(&self, transceiver_id: &str, direction: Direction) -> ClientResult<()> {
        let mut state = self.state.lock();
        let slot = state
            .slots
            .iter_mut()
            .find(|s| s.transceiver_id == transceiver_id)
            .ok_or_else(|| ClientError::transport("set_direction", "unknown transceiver"))?;
        slot.direction = direction;
        Ok(())
    }

    async fn remove_track(&self, transceiver_id: &str) -> ClientResult<()> {
        let mut state = self.state.lock();
        if let Some(slot) = state.slots.iter_mut().find(|s| s.transceiver_id == transceiver_id) {
            slot.has_track = false;
            slot.direction = Direction::Inactive;
        }
        Ok(())
    }

    async fn stop_transceiver(&self, transceiver_id: &str) -> ClientResult<()> {
        let mut state = self.state.lock();
        if let Some(slot) = state.slots.iter_mut().find(|s| s.transceiver_id == transceiver_id) {
            slot.stopped = true;
        }
        Ok(())
    }

    async fn create_offer(&self, ice_restart: bool) -> ClientResult<String> {
        let mut state = self.state.lock();
        if ice_restart {
            state.ice_restarts += 1;
        }
        Ok(Self::write_offer(&mut state))
    }

    async fn create_answer(&self) -> ClientResult<String> {
        Self::write_answer(&mut self.state.lock())
    }

    async fn set_local_description(&self, sdp_type: SdpType, sdp: &str) -> ClientResult<()> {
        parse(sdp)?;
        self.state.lock().local.push((sdp_type, sdp.to_string()));
        Ok(())
    }

    async fn set_remote_description(&self, sdp_type: SdpType, sdp: &str) -> ClientResult<()> {
        let mut state = self.state.lock();
        if state.failing_remote > 0 {
            state.failing_remote -= 1;
            return Err(ClientError::transport("set_remote_description", "rejected by stack"));
        }
        if sdp_type == SdpType::Offer {
            Self::apply_remote_offer(&mut state, sdp)?;
        } else {
            parse(sdp)?;
        }
        state.remote.push((sdp_type, sdp.to_string()));
        Ok(())
    }

    async fn create_data_channel(&self, init: DataChannelInit) -> ClientResult<()> {
        let mut state = self.state.lock();
        if self.direction == TransportDirection::Send && !state.slots.iter().any(|s| s.kind == SlotKind::Data) {
            state.next_transceiver += 1;
            let slot = Slot {
                transceiver_id: format!("sctp-{}", state.next_transceiver),
                kind: SlotKind::Data,
                mid: None,
                direction: Direction::SendRecv,
                stopped: false,
                has_track: false,
                ssrc: 0,
                rids: Vec::new(),
            };
            state.slots.push(slot);
        }
        state.data_channels.push(init);
        Ok(())
    }

    async fn send_data(&self, stream_id: u16, data: Bytes) -> ClientResult<()> {
        self.state.lock().sent.push((stream_id, data));
        Ok(())
    }

    fn take_connection_state_events(&self) -> Option<mpsc::UnboundedReceiver<ConnectionState>> {
        self.state_rx.lock().take()
    }

    async fn close(&self) {
        self.state.lock().closed = true;
    }
}

#[derive(Default)]
pub struct FakeFactory {
    pub backends: Mutex<Vec<Arc<FakeBackend>>>,
    pub broken_offer: bool,
}

impl FakeFactory {
    pub fn backend(&self, idx: usize) -> Arc<FakeBackend> {
        Arc::clone(&self.backends.lock()[idx])
    }

    pub fn backends_len(&self) -> usize {
        self.backends.lock().len()
    }

    pub fn backend_for(&self, direction: TransportDirection) -> Option<Arc<FakeBackend>> {
        self.backends.lock().iter().find(|b| b.direction == direction).cloned()
    }
}

#[async_trait]
impl HandlerFactory for FakeFactory {
    async fn capability_offer(&self) -> ClientResult<String> {
        if self.broken_offer {
            return Ok("m=audio 9 RTP/AVP 0\r\n".to_string());
        }
        Ok(capability_offer())
    }

    async fn create_backend(&self, direction: TransportDirection) -> ClientResult<Arc<dyn HandlerBackend>> {
        let backend = Arc::new(FakeBackend::new(direction));
        self.backends.lock().push(Arc::clone(&backend));
        Ok(backend)
    }
}

/// Listener that records every callback and hands out sequential ids.
#[derive(Default)]
pub struct RecordingListener {
    pub connects: Mutex<Vec<(String, DtlsParameters)>>,
    pub produces: Mutex<Vec<(String, ProduceRequest)>>,
    pub produce_data: Mutex<Vec<(String, ProduceDataRequest)>>,
    pub states: Mutex<Vec<ConnectionState>>,
    pub reject_produce: std::sync::atomic::AtomicBool,
    /// How long `on_produce` waits for the server.
    pub produce_delay: Mutex<Option<Duration>>,
    /// `enter`/`exit` marks around each `on_produce` call.
    pub produce_log: Mutex<Vec<&'static str>>,
    next_id: AtomicU32,
}

#[async_trait]
impl TransportListener for RecordingListener {
    async fn on_connect(&self, transport_id: &str, dtls_parameters: DtlsParameters) -> ClientResult<()> {
        self.connects.lock().push((transport_id.to_string(), dtls_parameters));
        Ok(())
    }

    async fn on_produce(&self, transport_id: &str, request: ProduceRequest) -> ClientResult<String> {
        if self.reject_produce.load(Ordering::Acquire) {
            return Err(ClientError::SignalingRejected {
                method: "produce".into(),
                code: 500,
                reason: "producer refused".into(),
            });
        }
        self.produce_log.lock().push("enter");
        let delay = *self.produce_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.produce_log.lock().push("exit");
        self.produces.lock().push((transport_id.to_string(), request));
        Ok(format!("producer-{}", self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    async fn on_produce_data(&self, transport_id: &str, request: ProduceDataRequest) -> ClientResult<String> {
        self.produce_data.lock().push((transport_id.to_string(), request));
        Ok(format!("data-producer-{}", self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    async fn on_connection_state_change(&self, _transport_id: &str, state: ConnectionState) {
        self.states.lock().push(state);
    }
}

/// A room server answering requests from a script.
#[derive(Default)]
pub struct FakeSignaling {
    pub requests: Mutex<Vec<(String, Value)>>,
    pub reject: Mutex<HashSet<String>>,
    next_id: AtomicU32,
}

impl FakeSignaling {
    pub fn methods(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(method, _)| method.clone()).collect()
    }

    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests.lock().iter().filter(|(m, _)| m == method).map(|(_, data)| data.clone()).collect()
    }
}

#[async_trait]
impl SignalingChannel for FakeSignaling {
    async fn request(&self, method: &str, data: Value) -> ClientResult<Value> {
        self.requests.lock().push((method.to_string(), data.clone()));
        if self.reject.lock().contains(method) {
            return Err(ClientError::SignalingRejected { method: method.into(), code: 500, reason: "refused".into() });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(match method {
            "getRouterRtpCapabilities" => router_rtp_capabilities_json(),
            "createWebRtcTransport" => {
                let name = if data["producing"] == true { "send-transport" } else { "recv-transport" };
                transport_options_json(name, !data["sctpCapabilities"].is_null())
            }
            "produce" => json!({ "id": format!("producer-{id}") }),
            "produceData" => json!({ "id": format!("data-producer-{id}") }),
            "join" => json!({ "peers": [{ "id": "bob", "displayName": "Bob" }] }),
            "restartIce" => json!({ "usernameFragment": format!("restarted-{id}"), "password": "new-password", "iceLite": true }),
            _ => json!({}),
        })
    }
}
