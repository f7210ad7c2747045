//! Structured SDP document.
//!
//! Only the fields WebRTC offer/answer negotiation reads or writes are given
//! their own members. Everything else is kept verbatim in `other_attributes`
//! so a parse/write cycle does not lose information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A complete session description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescription {
    pub version: u32,
    pub origin: Origin,
    pub name: String,
    pub timing: Timing,
    pub connection: Option<Connection>,
    pub bandwidths: Vec<Bandwidth>,
    pub ice_lite: bool,
    pub ice_ufrag: Option<String>,
    pub ice_pwd: Option<String>,
    pub ice_options: Option<String>,
    pub fingerprint: Option<Fingerprint>,
    pub setup: Option<String>,
    pub groups: Vec<Group>,
    pub msid_semantic: Option<MsidSemantic>,
    pub extmap_allow_mixed: bool,
    /// Session level `i=`, `u=`, `e=`, `p=` and other rarely used lines,
    /// kept as (type, value).
    pub other_lines: Vec<(char, String)>,
    pub other_attributes: Vec<Attribute>,
    pub media: Vec<MediaDescription>,
}

impl Default for SessionDescription {
    fn default() -> Self {
        Self {
            version: 0,
            origin: Origin::default(),
            name: "-".to_string(),
            timing: Timing::default(),
            connection: None,
            bandwidths: Vec::new(),
            ice_lite: false,
            ice_ufrag: None,
            ice_pwd: None,
            ice_options: None,
            fingerprint: None,
            setup: None,
            groups: Vec::new(),
            msid_semantic: None,
            extmap_allow_mixed: false,
            other_lines: Vec::new(),
            other_attributes: Vec::new(),
            media: Vec::new(),
        }
    }
}

impl SessionDescription {
    /// First media description with the given mid.
    pub fn media_by_mid(&self, mid: &str) -> Option<&MediaDescription> {
        self.media.iter().find(|m| m.mid.as_deref() == Some(mid))
    }

    pub fn media_by_mid_mut(&mut self, mid: &str) -> Option<&mut MediaDescription> {
        self.media.iter_mut().find(|m| m.mid.as_deref() == Some(mid))
    }

    /// The `BUNDLE` group, if any.
    pub fn bundle_group(&self) -> Option<&Group> {
        self.groups.iter().find(|g| g.semantics == "BUNDLE")
    }
}

/// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <address>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub username: String,
    pub session_id: u64,
    pub session_version: u64,
    pub net_type: String,
    pub ip_ver: u8,
    pub address: String,
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            username: "-".to_string(),
            session_id: 0,
            session_version: 0,
            net_type: "IN".to_string(),
            ip_ver: 4,
            address: "0.0.0.0".to_string(),
        }
    }
}

/// `t=<start> <stop>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub start: u64,
    pub stop: u64,
}

/// `c=IN IP4 <address>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub ip_ver: u8,
    pub ip: String,
}

impl Connection {
    pub fn ipv4(ip: impl Into<String>) -> Self {
        Self { ip_ver: 4, ip: ip.into() }
    }
}

/// `b=<type>:<limit>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bandwidth {
    pub bw_type: String,
    pub limit: u64,
}

/// A generic `a=<name>[:<value>]` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// Media direction attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::SendRecv => "sendrecv",
            Direction::SendOnly => "sendonly",
            Direction::RecvOnly => "recvonly",
            Direction::Inactive => "inactive",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sendrecv" => Ok(Direction::SendRecv),
            "sendonly" => Ok(Direction::SendOnly),
            "recvonly" => Ok(Direction::RecvOnly),
            "inactive" => Ok(Direction::Inactive),
            _ => Err(()),
        }
    }
}

/// `a=rtpmap:<payload> <codec>/<rate>[/<encoding>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtpMap {
    pub payload: u8,
    pub codec: String,
    pub rate: u32,
    /// Channel count for audio.
    pub encoding: Option<u8>,
}

/// `a=fmtp:<payload> <config>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fmtp {
    pub payload: u8,
    pub config: String,
}

/// `a=rtcp-fb:<payload|*> <type> [<subtype>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcpFb {
    /// A payload type number or `*`.
    pub payload: String,
    pub fb_type: String,
    pub subtype: Option<String>,
}

/// `a=extmap:<id>[/<direction>] [<encrypt-uri>] <uri> [<config>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtMap {
    pub id: u16,
    pub direction: Option<Direction>,
    pub encrypt: bool,
    pub uri: String,
    pub config: Option<String>,
}

/// `a=ssrc:<id> <attribute>[:<value>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsrcAttribute {
    pub id: u32,
    pub attribute: String,
    pub value: Option<String>,
}

/// `a=ssrc-group:<semantics> <ssrc>...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsrcGroup {
    pub semantics: String,
    pub ssrcs: Vec<u32>,
}

/// `a=candidate:...` (RFC 8839)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub foundation: String,
    pub component: u32,
    pub transport: String,
    pub priority: u64,
    pub ip: String,
    pub port: u16,
    pub candidate_type: String,
    pub raddr: Option<String>,
    pub rport: Option<u16>,
    pub tcptype: Option<String>,
    pub generation: Option<u32>,
    /// Trailing `name value` pairs such as `ufrag` or `network-id`.
    pub extensions: Vec<(String, String)>,
}

/// `a=fingerprint:<hash-function> <hash>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub hash_type: String,
    pub hash: String,
}

/// `a=group:<semantics> <mid>...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub semantics: String,
    pub mids: Vec<String>,
}

/// `a=msid-semantic: <semantic> [<token>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsidSemantic {
    pub semantic: String,
    pub token: Option<String>,
}

/// `a=rid:<id> <send|recv> [<params>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rid {
    pub id: String,
    pub direction: String,
    pub params: Option<String>,
}

/// `a=simulcast:<dir1> <list1> [<dir2> <list2>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulcast {
    pub dir1: String,
    pub list1: String,
    pub dir2: Option<String>,
    pub list2: Option<String>,
}

/// Legacy `a=sctpmap:<number> <app> [<max-message-size>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SctpMap {
    pub number: u16,
    pub app: String,
    pub max_message_size: Option<u32>,
}

/// `a=rtcp:<port> [IN IP4 <address>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcpAddress {
    pub port: u16,
    pub net_type: Option<String>,
    pub ip_ver: Option<u8>,
    pub address: Option<String>,
}

/// One `m=` section and its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDescription {
    /// `audio`, `video` or `application`.
    pub media_type: String,
    /// 0 marks a rejected or closed section.
    pub port: u16,
    pub num_ports: Option<u16>,
    pub protocol: String,
    /// Format list after the protocol, space separated.
    pub payloads: String,
    pub connection: Option<Connection>,
    pub bandwidths: Vec<Bandwidth>,
    pub rtcp: Option<RtcpAddress>,
    pub rtp: Vec<RtpMap>,
    pub fmtp: Vec<Fmtp>,
    pub rtcp_fb: Vec<RtcpFb>,
    pub ext: Vec<ExtMap>,
    pub setup: Option<String>,
    pub mid: Option<String>,
    pub msid: Option<String>,
    pub ptime: Option<u32>,
    pub maxptime: Option<u32>,
    pub direction: Option<Direction>,
    pub ice_ufrag: Option<String>,
    pub ice_pwd: Option<String>,
    pub fingerprint: Option<Fingerprint>,
    pub candidates: Vec<Candidate>,
    pub end_of_candidates: bool,
    pub ice_options: Option<String>,
    pub ssrcs: Vec<SsrcAttribute>,
    pub ssrc_groups: Vec<SsrcGroup>,
    pub rtcp_mux: bool,
    pub rtcp_rsize: bool,
    pub sctpmap: Option<SctpMap>,
    pub rids: Vec<Rid>,
    pub simulcast: Option<Simulcast>,
    pub sctp_port: Option<u16>,
    pub max_message_size: Option<u32>,
    pub extmap_allow_mixed: bool,
    pub other_attributes: Vec<Attribute>,
}

impl MediaDescription {
    pub fn new(media_type: impl Into<String>, port: u16, protocol: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            port,
            num_ports: None,
            protocol: protocol.into(),
            payloads: String::new(),
            connection: None,
            bandwidths: Vec::new(),
            rtcp: None,
            rtp: Vec::new(),
            fmtp: Vec::new(),
            rtcp_fb: Vec::new(),
            ext: Vec::new(),
            setup: None,
            mid: None,
            msid: None,
            ptime: None,
            maxptime: None,
            direction: None,
            ice_ufrag: None,
            ice_pwd: None,
            fingerprint: None,
            candidates: Vec::new(),
            end_of_candidates: false,
            ice_options: None,
            ssrcs: Vec::new(),
            ssrc_groups: Vec::new(),
            rtcp_mux: false,
            rtcp_rsize: false,
            sctpmap: None,
            rids: Vec::new(),
            simulcast: None,
            sctp_port: None,
            max_message_size: None,
            extmap_allow_mixed: false,
            other_attributes: Vec::new(),
        }
    }

    pub fn fmtp_for(&self, payload: u8) -> Option<&Fmtp> {
        self.fmtp.iter().find(|f| f.payload == payload)
    }

    pub fn rtp_for(&self, payload: u8) -> Option<&RtpMap> {
        self.rtp.iter().find(|r| r.payload == payload)
    }
}
