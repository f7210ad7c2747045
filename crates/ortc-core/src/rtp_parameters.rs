//! RTP capability and parameter types.
//!
//! These mirror the JSON shapes the SFU exchanges over signaling (camelCase
//! member names), so router capabilities and producer/consumer parameters can be
//! deserialized straight from request payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Media kind of a codec, header extension or track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }

    /// Derive the kind from a `kind/name` mime type, case-insensitively.
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let (kind, name) = mime_type.split_once('/')?;
        if name.is_empty() {
            return None;
        }
        if kind.eq_ignore_ascii_case("audio") {
            Some(MediaKind::Audio)
        } else if kind.eq_ignore_ascii_case("video") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            other => Err(format!("unknown media kind {other:?}")),
        }
    }
}

/// Direction in which an RTP header extension is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RtpHeaderExtensionDirection {
    #[default]
    Sendrecv,
    Sendonly,
    Recvonly,
    Inactive,
}

impl RtpHeaderExtensionDirection {
    /// The direction as seen from the other peer.
    pub fn inverted(self) -> Self {
        match self {
            Self::Sendonly => Self::Recvonly,
            Self::Recvonly => Self::Sendonly,
            other => other,
        }
    }

    pub fn is_sending(self) -> bool {
        matches!(self, Self::Sendrecv | Self::Sendonly)
    }

    pub fn is_receiving(self) -> bool {
        matches!(self, Self::Sendrecv | Self::Recvonly)
    }
}

/// A single codec-specific parameter value.
///
/// fmtp values are either integers (`packetization-mode=1`) or free-form
/// strings (`profile-level-id=42e01f`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(u32),
    String(String),
}

impl ParameterValue {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::String(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s),
            ParameterValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(n) => write!(f, "{n}"),
            ParameterValue::String(s) => f.write_str(s),
        }
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        ParameterValue::Number(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Number(u32::from(value))
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

/// Codec-specific parameters, keyed by fmtp parameter name.
///
/// Keys are kept sorted so the fmtp lines generated from them are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodecParameters(BTreeMap<String, ParameterValue>);

impl CodecParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `name=value` pairs as found in an fmtp line.
    ///
    /// Numeric values become [`ParameterValue::Number`], except
    /// `profile-level-id`, which is hexadecimal and always kept as a string.
    pub fn from_fmtp_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.as_ref();
            let parsed = if key == "profile-level-id" {
                ParameterValue::String(value.to_string())
            } else {
                match value.parse::<u32>() {
                    Ok(n) => ParameterValue::Number(n),
                    Err(_) => ParameterValue::String(value.to_string()),
                }
            };
            params.0.insert(key, parsed);
        }
        params
    }

    /// Chainable insert, handy for building fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParameterValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ParameterValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.0.get(key)
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.0.get(key).and_then(ParameterValue::as_u32)
    }

    /// String form of a value regardless of how it was stored.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.0.get(key).map(ToString::to_string)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.0.iter()
    }

    /// Render as an fmtp config string: `a=1;b=2`.
    pub fn to_fmtp_config(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// RTCP feedback mechanism supported for a codec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RtcpFeedback {
    #[serde(rename = "type", default)]
    pub feedback_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl RtcpFeedback {
    pub fn new(feedback_type: impl Into<String>) -> Self {
        Self {
            feedback_type: feedback_type.into(),
            parameter: None,
        }
    }

    pub fn with_parameter(feedback_type: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            feedback_type: feedback_type.into(),
            parameter: Some(parameter.into()),
        }
    }

    /// Plain `nack` without a sub-parameter (as opposed to `nack pli`).
    pub fn is_generic_nack(&self) -> bool {
        self.feedback_type == "nack" && self.parameter.as_deref().map_or(true, str::is_empty)
    }
}

/// A codec supported by a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpCodecCapability {
    /// Filled from the mime type during validation when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_payload_type: Option<u8>,
    /// Mandatory; a missing value deserializes as 0 and fails validation.
    #[serde(default)]
    pub clock_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
    #[serde(default)]
    pub parameters: CodecParameters,
    #[serde(default)]
    pub rtcp_feedback: Vec<RtcpFeedback>,
}

impl RtpCodecCapability {
    pub fn is_rtx(&self) -> bool {
        is_rtx_mime_type(&self.mime_type)
    }
}

/// A header extension supported by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpHeaderExtension {
    pub kind: MediaKind,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub preferred_id: u16,
    #[serde(default)]
    pub preferred_encrypt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<RtpHeaderExtensionDirection>,
}

impl RtpHeaderExtension {
    /// Effective direction; absent means `sendrecv`.
    pub fn direction(&self) -> RtpHeaderExtensionDirection {
        self.direction.unwrap_or_default()
    }
}

/// Codecs and header extensions supported by one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpCapabilities {
    #[serde(default)]
    pub codecs: Vec<RtpCodecCapability>,
    #[serde(default)]
    pub header_extensions: Vec<RtpHeaderExtension>,
}

/// A codec as used by a producer or consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpCodecParameters {
    pub mime_type: String,
    pub payload_type: u8,
    #[serde(default)]
    pub clock_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
    #[serde(default)]
    pub parameters: CodecParameters,
    #[serde(default)]
    pub rtcp_feedback: Vec<RtcpFeedback>,
}

impl RtpCodecParameters {
    pub fn is_rtx(&self) -> bool {
        is_rtx_mime_type(&self.mime_type)
    }
}

/// A header extension as used by a producer or consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpHeaderExtensionParameters {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub id: u16,
    #[serde(default)]
    pub encrypt: bool,
    #[serde(default)]
    pub parameters: CodecParameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtpEncodingRtx {
    pub ssrc: u32,
}

/// One RTP stream (simulcast layer or single stream) of a producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpEncodingParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssrc: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_payload_type: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtx: Option<RtpEncodingRtx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtx: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalability_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_resolution_down_by: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_framerate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl RtpEncodingParameters {
    /// Overlay the caller-tunable fields of `other` onto this encoding.
    ///
    /// Stream identifiers (`ssrc`, `rid`, `rtx`) come from the local offer
    /// and are only taken from `other` when this encoding has none.
    pub fn merge_from(&mut self, other: &RtpEncodingParameters) {
        if self.ssrc.is_none() {
            self.ssrc = other.ssrc;
        }
        if self.rid.is_none() {
            self.rid = other.rid.clone();
        }
        if self.rtx.is_none() {
            self.rtx = other.rtx;
        }
        if other.codec_payload_type.is_some() {
            self.codec_payload_type = other.codec_payload_type;
        }
        if other.dtx.is_some() {
            self.dtx = other.dtx;
        }
        if other.scalability_mode.is_some() {
            self.scalability_mode = other.scalability_mode.clone();
        }
        if other.scale_resolution_down_by.is_some() {
            self.scale_resolution_down_by = other.scale_resolution_down_by;
        }
        if other.max_bitrate.is_some() {
            self.max_bitrate = other.max_bitrate;
        }
        if other.max_framerate.is_some() {
            self.max_framerate = other.max_framerate;
        }
        if other.active.is_some() {
            self.active = other.active;
        }
    }
}

fn default_reduced_size() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcpParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
    #[serde(default = "default_reduced_size")]
    pub reduced_size: bool,
}

impl Default for RtcpParameters {
    fn default() -> Self {
        Self {
            cname: None,
            reduced_size: true,
        }
    }
}

/// Full RTP parameter set of a producer or consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    #[serde(default)]
    pub codecs: Vec<RtpCodecParameters>,
    #[serde(default)]
    pub header_extensions: Vec<RtpHeaderExtensionParameters>,
    #[serde(default)]
    pub encodings: Vec<RtpEncodingParameters>,
    #[serde(default)]
    pub rtcp: RtcpParameters,
}

/// Whether a mime type names the RTX retransmission format.
pub fn is_rtx_mime_type(mime_type: &str) -> bool {
    mime_type.to_ascii_lowercase().ends_with("/rtx")
}

/// The part after the slash of a mime type, e.g. `VP8` for `video/VP8`.
pub fn codec_name(mime_type: &str) -> &str {
    mime_type
        .split_once('/')
        .map(|(_, name)| name)
        .unwrap_or(mime_type)
}
