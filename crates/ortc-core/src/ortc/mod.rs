//! ORTC capability negotiation.
//!
//! The functions here are stateless. A client device calls
//! [`get_extended_rtp_capabilities`] once when it loads the router
//! capabilities and derives everything else from the cached result.
//!
//! ```text
//! native caps ──┐
//!               ├─ get_extended_rtp_capabilities ─┬─ get_recv_rtp_capabilities
//! router caps ──┘                                 ├─ get_sending_rtp_parameters
//!                                                 └─ get_sending_remote_rtp_parameters
//! ```

mod derive;
mod matching;
mod validation;

pub use derive::{
    add_nack_support_for_opus, can_receive, can_send, get_extended_rtp_capabilities,
    get_recv_rtp_capabilities, get_sending_remote_rtp_parameters, get_sending_rtp_parameters,
    reduce_codecs,
};
pub use matching::{codecs_match, match_codec, match_header_extension, reduce_rtcp_feedback, CodecLike};
pub use validation::{
    validate_rtcp_feedback, validate_rtp_capabilities, validate_rtp_codec_capability,
    validate_rtp_header_extension, validate_rtp_parameters, validate_sctp_capabilities,
    validate_sctp_parameters, validate_sctp_stream_parameters,
};

use crate::rtp_parameters::{CodecParameters, MediaKind, RtcpFeedback, RtpHeaderExtensionDirection};
use serde::{Deserialize, Serialize};

/// A codec both peers support, with each side's payload types and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedRtpCodec {
    pub kind: MediaKind,
    pub mime_type: String,
    pub clock_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
    pub local_payload_type: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_rtx_payload_type: Option<u8>,
    pub remote_payload_type: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_rtx_payload_type: Option<u8>,
    pub local_parameters: CodecParameters,
    pub remote_parameters: CodecParameters,
    pub rtcp_feedback: Vec<RtcpFeedback>,
}

/// A header extension both peers support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedRtpHeaderExtension {
    pub kind: MediaKind,
    pub uri: String,
    /// Id used in RTP we send (the local preferred id).
    pub send_id: u16,
    /// Id used in RTP we receive (the router's preferred id).
    pub recv_id: u16,
    pub encrypt: bool,
    /// Direction from the local point of view.
    pub direction: RtpHeaderExtensionDirection,
}

/// Intersection of native and router capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedRtpCapabilities {
    pub codecs: Vec<ExtendedRtpCodec>,
    pub header_extensions: Vec<ExtendedRtpHeaderExtension>,
}
