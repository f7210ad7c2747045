//! # ORTC Core
//!
//! Capability negotiation for clients of mediasoup-style SFUs.
//!
//! The crate reconciles what the local WebRTC stack can do (the *native*
//! capabilities) with what the router offers (the *router* capabilities) into an
//! [`ExtendedRtpCapabilities`] set, and derives the per-direction RTP parameter
//! sets a client needs to produce and consume media.
//!
//! Everything here is a pure function over plain data. There is no shared state
//! and no I/O, so any function may be called from any task.
//!
//! ## Modules
//!
//! - [`rtp_parameters`]: capability and parameter types exchanged with the server
//! - [`codec_parameters`]: typed per-codec-family view over fmtp parameters
//! - [`h264`]: H.264 `profile-level-id` parsing and answer negotiation
//! - [`sctp_parameters`], [`transport_parameters`]: SCTP, ICE and DTLS descriptors
//! - [`ortc`]: validation, matching and derivation algorithms
//!
//! ## Example
//!
//! ```
//! use ortc_core::prelude::*;
//!
//! let local: RtpCapabilities = serde_json::from_value(serde_json::json!({
//!     "codecs": [
//!         { "mimeType": "video/VP8", "clockRate": 90000, "preferredPayloadType": 96 }
//!     ]
//! })).unwrap();
//! let remote: RtpCapabilities = serde_json::from_value(serde_json::json!({
//!     "codecs": [
//!         { "mimeType": "video/VP8", "clockRate": 90000, "preferredPayloadType": 101 }
//!     ]
//! })).unwrap();
//!
//! let extended = ortc::get_extended_rtp_capabilities(&local, &remote);
//! assert_eq!(extended.codecs[0].local_payload_type, 96);
//! assert_eq!(extended.codecs[0].remote_payload_type, 101);
//! ```

pub mod codec_parameters;
pub mod error;
pub mod h264;
pub mod ortc;
pub mod rtp_parameters;
pub mod sctp_parameters;
pub mod transport_parameters;

pub use codec_parameters::{CodecFamily, CodecFamilyParameters};
pub use error::{NegotiationError, NegotiationResult, ProfileLevelIdError, ValidationError, ValidationResult};
pub use ortc::{ExtendedRtpCapabilities, ExtendedRtpCodec, ExtendedRtpHeaderExtension};
pub use rtp_parameters::{
    CodecParameters, MediaKind, ParameterValue, RtcpFeedback, RtcpParameters, RtpCapabilities,
    RtpCodecCapability, RtpCodecParameters, RtpEncodingParameters, RtpEncodingRtx,
    RtpHeaderExtension, RtpHeaderExtensionDirection, RtpHeaderExtensionParameters, RtpParameters,
};
pub use sctp_parameters::{NumSctpStreams, SctpCapabilities, SctpParameters, SctpStreamParameters};
pub use transport_parameters::{
    DtlsFingerprint, DtlsParameters, DtlsRole, IceCandidate, IceParameters,
};

/// Well-known RTP header extension URIs.
pub mod uris {
    /// Transport-wide congestion control sequence numbers.
    pub const TRANSPORT_WIDE_CC: &str =
        "http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01";

    /// Absolute send time, used together with `goog-remb` feedback.
    pub const ABS_SEND_TIME: &str = "http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time";

    pub const SDES_MID: &str = "urn:ietf:params:rtp-hdrext:sdes:mid";
}

/// Commonly used imports.
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ortc;
    pub use crate::ortc::{ExtendedRtpCapabilities, ExtendedRtpCodec, ExtendedRtpHeaderExtension};
    pub use crate::rtp_parameters::*;
    pub use crate::sctp_parameters::*;
    pub use crate::transport_parameters::*;
}
