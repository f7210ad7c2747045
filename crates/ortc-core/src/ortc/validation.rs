//! Validation and normalization of capability and parameter input.
//!
//! Validation is fail-fast: the first offending field is reported. Functions
//! taking a whole set work on a copy and only write back on success, so a
//! rejected input is left exactly as it was.

use crate::codec_parameters::CodecFamilyParameters;
use crate::error::{ValidationError, ValidationResult};
use crate::rtp_parameters::{
    MediaKind, RtcpFeedback, RtpCapabilities, RtpCodecCapability, RtpCodecParameters,
    RtpHeaderExtension, RtpHeaderExtensionDirection, RtpHeaderExtensionParameters, RtpParameters,
};
use crate::sctp_parameters::{SctpCapabilities, SctpParameters, SctpStreamParameters};

/// Validate and normalize a capability set.
///
/// Fills `kind` from the mime type, `channels` to 1 for audio and header
/// extension `direction` to sendrecv.
pub fn validate_rtp_capabilities(caps: &mut RtpCapabilities) -> ValidationResult<()> {
    let mut validated = caps.clone();
    for codec in &mut validated.codecs {
        validate_rtp_codec_capability(codec)?;
    }
    for ext in &mut validated.header_extensions {
        validate_rtp_header_extension(ext)?;
    }
    *caps = validated;
    Ok(())
}

pub fn validate_rtp_codec_capability(codec: &mut RtpCodecCapability) -> ValidationResult<()> {
    let kind = media_kind_of(&codec.mime_type)?;
    if let Some(declared) = codec.kind {
        if declared != kind {
            return Err(ValidationError::invalid(
                "codec.kind",
                format!("{declared} does not match mimeType {}", codec.mime_type),
            ));
        }
    }
    codec.kind = Some(kind);

    if codec.preferred_payload_type.is_none() {
        return Err(ValidationError::missing("codec.preferredPayloadType"));
    }
    if codec.clock_rate == 0 {
        return Err(ValidationError::missing("codec.clockRate"));
    }

    normalize_channels(kind, &mut codec.channels);

    for fb in &codec.rtcp_feedback {
        validate_rtcp_feedback(fb)?;
    }
    CodecFamilyParameters::parse(&codec.mime_type, &codec.parameters)?;
    Ok(())
}

pub fn validate_rtp_header_extension(ext: &mut RtpHeaderExtension) -> ValidationResult<()> {
    if ext.uri.is_empty() {
        return Err(ValidationError::missing("headerExtension.uri"));
    }
    if ext.preferred_id == 0 {
        return Err(ValidationError::missing("headerExtension.preferredId"));
    }
    if ext.direction.is_none() {
        ext.direction = Some(RtpHeaderExtensionDirection::Sendrecv);
    }
    Ok(())
}

pub fn validate_rtcp_feedback(fb: &RtcpFeedback) -> ValidationResult<()> {
    if fb.feedback_type.is_empty() {
        return Err(ValidationError::missing("rtcpFeedback.type"));
    }
    Ok(())
}

/// Validate and normalize producer or consumer RTP parameters.
pub fn validate_rtp_parameters(params: &mut RtpParameters) -> ValidationResult<()> {
    let mut validated = params.clone();
    for codec in &mut validated.codecs {
        validate_rtp_codec_parameters(codec)?;
    }
    for ext in &validated.header_extensions {
        validate_rtp_header_extension_parameters(ext)?;
    }
    *params = validated;
    Ok(())
}

fn validate_rtp_codec_parameters(codec: &mut RtpCodecParameters) -> ValidationResult<()> {
    let kind = media_kind_of(&codec.mime_type)?;
    if codec.clock_rate == 0 {
        return Err(ValidationError::missing("codec.clockRate"));
    }
    normalize_channels(kind, &mut codec.channels);
    for fb in &codec.rtcp_feedback {
        validate_rtcp_feedback(fb)?;
    }
    CodecFamilyParameters::parse(&codec.mime_type, &codec.parameters)?;
    Ok(())
}

fn validate_rtp_header_extension_parameters(ext: &RtpHeaderExtensionParameters) -> ValidationResult<()> {
    if ext.uri.is_empty() {
        return Err(ValidationError::missing("headerExtension.uri"));
    }
    if ext.id == 0 {
        return Err(ValidationError::missing("headerExtension.id"));
    }
    Ok(())
}

pub fn validate_sctp_capabilities(caps: &SctpCapabilities) -> ValidationResult<()> {
    if caps.num_streams.os == 0 {
        return Err(ValidationError::missing("numStreams.OS"));
    }
    if caps.num_streams.mis == 0 {
        return Err(ValidationError::missing("numStreams.MIS"));
    }
    Ok(())
}

pub fn validate_sctp_parameters(params: &SctpParameters) -> ValidationResult<()> {
    if params.port == 0 {
        return Err(ValidationError::missing("sctpParameters.port"));
    }
    if params.os == 0 {
        return Err(ValidationError::missing("sctpParameters.OS"));
    }
    if params.mis == 0 {
        return Err(ValidationError::missing("sctpParameters.MIS"));
    }
    if params.max_message_size == 0 {
        return Err(ValidationError::missing("sctpParameters.maxMessageSize"));
    }
    Ok(())
}

/// Validate stream parameters and settle `ordered`.
///
/// Partial reliability (`maxPacketLifeTime` or `maxRetransmits`, never both)
/// implies unordered delivery.
pub fn validate_sctp_stream_parameters(params: &mut SctpStreamParameters) -> ValidationResult<()> {
    let partially_reliable = params.max_packet_life_time.is_some() || params.max_retransmits.is_some();

    if params.max_packet_life_time.is_some() && params.max_retransmits.is_some() {
        return Err(ValidationError::invalid(
            "sctpStreamParameters",
            "cannot provide both maxPacketLifeTime and maxRetransmits",
        ));
    }

    match params.ordered {
        Some(true) if partially_reliable => {
            return Err(ValidationError::invalid(
                "sctpStreamParameters.ordered",
                "cannot be ordered with maxPacketLifeTime or maxRetransmits",
            ));
        }
        Some(_) => {}
        None => params.ordered = Some(!partially_reliable),
    }
    Ok(())
}

fn media_kind_of(mime_type: &str) -> ValidationResult<MediaKind> {
    MediaKind::from_mime_type(mime_type).ok_or_else(|| {
        ValidationError::invalid("codec.mimeType", format!("{mime_type:?} is not audio/* or video/*"))
    })
}

fn normalize_channels(kind: MediaKind, channels: &mut Option<u8>) {
    match kind {
        MediaKind::Audio => {
            if channels.is_none() {
                *channels = Some(1);
            }
        }
        MediaKind::Video => *channels = None,
    }
}
