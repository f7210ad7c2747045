//! Codec and header extension matching.

use crate::codec_parameters::{packetization_mode, CodecFamily};
use crate::h264;
use crate::rtp_parameters::{
    CodecParameters, RtcpFeedback, RtpCodecCapability, RtpCodecParameters, RtpHeaderExtension,
};
use tracing::trace;

/// Common view over codec capabilities and codec parameters.
pub trait CodecLike {
    fn mime_type(&self) -> &str;
    fn clock_rate(&self) -> u32;
    fn channels(&self) -> Option<u8>;
    fn parameters(&self) -> &CodecParameters;
    fn parameters_mut(&mut self) -> &mut CodecParameters;
}

impl CodecLike for RtpCodecCapability {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }
    fn clock_rate(&self) -> u32 {
        self.clock_rate
    }
    fn channels(&self) -> Option<u8> {
        self.channels
    }
    fn parameters(&self) -> &CodecParameters {
        &self.parameters
    }
    fn parameters_mut(&mut self) -> &mut CodecParameters {
        &mut self.parameters
    }
}

impl CodecLike for RtpCodecParameters {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }
    fn clock_rate(&self) -> u32 {
        self.clock_rate
    }
    fn channels(&self) -> Option<u8> {
        self.channels
    }
    fn parameters(&self) -> &CodecParameters {
        &self.parameters
    }
    fn parameters_mut(&mut self) -> &mut CodecParameters {
        &mut self.parameters
    }
}

enum Comparison {
    Mismatch,
    Match,
    /// Strict H.264 match; carries the negotiated `profile-level-id`, `None`
    /// meaning the parameter must be dropped.
    H264 { profile_level_id: Option<String> },
}

fn compare<A, B>(a: &A, b: &B, strict: bool) -> Comparison
where
    A: CodecLike + ?Sized,
    B: CodecLike + ?Sized,
{
    let a_mime = a.mime_type().to_ascii_lowercase();
    if a_mime != b.mime_type().to_ascii_lowercase() {
        return Comparison::Mismatch;
    }

    if a_mime.starts_with("audio/")
        && (a.clock_rate() != b.clock_rate() || a.channels().unwrap_or(1) != b.channels().unwrap_or(1))
    {
        return Comparison::Mismatch;
    }

    if !strict {
        return Comparison::Match;
    }

    match CodecFamily::from_mime_type(&a_mime) {
        CodecFamily::H264 => {
            if !same_packetization_mode(a.parameters(), b.parameters()) {
                return Comparison::Mismatch;
            }
            if !h264::is_same_profile(a.parameters(), b.parameters()) {
                return Comparison::Mismatch;
            }
            let profile_level_id =
                match h264::generate_profile_level_id_for_answer(a.parameters(), b.parameters()) {
                    Ok(selected) => selected,
                    Err(err) => {
                        trace!(error = %err, "no answer profile-level-id, clearing it");
                        None
                    }
                };
            Comparison::H264 { profile_level_id }
        }
        CodecFamily::Vp9 => {
            if same_packetization_mode(a.parameters(), b.parameters()) {
                Comparison::Match
            } else {
                Comparison::Mismatch
            }
        }
        _ => Comparison::Match,
    }
}

fn same_packetization_mode(a: &CodecParameters, b: &CodecParameters) -> bool {
    match (packetization_mode(a), packetization_mode(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn set_profile_level_id(params: &mut CodecParameters, profile_level_id: &Option<String>) {
    match profile_level_id {
        Some(value) => params.insert("profile-level-id", value.as_str()),
        None => {
            params.remove("profile-level-id");
        }
    }
}

/// Whether two codecs describe the same format.
///
/// The mime type must match case-insensitively; audio codecs must also agree
/// on clock rate and channel count. In `strict` mode H.264 codecs must share
/// `packetization-mode` and profile, and VP9 codecs `packetization-mode`.
///
/// With `may_mutate`, a strict H.264 match rewrites both sides'
/// `profile-level-id` to the negotiated answer value, or removes it when no
/// answer value can be computed.
pub fn match_codec<A, B>(a: &mut A, b: &mut B, strict: bool, may_mutate: bool) -> bool
where
    A: CodecLike + ?Sized,
    B: CodecLike + ?Sized,
{
    match compare(&*a, &*b, strict) {
        Comparison::Mismatch => false,
        Comparison::Match => true,
        Comparison::H264 { profile_level_id } => {
            if may_mutate {
                set_profile_level_id(a.parameters_mut(), &profile_level_id);
                set_profile_level_id(b.parameters_mut(), &profile_level_id);
            }
            true
        }
    }
}

/// Non-mutating form of [`match_codec`].
pub fn codecs_match<A, B>(a: &A, b: &B, strict: bool) -> bool
where
    A: CodecLike + ?Sized,
    B: CodecLike + ?Sized,
{
    !matches!(compare(a, b, strict), Comparison::Mismatch)
}

/// Feedback entries present on both sides, in `remote`'s order.
pub fn reduce_rtcp_feedback(local: &[RtcpFeedback], remote: &[RtcpFeedback]) -> Vec<RtcpFeedback> {
    remote
        .iter()
        .filter(|fb| local.contains(fb))
        .cloned()
        .collect()
}

pub fn match_header_extension(a: &RtpHeaderExtension, b: &RtpHeaderExtension) -> bool {
    a.kind == b.kind && a.uri == b.uri
}
