//! Typed view over codec parameters, one variant per codec family.
//!
//! Wire data carries parameters as an untyped `name=value` map. At the points
//! where that data enters (capability and parameter validation) the map is
//! interpreted according to the codec's mime type, so malformed
//! family-specific values are rejected early instead of surfacing as a silent
//! mismatch during negotiation.

use crate::error::{ValidationError, ValidationResult};
use crate::h264::ProfileLevelId;
use crate::rtp_parameters::CodecParameters;

/// Codec family, derived from a mime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecFamily {
    Opus,
    MultiOpus,
    H264,
    H265,
    Vp8,
    Vp9,
    Av1,
    Rtx,
    Other,
}

impl CodecFamily {
    pub fn from_mime_type(mime_type: &str) -> Self {
        match mime_type.to_ascii_lowercase().as_str() {
            "audio/opus" => CodecFamily::Opus,
            "audio/multiopus" => CodecFamily::MultiOpus,
            "video/h264" => CodecFamily::H264,
            "video/h265" => CodecFamily::H265,
            "video/vp8" => CodecFamily::Vp8,
            "video/vp9" => CodecFamily::Vp9,
            "video/av1" => CodecFamily::Av1,
            m if m.ends_with("/rtx") => CodecFamily::Rtx,
            _ => CodecFamily::Other,
        }
    }

    pub fn is_opus(self) -> bool {
        matches!(self, CodecFamily::Opus | CodecFamily::MultiOpus)
    }

    /// Video codecs that honour the `x-google-*-bitrate` hints.
    pub fn accepts_google_bitrate_hints(self) -> bool {
        matches!(
            self,
            CodecFamily::Vp8 | CodecFamily::Vp9 | CodecFamily::H264 | CodecFamily::H265 | CodecFamily::Av1
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpusParameters {
    pub stereo: Option<bool>,
    pub sprop_stereo: Option<bool>,
    pub use_inband_fec: Option<bool>,
    pub use_dtx: Option<bool>,
    pub max_playback_rate: Option<u32>,
    pub max_average_bitrate: Option<u32>,
    pub ptime: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct H264Parameters {
    pub packetization_mode: u8,
    /// `None` when the codec carries no `profile-level-id`.
    pub profile_level_id: Option<ProfileLevelId>,
    pub level_asymmetry_allowed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vp9Parameters {
    pub profile_id: u8,
    pub packetization_mode: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtxParameters {
    /// Payload type of the codec this RTX stream retransmits.
    pub apt: u8,
}

/// Codec parameters interpreted per family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecFamilyParameters {
    Opus(OpusParameters),
    H264(H264Parameters),
    Vp9(Vp9Parameters),
    Rtx(RtxParameters),
    Generic(CodecParameters),
}

impl CodecFamilyParameters {
    /// Interpret `params` according to `mime_type`.
    pub fn parse(mime_type: &str, params: &CodecParameters) -> ValidationResult<Self> {
        let parsed = match CodecFamily::from_mime_type(mime_type) {
            CodecFamily::Opus | CodecFamily::MultiOpus => CodecFamilyParameters::Opus(OpusParameters {
                stereo: flag(params, "stereo")?,
                sprop_stereo: flag(params, "sprop-stereo")?,
                use_inband_fec: flag(params, "useinbandfec")?,
                use_dtx: flag(params, "usedtx")?,
                max_playback_rate: number(params, "maxplaybackrate")?,
                max_average_bitrate: number(params, "maxaveragebitrate")?,
                ptime: number(params, "ptime")?,
            }),
            CodecFamily::H264 => {
                let profile_level_id = match params.get_string("profile-level-id") {
                    Some(value) => Some(ProfileLevelId::parse(&value).map_err(|e| {
                        ValidationError::invalid("codec.parameters.profile-level-id", e.to_string())
                    })?),
                    None => None,
                };
                CodecFamilyParameters::H264(H264Parameters {
                    packetization_mode: packetization_mode(params)?,
                    profile_level_id,
                    level_asymmetry_allowed: flag(params, "level-asymmetry-allowed")?.unwrap_or(false),
                })
            }
            CodecFamily::Vp9 => CodecFamilyParameters::Vp9(Vp9Parameters {
                profile_id: small_number(params, "profile-id")?.unwrap_or(0),
                packetization_mode: packetization_mode(params)?,
            }),
            CodecFamily::Rtx => {
                let apt = small_number(params, "apt")?
                    .ok_or_else(|| ValidationError::missing("codec.parameters.apt"))?;
                CodecFamilyParameters::Rtx(RtxParameters { apt })
            }
            _ => CodecFamilyParameters::Generic(params.clone()),
        };
        Ok(parsed)
    }
}

/// `packetization-mode`, defaulting to 0 and restricted to 0 or 1.
pub fn packetization_mode(params: &CodecParameters) -> ValidationResult<u8> {
    match small_number(params, "packetization-mode")? {
        None => Ok(0),
        Some(mode @ (0 | 1)) => Ok(mode),
        Some(other) => Err(ValidationError::invalid(
            "codec.parameters.packetization-mode",
            format!("{other} is not 0 or 1"),
        )),
    }
}

fn number(params: &CodecParameters, key: &str) -> ValidationResult<Option<u32>> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => value.as_u32().map(Some).ok_or_else(|| {
            ValidationError::invalid(format!("codec.parameters.{key}"), format!("{value} is not a number"))
        }),
    }
}

fn small_number(params: &CodecParameters, key: &str) -> ValidationResult<Option<u8>> {
    match number(params, key)? {
        None => Ok(None),
        Some(n) => u8::try_from(n).map(Some).map_err(|_| {
            ValidationError::invalid(format!("codec.parameters.{key}"), format!("{n} is out of range"))
        }),
    }
}

fn flag(params: &CodecParameters, key: &str) -> ValidationResult<Option<bool>> {
    match number(params, key)? {
        None => Ok(None),
        Some(0) => Ok(Some(false)),
        Some(1) => Ok(Some(true)),
        Some(n) => Err(ValidationError::invalid(
            format!("codec.parameters.{key}"),
            format!("{n} is not 0 or 1"),
        )),
    }
}
