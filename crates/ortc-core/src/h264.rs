//! H.264 `profile-level-id` handling (RFC 6184 section 8.1).
//!
//! A `profile-level-id` is three hex bytes: `profile_idc`, `profile_iop`
//! (constraint flags) and `level_idc`. The profile is recovered by matching
//! `profile_idc` and the constraint flags against a fixed pattern table. Two
//! codecs can only be negotiated when they resolve to the same profile; the
//! answer then carries either the local level (when both sides allow level
//! asymmetry) or the lower of the two levels.

use crate::error::ProfileLevelIdError;
use crate::rtp_parameters::CodecParameters;
use std::fmt;

/// Used when a codec carries no `profile-level-id` (constrained baseline, level 3.1).
pub const DEFAULT_PROFILE_LEVEL_ID: &str = "42e01f";

const CONSTRAINT_SET3_FLAG: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    ConstrainedBaseline,
    Baseline,
    Main,
    ConstrainedHigh,
    High,
    PredictiveHigh444,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Profile::ConstrainedBaseline => "constrained-baseline",
            Profile::Baseline => "baseline",
            Profile::Main => "main",
            Profile::ConstrainedHigh => "constrained-high",
            Profile::High => "high",
            Profile::PredictiveHigh444 => "predictive-high-444",
        };
        f.write_str(name)
    }
}

/// H.264 levels, valued by `level_idc` except 1b.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Level {
    L1b = 0,
    L1 = 10,
    L1_1 = 11,
    L1_2 = 12,
    L1_3 = 13,
    L2 = 20,
    L2_1 = 21,
    L2_2 = 22,
    L3 = 30,
    L3_1 = 31,
    L3_2 = 32,
    L4 = 40,
    L4_1 = 41,
    L4_2 = 42,
    L5 = 50,
    L5_1 = 51,
    L5_2 = 52,
}

impl Level {
    fn from_level_idc(level_idc: u8) -> Option<Self> {
        let level = match level_idc {
            10 => Level::L1,
            11 => Level::L1_1,
            12 => Level::L1_2,
            13 => Level::L1_3,
            20 => Level::L2,
            21 => Level::L2_1,
            22 => Level::L2_2,
            30 => Level::L3,
            31 => Level::L3_1,
            32 => Level::L3_2,
            40 => Level::L4,
            41 => Level::L4_1,
            42 => Level::L4_2,
            50 => Level::L5,
            51 => Level::L5_1,
            52 => Level::L5_2,
            _ => return None,
        };
        Some(level)
    }

    /// Level ordering where 1b sits between 1 and 1.1.
    pub fn is_less_than(self, other: Level) -> bool {
        if self == Level::L1b {
            return other != Level::L1 && other != Level::L1b;
        }
        if other == Level::L1b {
            return self == Level::L1;
        }
        (self as u8) < (other as u8)
    }

    pub fn min(self, other: Level) -> Level {
        if self.is_less_than(other) {
            self
        } else {
            other
        }
    }
}

/// One row of the profile pattern table: `profile_idc` plus a bit pattern over
/// `profile_iop`, most significant bit first, where `x` is "don't care".
struct ProfilePattern {
    profile_idc: u8,
    iop_pattern: &'static str,
    profile: Profile,
}

impl ProfilePattern {
    fn matches(&self, profile_idc: u8, profile_iop: u8) -> bool {
        if self.profile_idc != profile_idc {
            return false;
        }
        let mut mask = 0u8;
        let mut value = 0u8;
        for (i, c) in self.iop_pattern.bytes().enumerate() {
            let bit = 1u8 << (7 - i);
            match c {
                b'1' => {
                    mask |= bit;
                    value |= bit;
                }
                b'0' => mask |= bit,
                _ => {}
            }
        }
        (profile_iop ^ value) & mask == 0
    }
}

const PROFILE_PATTERNS: &[ProfilePattern] = &[
    ProfilePattern { profile_idc: 0x42, iop_pattern: "x1xx0000", profile: Profile::ConstrainedBaseline },
    ProfilePattern { profile_idc: 0x4d, iop_pattern: "1xxx0000", profile: Profile::ConstrainedBaseline },
    ProfilePattern { profile_idc: 0x58, iop_pattern: "11xx0000", profile: Profile::ConstrainedBaseline },
    ProfilePattern { profile_idc: 0x42, iop_pattern: "x0xx0000", profile: Profile::Baseline },
    ProfilePattern { profile_idc: 0x58, iop_pattern: "10xx0000", profile: Profile::Baseline },
    ProfilePattern { profile_idc: 0x4d, iop_pattern: "0x0x0000", profile: Profile::Main },
    ProfilePattern { profile_idc: 0x64, iop_pattern: "00000000", profile: Profile::High },
    ProfilePattern { profile_idc: 0x64, iop_pattern: "00001100", profile: Profile::ConstrainedHigh },
    ProfilePattern { profile_idc: 0xf4, iop_pattern: "00000000", profile: Profile::PredictiveHigh444 },
];

/// A parsed `profile-level-id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileLevelId {
    pub profile: Profile,
    pub level: Level,
}

impl ProfileLevelId {
    pub fn new(profile: Profile, level: Level) -> Self {
        Self { profile, level }
    }

    /// Parse the six hex digit form, e.g. `42e01f`.
    pub fn parse(value: &str) -> Result<Self, ProfileLevelIdError> {
        let invalid = || ProfileLevelIdError::Invalid(value.to_string());

        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let numeric = u32::from_str_radix(value, 16).map_err(|_| invalid())?;
        if numeric == 0 {
            return Err(invalid());
        }

        let level_idc = (numeric & 0xff) as u8;
        let profile_iop = ((numeric >> 8) & 0xff) as u8;
        let profile_idc = ((numeric >> 16) & 0xff) as u8;

        let level = if level_idc == Level::L1_1 as u8 {
            if profile_iop & CONSTRAINT_SET3_FLAG != 0 {
                Level::L1b
            } else {
                Level::L1_1
            }
        } else {
            Level::from_level_idc(level_idc).ok_or_else(invalid)?
        };

        PROFILE_PATTERNS
            .iter()
            .find(|pattern| pattern.matches(profile_idc, profile_iop))
            .map(|pattern| ProfileLevelId::new(pattern.profile, level))
            .ok_or_else(invalid)
    }

    /// Six hex digit form. Level 1b only exists for the baseline and main
    /// profiles, so other profiles at 1b have no representation.
    pub fn to_sdp_string(&self) -> Result<String, ProfileLevelIdError> {
        if self.level == Level::L1b {
            return match self.profile {
                Profile::ConstrainedBaseline => Ok("42f00b".to_string()),
                Profile::Baseline => Ok("42100b".to_string()),
                Profile::Main => Ok("4d100b".to_string()),
                other => Err(ProfileLevelIdError::UnrepresentableLevel1b(other.to_string())),
            };
        }

        let profile_idc_iop = match self.profile {
            Profile::ConstrainedBaseline => "42e0",
            Profile::Baseline => "4200",
            Profile::Main => "4d00",
            Profile::ConstrainedHigh => "640c",
            Profile::High => "6400",
            Profile::PredictiveHigh444 => "f400",
        };
        Ok(format!("{}{:02x}", profile_idc_iop, self.level as u8))
    }
}

/// Parse the `profile-level-id` of a codec, using the default when absent.
pub fn parse_sdp_profile_level_id(
    params: &CodecParameters,
) -> Result<ProfileLevelId, ProfileLevelIdError> {
    match params.get_string("profile-level-id") {
        Some(value) => ProfileLevelId::parse(&value),
        None => ProfileLevelId::parse(DEFAULT_PROFILE_LEVEL_ID),
    }
}

/// True when both parameter sets carry valid ids of the same profile.
pub fn is_same_profile(a: &CodecParameters, b: &CodecParameters) -> bool {
    match (parse_sdp_profile_level_id(a), parse_sdp_profile_level_id(b)) {
        (Ok(a), Ok(b)) => a.profile == b.profile,
        _ => false,
    }
}

pub fn is_level_asymmetry_allowed(params: &CodecParameters) -> bool {
    params.get_u32("level-asymmetry-allowed") == Some(1)
}

/// Compute the `profile-level-id` to put in an answer.
///
/// Returns `Ok(None)` when neither side specifies one, so the answer should
/// not either.
pub fn generate_profile_level_id_for_answer(
    local_supported: &CodecParameters,
    remote_offered: &CodecParameters,
) -> Result<Option<String>, ProfileLevelIdError> {
    if !local_supported.contains_key("profile-level-id")
        && !remote_offered.contains_key("profile-level-id")
    {
        return Ok(None);
    }

    let local = parse_sdp_profile_level_id(local_supported)?;
    let remote = parse_sdp_profile_level_id(remote_offered)?;

    if local.profile != remote.profile {
        return Err(ProfileLevelIdError::ProfileMismatch {
            local: local.profile.to_string(),
            remote: remote.profile.to_string(),
        });
    }

    let level_asymmetry_allowed =
        is_level_asymmetry_allowed(local_supported) && is_level_asymmetry_allowed(remote_offered);

    let answer_level = if level_asymmetry_allowed {
        local.level
    } else {
        local.level.min(remote.level)
    };

    ProfileLevelId::new(local.profile, answer_level)
        .to_sdp_string()
        .map(Some)
}
