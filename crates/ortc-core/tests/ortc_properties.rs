//! Property tests for the capability matcher.

use ortc_core::prelude::*;
use ortc_core::uris;
use proptest::prelude::*;

const MIME_TYPES: &[&str] = &["audio/opus", "audio/PCMU", "video/VP8", "video/VP9", "video/H264"];
const FEEDBACK: &[(&str, Option<&str>)] = &[
    ("nack", None),
    ("nack", Some("pli")),
    ("ccm", Some("fir")),
    ("goog-remb", None),
    ("transport-cc", None),
];
const EXT_URIS: &[&str] = &[
    uris::TRANSPORT_WIDE_CC,
    uris::ABS_SEND_TIME,
    uris::SDES_MID,
    "urn:3gpp:video-orientation",
    "urn:ietf:params:rtp-hdrext:ssrc-audio-level",
];

fn direction() -> impl Strategy<Value = RtpHeaderExtensionDirection> {
    prop_oneof![
        Just(RtpHeaderExtensionDirection::Sendrecv),
        Just(RtpHeaderExtensionDirection::Sendonly),
        Just(RtpHeaderExtensionDirection::Recvonly),
        Just(RtpHeaderExtensionDirection::Inactive),
    ]
}

/// (mime index, has rtx, feedback bitmask)
fn codec_specs() -> impl Strategy<Value = Vec<(usize, bool, u8)>> {
    prop::collection::vec((0..MIME_TYPES.len(), any::<bool>(), 0u8..32), 0..5)
}

/// (video kind, uri index, direction)
fn ext_specs() -> impl Strategy<Value = Vec<(bool, usize, RtpHeaderExtensionDirection)>> {
    prop::collection::vec((any::<bool>(), 0..EXT_URIS.len(), direction()), 0..6)
}

fn build_caps(
    codecs: &[(usize, bool, u8)],
    exts: &[(bool, usize, RtpHeaderExtensionDirection)],
    first_payload_type: u8,
) -> RtpCapabilities {
    let mut caps = RtpCapabilities::default();
    let mut next_pt = first_payload_type;

    for &(mime_idx, has_rtx, mask) in codecs {
        let mime_type = MIME_TYPES[mime_idx];
        let kind = MediaKind::from_mime_type(mime_type).unwrap();
        let rtcp_feedback = FEEDBACK
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, (t, p))| RtcpFeedback {
                feedback_type: t.to_string(),
                parameter: p.map(str::to_string),
            })
            .collect();
        let payload_type = next_pt;
        next_pt += 1;
        caps.codecs.push(RtpCodecCapability {
            kind: Some(kind),
            mime_type: mime_type.to_string(),
            preferred_payload_type: Some(payload_type),
            clock_rate: if kind == MediaKind::Audio { 48000 } else { 90000 },
            channels: if kind == MediaKind::Audio { Some(2) } else { None },
            parameters: CodecParameters::new(),
            rtcp_feedback,
        });
        if has_rtx {
            caps.codecs.push(RtpCodecCapability {
                kind: Some(kind),
                mime_type: format!("{kind}/rtx"),
                preferred_payload_type: Some(next_pt),
                clock_rate: if kind == MediaKind::Audio { 48000 } else { 90000 },
                channels: None,
                parameters: CodecParameters::new().with("apt", u32::from(payload_type)),
                rtcp_feedback: vec![],
            });
            next_pt += 1;
        }
    }

    for (i, &(video, uri_idx, direction)) in exts.iter().enumerate() {
        caps.header_extensions.push(RtpHeaderExtension {
            kind: if video { MediaKind::Video } else { MediaKind::Audio },
            uri: EXT_URIS[uri_idx].to_string(),
            preferred_id: i as u16 + 1,
            preferred_encrypt: false,
            direction: Some(direction),
        });
    }
    caps
}

fn pair() -> impl Strategy<Value = (RtpCapabilities, RtpCapabilities)> {
    (codec_specs(), ext_specs(), codec_specs(), ext_specs()).prop_map(|(lc, le, rc, re)| {
        (build_caps(&lc, &le, 96), build_caps(&rc, &re, 100))
    })
}

proptest! {
    #[test]
    fn extend_is_deterministic_and_follows_remote_order((local, remote) in pair()) {
        let first = ortc::get_extended_rtp_capabilities(&local, &remote);
        let second = ortc::get_extended_rtp_capabilities(&local, &remote);
        prop_assert_eq!(&first, &second);

        let positions: Vec<usize> = first
            .codecs
            .iter()
            .map(|codec| {
                remote
                    .codecs
                    .iter()
                    .position(|c| c.preferred_payload_type == Some(codec.remote_payload_type))
                    .unwrap()
            })
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rtx_pairing_is_symmetric((local, remote) in pair()) {
        let extended = ortc::get_extended_rtp_capabilities(&local, &remote);
        for codec in &extended.codecs {
            prop_assert_eq!(codec.local_rtx_payload_type.is_some(), codec.remote_rtx_payload_type.is_some());
            if let (Some(local_rtx), Some(remote_rtx)) = (codec.local_rtx_payload_type, codec.remote_rtx_payload_type) {
                let count = |caps: &RtpCapabilities, apt: u8, pt: u8| {
                    caps.codecs
                        .iter()
                        .filter(|c| c.is_rtx() && c.parameters.get_u32("apt") == Some(u32::from(apt)))
                        .filter(|c| c.preferred_payload_type == Some(pt))
                        .count()
                };
                prop_assert_eq!(count(&local, codec.local_payload_type, local_rtx), 1);
                prop_assert_eq!(count(&remote, codec.remote_payload_type, remote_rtx), 1);
            }
        }
    }

    #[test]
    fn header_extension_direction_is_inverted((local, remote) in pair()) {
        let extended = ortc::get_extended_rtp_capabilities(&local, &remote);
        for ext in &extended.header_extensions {
            let remote_ext = remote
                .header_extensions
                .iter()
                .find(|r| r.kind == ext.kind && r.uri == ext.uri && r.preferred_id == ext.recv_id)
                .unwrap();
            let expected = match remote_ext.direction() {
                RtpHeaderExtensionDirection::Sendonly => RtpHeaderExtensionDirection::Recvonly,
                RtpHeaderExtensionDirection::Recvonly => RtpHeaderExtensionDirection::Sendonly,
                other => other,
            };
            prop_assert_eq!(ext.direction, expected);
        }
    }

    #[test]
    fn remote_parameters_never_mix_congestion_feedback((local, remote) in pair()) {
        let extended = ortc::get_extended_rtp_capabilities(&local, &remote);
        for kind in [MediaKind::Audio, MediaKind::Video] {
            let params = ortc::get_sending_remote_rtp_parameters(kind, &extended);
            for codec in &params.codecs {
                let has = |t: &str| codec.rtcp_feedback.iter().any(|fb| fb.feedback_type == t);
                prop_assert!(!(has("transport-cc") && has("goog-remb")));
            }
        }
    }

    #[test]
    fn opus_nack_support_is_idempotent((local, _remote) in pair()) {
        let mut once = local.clone();
        ortc::add_nack_support_for_opus(&mut once);
        let mut twice = once.clone();
        ortc::add_nack_support_for_opus(&mut twice);
        prop_assert_eq!(once, twice);
    }
}
