//! Extended capabilities and the parameter sets derived from them.

use super::matching::{codecs_match, match_codec, match_header_extension, reduce_rtcp_feedback};
use super::validation::validate_rtp_parameters;
use super::{ExtendedRtpCapabilities, ExtendedRtpCodec, ExtendedRtpHeaderExtension};
use crate::codec_parameters::CodecFamily;
use crate::error::{NegotiationError, NegotiationResult, ValidationResult};
use crate::rtp_parameters::{
    CodecParameters, MediaKind, RtcpFeedback, RtpCapabilities, RtpCodecCapability, RtpCodecParameters,
    RtpHeaderExtension, RtpHeaderExtensionParameters, RtpParameters,
};
use crate::uris;
use tracing::{debug, trace};

/// Reconcile local (native) and remote (router) capabilities.
///
/// Codecs come out in the remote's order. Each local codec backs at most one
/// extended codec, so duplicate local entries of one format are consumed in
/// turn. RTX is paired per side through the `apt` parameter and only kept when
/// both sides have it. Header extensions are matched on (kind, uri) and their
/// direction is inverted to the local point of view.
pub fn get_extended_rtp_capabilities(
    local: &RtpCapabilities,
    remote: &RtpCapabilities,
) -> ExtendedRtpCapabilities {
    let mut extended = ExtendedRtpCapabilities::default();
    let mut used = vec![false; local.codecs.len()];

    for remote_codec in remote.codecs.iter().filter(|c| !c.is_rtx()) {
        let Some(remote_payload_type) = remote_codec.preferred_payload_type else {
            continue;
        };
        let mut remote_codec = remote_codec.clone();

        let matched = local.codecs.iter().enumerate().find_map(|(idx, candidate)| {
            if used[idx] || candidate.is_rtx() || candidate.preferred_payload_type.is_none() {
                return None;
            }
            let mut candidate = candidate.clone();
            match_codec(&mut candidate, &mut remote_codec, true, true).then_some((idx, candidate))
        });

        let Some((idx, local_codec)) = matched else {
            trace!(mime_type = %remote_codec.mime_type, "no local codec for remote codec");
            continue;
        };
        let Some(kind) = local_codec
            .kind
            .or_else(|| MediaKind::from_mime_type(&local_codec.mime_type))
        else {
            continue;
        };
        let Some(local_payload_type) = local_codec.preferred_payload_type else {
            continue;
        };
        used[idx] = true;

        extended.codecs.push(ExtendedRtpCodec {
            kind,
            mime_type: local_codec.mime_type.clone(),
            clock_rate: local_codec.clock_rate,
            channels: local_codec.channels,
            local_payload_type,
            local_rtx_payload_type: None,
            remote_payload_type,
            remote_rtx_payload_type: None,
            rtcp_feedback: reduce_rtcp_feedback(&local_codec.rtcp_feedback, &remote_codec.rtcp_feedback),
            local_parameters: local_codec.parameters,
            remote_parameters: remote_codec.parameters,
        });
    }

    for codec in &mut extended.codecs {
        let local_rtx = find_rtx_for(&local.codecs, codec.local_payload_type);
        let remote_rtx = find_rtx_for(&remote.codecs, codec.remote_payload_type);
        if let (Some(local_rtx), Some(remote_rtx)) = (local_rtx, remote_rtx) {
            codec.local_rtx_payload_type = Some(local_rtx);
            codec.remote_rtx_payload_type = Some(remote_rtx);
        }
    }

    for remote_ext in &remote.header_extensions {
        let Some(local_ext) = local
            .header_extensions
            .iter()
            .find(|local_ext| match_header_extension(local_ext, remote_ext))
        else {
            continue;
        };
        extended.header_extensions.push(ExtendedRtpHeaderExtension {
            kind: remote_ext.kind,
            uri: remote_ext.uri.clone(),
            send_id: local_ext.preferred_id,
            recv_id: remote_ext.preferred_id,
            encrypt: local_ext.preferred_encrypt,
            direction: remote_ext.direction().inverted(),
        });
    }

    extended
}

/// Payload type of the RTX codec whose `apt` points at `payload_type`.
fn find_rtx_for(codecs: &[RtpCodecCapability], payload_type: u8) -> Option<u8> {
    codecs
        .iter()
        .find(|c| c.is_rtx() && c.parameters.get_u32("apt") == Some(u32::from(payload_type)))
        .and_then(|c| c.preferred_payload_type)
}

fn rtx_mime_type(kind: MediaKind) -> String {
    format!("{kind}/rtx")
}

fn apt_parameters(payload_type: u8) -> CodecParameters {
    CodecParameters::new().with("apt", u32::from(payload_type))
}

/// Capabilities to announce to the server for receiving media.
pub fn get_recv_rtp_capabilities(extended: &ExtendedRtpCapabilities) -> RtpCapabilities {
    let mut caps = RtpCapabilities::default();

    for codec in &extended.codecs {
        caps.codecs.push(RtpCodecCapability {
            kind: Some(codec.kind),
            mime_type: codec.mime_type.clone(),
            preferred_payload_type: Some(codec.remote_payload_type),
            clock_rate: codec.clock_rate,
            channels: codec.channels,
            parameters: codec.local_parameters.clone(),
            rtcp_feedback: codec.rtcp_feedback.clone(),
        });

        match codec.remote_rtx_payload_type {
            Some(rtx_payload_type) => caps.codecs.push(RtpCodecCapability {
                kind: Some(codec.kind),
                mime_type: rtx_mime_type(codec.kind),
                preferred_payload_type: Some(rtx_payload_type),
                clock_rate: codec.clock_rate,
                channels: None,
                parameters: apt_parameters(codec.remote_payload_type),
                rtcp_feedback: vec![],
            }),
            None if codec.kind == MediaKind::Video => {
                debug!(mime_type = %codec.mime_type, "video codec without rtx");
            }
            None => {}
        }
    }

    caps.header_extensions = extended
        .header_extensions
        .iter()
        .filter(|ext| ext.direction.is_receiving())
        .map(|ext| RtpHeaderExtension {
            kind: ext.kind,
            uri: ext.uri.clone(),
            preferred_id: ext.recv_id,
            preferred_encrypt: ext.encrypt,
            direction: Some(ext.direction),
        })
        .collect();

    caps
}

/// Parameters the local stack sends with: local payload types and parameters.
pub fn get_sending_rtp_parameters(kind: MediaKind, extended: &ExtendedRtpCapabilities) -> RtpParameters {
    sending_parameters(kind, extended, |codec| &codec.local_parameters)
}

/// Parameters describing what the remote will receive, for the SDP answer
/// and the server.
///
/// Uses the remote parameter sets and keeps exactly one congestion control
/// feedback scheme: `transport-cc` when the transport-wide-cc extension is
/// negotiated, else `goog-remb` when abs-send-time is, else neither.
pub fn get_sending_remote_rtp_parameters(
    kind: MediaKind,
    extended: &ExtendedRtpCapabilities,
) -> RtpParameters {
    let mut params = sending_parameters(kind, extended, |codec| &codec.remote_parameters);

    let has_ext = |uri: &str| params.header_extensions.iter().any(|ext| ext.uri == uri);
    let keep: fn(&RtcpFeedback) -> bool = if has_ext(uris::TRANSPORT_WIDE_CC) {
        |fb| fb.feedback_type != "goog-remb"
    } else if has_ext(uris::ABS_SEND_TIME) {
        |fb| fb.feedback_type != "transport-cc"
    } else {
        |fb| fb.feedback_type != "transport-cc" && fb.feedback_type != "goog-remb"
    };

    for codec in &mut params.codecs {
        codec.rtcp_feedback.retain(keep);
    }
    params
}

fn sending_parameters(
    kind: MediaKind,
    extended: &ExtendedRtpCapabilities,
    parameters_of: impl Fn(&ExtendedRtpCodec) -> &CodecParameters,
) -> RtpParameters {
    let mut params = RtpParameters::default();

    for codec in extended.codecs.iter().filter(|c| c.kind == kind) {
        params.codecs.push(RtpCodecParameters {
            mime_type: codec.mime_type.clone(),
            payload_type: codec.local_payload_type,
            clock_rate: codec.clock_rate,
            channels: codec.channels,
            parameters: parameters_of(codec).clone(),
            rtcp_feedback: codec.rtcp_feedback.clone(),
        });

        if let Some(rtx_payload_type) = codec.local_rtx_payload_type {
            params.codecs.push(RtpCodecParameters {
                mime_type: rtx_mime_type(kind),
                payload_type: rtx_payload_type,
                clock_rate: codec.clock_rate,
                channels: None,
                parameters: apt_parameters(codec.local_payload_type),
                rtcp_feedback: vec![],
            });
        }
    }

    params.header_extensions = extended
        .header_extensions
        .iter()
        .filter(|ext| ext.kind == kind && ext.direction.is_sending())
        .map(|ext| RtpHeaderExtensionParameters {
            uri: ext.uri.clone(),
            id: ext.send_id,
            encrypt: ext.encrypt,
            parameters: CodecParameters::new(),
        })
        .collect();

    params
}

/// Narrow a codec list to a single codec plus its RTX entry.
///
/// Without `cap_codec` the first codec is kept. Otherwise the first
/// non-strict match of `cap_codec` is kept, and having none is an error.
pub fn reduce_codecs(
    codecs: &[RtpCodecParameters],
    cap_codec: Option<&RtpCodecCapability>,
) -> NegotiationResult<Vec<RtpCodecParameters>> {
    if codecs.is_empty() {
        return Err(NegotiationError::NoCodecs);
    }

    let idx = match cap_codec {
        None => 0,
        Some(cap_codec) => codecs
            .iter()
            .position(|codec| !codec.is_rtx() && codecs_match(codec, cap_codec, false))
            .ok_or_else(|| NegotiationError::NoMatchingCodec {
                mime_type: cap_codec.mime_type.clone(),
            })?,
    };

    let mut reduced = vec![codecs[idx].clone()];
    if let Some(next) = codecs.get(idx + 1) {
        if next.is_rtx() {
            reduced.push(next.clone());
        }
    }
    Ok(reduced)
}

/// Advertise plain `nack` for opus codecs that lack it.
pub fn add_nack_support_for_opus(caps: &mut RtpCapabilities) {
    for codec in &mut caps.codecs {
        if !CodecFamily::from_mime_type(&codec.mime_type).is_opus() {
            continue;
        }
        if !codec.rtcp_feedback.iter().any(RtcpFeedback::is_generic_nack) {
            codec.rtcp_feedback.push(RtcpFeedback::new("nack"));
        }
    }
}

/// Whether media of `kind` can be sent with the negotiated capabilities.
pub fn can_send(kind: MediaKind, extended: &ExtendedRtpCapabilities) -> bool {
    extended.codecs.iter().any(|codec| codec.kind == kind)
}

/// Whether a consumer with these parameters can be received.
///
/// The first codec must be one the router offered for receiving.
pub fn can_receive(rtp_parameters: &RtpParameters, extended: &ExtendedRtpCapabilities) -> ValidationResult<bool> {
    let mut params = rtp_parameters.clone();
    validate_rtp_parameters(&mut params)?;

    let Some(first) = params.codecs.first() else {
        return Ok(false);
    };
    Ok(extended
        .codecs
        .iter()
        .any(|codec| codec.remote_payload_type == first.payload_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtp_parameters::RtpHeaderExtensionDirection;

    fn cap(mime_type: &str, payload_type: u8, clock_rate: u32) -> RtpCodecCapability {
        RtpCodecCapability {
            kind: MediaKind::from_mime_type(mime_type),
            mime_type: mime_type.into(),
            preferred_payload_type: Some(payload_type),
            clock_rate,
            channels: if mime_type.starts_with("audio/") { Some(2) } else { None },
            parameters: CodecParameters::new(),
            rtcp_feedback: vec![],
        }
    }

    fn rtx(payload_type: u8, apt: u8) -> RtpCodecCapability {
        RtpCodecCapability {
            channels: None,
            parameters: apt_parameters(apt),
            ..cap("video/rtx", payload_type, 90000)
        }
    }

    fn ext(kind: MediaKind, uri: &str, id: u16, direction: RtpHeaderExtensionDirection) -> RtpHeaderExtension {
        RtpHeaderExtension {
            kind,
            uri: uri.into(),
            preferred_id: id,
            preferred_encrypt: false,
            direction: Some(direction),
        }
    }

    #[test]
    fn test_vp8_without_local_rtx_is_not_paired() {
        let local = RtpCapabilities {
            codecs: vec![cap("video/VP8", 96, 90000)],
            header_extensions: vec![],
        };
        let remote = RtpCapabilities {
            codecs: vec![cap("video/VP8", 101, 90000), rtx(102, 101)],
            header_extensions: vec![],
        };

        let extended = get_extended_rtp_capabilities(&local, &remote);
        assert_eq!(extended.codecs.len(), 1);
        let codec = &extended.codecs[0];
        assert_eq!(codec.local_payload_type, 96);
        assert_eq!(codec.remote_payload_type, 101);
        assert_eq!(codec.local_rtx_payload_type, None);
        assert_eq!(codec.remote_rtx_payload_type, None);
    }

    #[test]
    fn test_rtx_at_index_zero_is_paired() {
        // The local RTX entry is the very first codec in the list.
        let local = RtpCapabilities {
            codecs: vec![rtx(97, 96), cap("video/VP8", 96, 90000)],
            header_extensions: vec![],
        };
        let remote = RtpCapabilities {
            codecs: vec![rtx(102, 101), cap("video/VP8", 101, 90000)],
            header_extensions: vec![],
        };

        let extended = get_extended_rtp_capabilities(&local, &remote);
        assert_eq!(extended.codecs[0].local_rtx_payload_type, Some(97));
        assert_eq!(extended.codecs[0].remote_rtx_payload_type, Some(102));
    }

    #[test]
    fn test_duplicate_local_codecs_are_consumed_once() {
        let mut high = cap("video/H264", 102, 90000);
        high.parameters = CodecParameters::new()
            .with("packetization-mode", 1u32)
            .with("profile-level-id", "42e01f");
        let mut second = high.clone();
        second.preferred_payload_type = Some(104);

        let local = RtpCapabilities {
            codecs: vec![high.clone(), second],
            header_extensions: vec![],
        };
        let mut remote_a = high.clone();
        remote_a.preferred_payload_type = Some(110);
        let mut remote_b = high;
        remote_b.preferred_payload_type = Some(111);
        let remote = RtpCapabilities {
            codecs: vec![remote_a, remote_b],
            header_extensions: vec![],
        };

        let extended = get_extended_rtp_capabilities(&local, &remote);
        let pairs: Vec<_> = extended
            .codecs
            .iter()
            .map(|c| (c.local_payload_type, c.remote_payload_type))
            .collect();
        assert_eq!(pairs, vec![(102, 110), (104, 111)]);
    }

    #[test]
    fn test_header_extension_ids_and_direction() {
        let local = RtpCapabilities {
            codecs: vec![],
            header_extensions: vec![
                ext(MediaKind::Video, "urn:3gpp:video-orientation", 13, RtpHeaderExtensionDirection::Sendrecv),
                ext(MediaKind::Video, uris::TRANSPORT_WIDE_CC, 3, RtpHeaderExtensionDirection::Sendrecv),
            ],
        };
        let remote = RtpCapabilities {
            codecs: vec![],
            header_extensions: vec![
                ext(MediaKind::Video, uris::TRANSPORT_WIDE_CC, 5, RtpHeaderExtensionDirection::Sendrecv),
                ext(MediaKind::Video, "urn:3gpp:video-orientation", 11, RtpHeaderExtensionDirection::Sendonly),
                ext(MediaKind::Audio, "urn:3gpp:video-orientation", 11, RtpHeaderExtensionDirection::Sendonly),
            ],
        };

        let extended = get_extended_rtp_capabilities(&local, &remote);
        assert_eq!(extended.header_extensions.len(), 2);
        assert_eq!(extended.header_extensions[0].uri, uris::TRANSPORT_WIDE_CC);
        assert_eq!(extended.header_extensions[0].send_id, 3);
        assert_eq!(extended.header_extensions[0].recv_id, 5);
        assert_eq!(extended.header_extensions[1].direction, RtpHeaderExtensionDirection::Recvonly);
    }

    fn extended_with_feedback(ext_uris: &[&str]) -> ExtendedRtpCapabilities {
        ExtendedRtpCapabilities {
            codecs: vec![ExtendedRtpCodec {
                kind: MediaKind::Video,
                mime_type: "video/VP8".into(),
                clock_rate: 90000,
                channels: None,
                local_payload_type: 96,
                local_rtx_payload_type: Some(97),
                remote_payload_type: 101,
                remote_rtx_payload_type: Some(102),
                local_parameters: CodecParameters::new().with("x-local", 1u32),
                remote_parameters: CodecParameters::new().with("x-remote", 1u32),
                rtcp_feedback: vec![
                    RtcpFeedback::new("goog-remb"),
                    RtcpFeedback::new("transport-cc"),
                    RtcpFeedback::new("nack"),
                ],
            }],
            header_extensions: ext_uris
                .iter()
                .enumerate()
                .map(|(i, uri)| ExtendedRtpHeaderExtension {
                    kind: MediaKind::Video,
                    uri: uri.to_string(),
                    send_id: i as u16 + 1,
                    recv_id: i as u16 + 10,
                    encrypt: false,
                    direction: RtpHeaderExtensionDirection::Sendrecv,
                })
                .collect(),
        }
    }

    fn feedback_types(params: &RtpParameters) -> Vec<String> {
        params.codecs[0]
            .rtcp_feedback
            .iter()
            .map(|fb| fb.feedback_type.clone())
            .collect()
    }

    #[test]
    fn test_sending_parameters_use_local_side() {
        let extended = extended_with_feedback(&[uris::TRANSPORT_WIDE_CC]);
        let params = get_sending_rtp_parameters(MediaKind::Video, &extended);
        assert_eq!(params.codecs.len(), 2);
        assert_eq!(params.codecs[0].payload_type, 96);
        assert!(params.codecs[0].parameters.contains_key("x-local"));
        assert_eq!(params.codecs[1].mime_type, "video/rtx");
        assert_eq!(params.codecs[1].payload_type, 97);
        assert_eq!(params.codecs[1].parameters.get_u32("apt"), Some(96));
        assert_eq!(params.header_extensions[0].id, 1);
        assert_eq!(feedback_types(&params), vec!["goog-remb", "transport-cc", "nack"]);

        assert!(get_sending_rtp_parameters(MediaKind::Audio, &extended).codecs.is_empty());
    }

    #[test]
    fn test_remote_parameters_keep_transport_cc_only() {
        let extended = extended_with_feedback(&[uris::TRANSPORT_WIDE_CC, uris::ABS_SEND_TIME]);
        let params = get_sending_remote_rtp_parameters(MediaKind::Video, &extended);
        assert_eq!(params.codecs[0].payload_type, 96);
        assert!(params.codecs[0].parameters.contains_key("x-remote"));
        assert_eq!(feedback_types(&params), vec!["transport-cc", "nack"]);
    }

    #[test]
    fn test_remote_parameters_keep_remb_with_abs_send_time() {
        let extended = extended_with_feedback(&[uris::ABS_SEND_TIME]);
        let params = get_sending_remote_rtp_parameters(MediaKind::Video, &extended);
        assert_eq!(feedback_types(&params), vec!["goog-remb", "nack"]);
    }

    #[test]
    fn test_remote_parameters_strip_both_without_extensions() {
        let extended = extended_with_feedback(&[]);
        let params = get_sending_remote_rtp_parameters(MediaKind::Video, &extended);
        assert_eq!(feedback_types(&params), vec!["nack"]);
    }

    #[test]
    fn test_recvonly_extension_not_sent() {
        let mut extended = extended_with_feedback(&["urn:3gpp:video-orientation"]);
        extended.header_extensions[0].direction = RtpHeaderExtensionDirection::Recvonly;
        assert!(get_sending_rtp_parameters(MediaKind::Video, &extended)
            .header_extensions
            .is_empty());

        let recv = get_recv_rtp_capabilities(&extended);
        assert_eq!(recv.header_extensions.len(), 1);
        assert_eq!(recv.header_extensions[0].preferred_id, 10);
    }

    #[test]
    fn test_recv_capabilities_use_remote_payload_types() {
        let extended = extended_with_feedback(&[]);
        let caps = get_recv_rtp_capabilities(&extended);
        assert_eq!(caps.codecs.len(), 2);
        assert_eq!(caps.codecs[0].preferred_payload_type, Some(101));
        assert!(caps.codecs[0].parameters.contains_key("x-local"));
        assert_eq!(caps.codecs[1].preferred_payload_type, Some(102));
        assert_eq!(caps.codecs[1].parameters.get_u32("apt"), Some(101));
    }

    fn params_of(caps: &[RtpCodecCapability]) -> Vec<RtpCodecParameters> {
        caps.iter()
            .map(|c| RtpCodecParameters {
                mime_type: c.mime_type.clone(),
                payload_type: c.preferred_payload_type.unwrap_or_default(),
                clock_rate: c.clock_rate,
                channels: c.channels,
                parameters: c.parameters.clone(),
                rtcp_feedback: vec![],
            })
            .collect()
    }

    #[test]
    fn test_reduce_codecs() {
        let codecs = params_of(&[
            cap("video/VP8", 96, 90000),
            rtx(97, 96),
            cap("video/H264", 102, 90000),
            rtx(103, 102),
            cap("video/VP9", 98, 90000),
        ]);

        let first = reduce_codecs(&codecs, None).unwrap();
        assert_eq!(first.iter().map(|c| c.payload_type).collect::<Vec<_>>(), vec![96, 97]);

        let h264 = reduce_codecs(&codecs, Some(&cap("video/h264", 0, 90000))).unwrap();
        assert_eq!(h264.iter().map(|c| c.payload_type).collect::<Vec<_>>(), vec![102, 103]);

        let vp9 = reduce_codecs(&codecs, Some(&cap("video/VP9", 0, 90000))).unwrap();
        assert_eq!(vp9.iter().map(|c| c.payload_type).collect::<Vec<_>>(), vec![98]);

        assert_eq!(
            reduce_codecs(&codecs, Some(&cap("video/AV1", 0, 90000))).unwrap_err(),
            NegotiationError::NoMatchingCodec { mime_type: "video/AV1".into() }
        );
        assert_eq!(reduce_codecs(&[], None).unwrap_err(), NegotiationError::NoCodecs);
    }

    #[test]
    fn test_add_nack_support_for_opus_is_idempotent() {
        let mut caps = RtpCapabilities {
            codecs: vec![cap("audio/opus", 111, 48000), cap("video/VP8", 96, 90000)],
            header_extensions: vec![],
        };
        add_nack_support_for_opus(&mut caps);
        let once = caps.clone();
        add_nack_support_for_opus(&mut caps);

        assert_eq!(caps, once);
        assert_eq!(caps.codecs[0].rtcp_feedback, vec![RtcpFeedback::new("nack")]);
        assert!(caps.codecs[1].rtcp_feedback.is_empty());
    }

    #[test]
    fn test_can_send_and_receive() {
        let extended = extended_with_feedback(&[]);
        assert!(can_send(MediaKind::Video, &extended));
        assert!(!can_send(MediaKind::Audio, &extended));

        let mut params = RtpParameters {
            codecs: params_of(&[cap("video/VP8", 101, 90000)]),
            ..Default::default()
        };
        assert!(can_receive(&params, &extended).unwrap());
        params.codecs[0].payload_type = 96;
        assert!(!can_receive(&params, &extended).unwrap());
        params.codecs.clear();
        assert!(!can_receive(&params, &extended).unwrap());
    }
}
