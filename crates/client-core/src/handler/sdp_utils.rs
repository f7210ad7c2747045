//! Readers over the local stack's SDP: native capabilities, DTLS
//! parameters and the stream identifiers of an offered track.

use crate::error::{ClientError, ClientResult};
use ortc_core::{
    CodecParameters, DtlsFingerprint, DtlsParameters, DtlsRole, MediaKind, RtcpFeedback, RtpCapabilities,
    RtpCodecCapability, RtpEncodingParameters, RtpEncodingRtx, RtpHeaderExtension, RtpParameters,
};
use ortc_sdp_core::{parse_params, write_params, Fmtp, MediaDescription, SessionDescription};
use std::collections::HashMap;
use tracing::trace;

/// Native RTP capabilities advertised in a local offer.
///
/// Only the first audio and the first video section are read. Codecs keep
/// the order they first appear in.
pub fn extract_rtp_capabilities(sdp: &SessionDescription) -> RtpCapabilities {
    let mut caps = RtpCapabilities::default();
    let mut got_audio = false;
    let mut got_video = false;

    for media in &sdp.media {
        let kind = match media.media_type.as_str() {
            "audio" if !got_audio => {
                got_audio = true;
                MediaKind::Audio
            }
            "video" if !got_video => {
                got_video = true;
                MediaKind::Video
            }
            _ => continue,
        };

        let first = caps.codecs.len();
        let mut by_payload: HashMap<u8, usize> = HashMap::new();

        for rtp in &media.rtp {
            if by_payload.contains_key(&rtp.payload) {
                continue;
            }
            by_payload.insert(rtp.payload, caps.codecs.len());
            caps.codecs.push(RtpCodecCapability {
                kind: Some(kind),
                mime_type: format!("{}/{}", media.media_type, rtp.codec),
                preferred_payload_type: Some(rtp.payload),
                clock_rate: rtp.rate,
                channels: match kind {
                    MediaKind::Audio => Some(rtp.encoding.unwrap_or(1)),
                    MediaKind::Video => None,
                },
                parameters: CodecParameters::new(),
                rtcp_feedback: Vec::new(),
            });
        }

        for fmtp in &media.fmtp {
            if let Some(&idx) = by_payload.get(&fmtp.payload) {
                let pairs = parse_params(&fmtp.config)
                    .into_iter()
                    .filter_map(|(name, value)| value.map(|v| (name, v)));
                caps.codecs[idx].parameters = CodecParameters::from_fmtp_pairs(pairs);
            }
        }

        for fb in &media.rtcp_fb {
            let feedback = RtcpFeedback { feedback_type: fb.fb_type.clone(), parameter: fb.subtype.clone() };
            if fb.payload == "*" {
                for codec in caps.codecs[first..].iter_mut().filter(|c| !c.is_rtx()) {
                    codec.rtcp_feedback.push(feedback.clone());
                }
            } else if let Some(&idx) = fb.payload.parse::<u8>().ok().and_then(|pt| by_payload.get(&pt)) {
                caps.codecs[idx].rtcp_feedback.push(feedback);
            }
        }

        for ext in media.ext.iter().filter(|ext| !ext.encrypt) {
            caps.header_extensions.push(RtpHeaderExtension {
                kind,
                uri: ext.uri.clone(),
                preferred_id: ext.id,
                preferred_encrypt: false,
                direction: None,
            });
        }
    }

    trace!(
        codecs = caps.codecs.len(),
        header_extensions = caps.header_extensions.len(),
        "extracted native rtp capabilities"
    );
    caps
}

/// Local DTLS parameters from the first active section carrying ICE credentials.
pub fn extract_dtls_parameters(sdp: &SessionDescription) -> ClientResult<DtlsParameters> {
    let media = sdp
        .media
        .iter()
        .find(|m| m.port != 0 && (m.ice_ufrag.is_some() || sdp.ice_ufrag.is_some()));

    let fingerprint = media
        .and_then(|m| m.fingerprint.as_ref())
        .or(sdp.fingerprint.as_ref())
        .ok_or_else(|| ClientError::transport("local_description", "no DTLS fingerprint in local description"))?;

    let setup = media.and_then(|m| m.setup.as_deref()).or(sdp.setup.as_deref());
    let role = match setup {
        Some("active") => DtlsRole::Client,
        Some("passive") => DtlsRole::Server,
        _ => DtlsRole::Auto,
    };

    Ok(DtlsParameters {
        role,
        fingerprints: vec![DtlsFingerprint {
            algorithm: fingerprint.hash_type.clone(),
            value: fingerprint.hash.clone(),
        }],
    })
}

/// The `cname` of the first SSRC that declares one.
pub fn get_cname(media: &MediaDescription) -> Option<String> {
    media
        .ssrcs
        .iter()
        .find(|ssrc| ssrc.attribute == "cname")
        .and_then(|ssrc| ssrc.value.clone())
}

/// Encodings of an offered send track.
///
/// With `a=rid` send lines each rid becomes one encoding. Otherwise every
/// primary SSRC becomes one encoding, with its retransmission SSRC paired
/// through `a=ssrc-group:FID`.
pub fn get_rtp_encodings(media: &MediaDescription) -> ClientResult<Vec<RtpEncodingParameters>> {
    let rids: Vec<_> = media.rids.iter().filter(|rid| rid.direction == "send").collect();
    if !rids.is_empty() {
        return Ok(rids
            .into_iter()
            .map(|rid| RtpEncodingParameters { rid: Some(rid.id.clone()), ..Default::default() })
            .collect());
    }

    let mut ssrcs: Vec<u32> = Vec::new();
    for line in &media.ssrcs {
        if !ssrcs.contains(&line.id) {
            ssrcs.push(line.id);
        }
    }
    if ssrcs.is_empty() {
        return Err(ClientError::transport(
            "local_description",
            format!("no a=ssrc lines found in media section {:?}", media.mid),
        ));
    }

    let mut pairs: Vec<(u32, Option<u32>)> = Vec::new();
    for group in media.ssrc_groups.iter().filter(|g| g.semantics == "FID") {
        if let [ssrc, rtx_ssrc, ..] = group.ssrcs[..] {
            if ssrcs.contains(&ssrc) {
                ssrcs.retain(|s| *s != ssrc && *s != rtx_ssrc);
                pairs.push((ssrc, Some(rtx_ssrc)));
            }
        }
    }
    pairs.extend(ssrcs.into_iter().map(|ssrc| (ssrc, None)));

    Ok(pairs
        .into_iter()
        .map(|(ssrc, rtx)| RtpEncodingParameters {
            ssrc: Some(ssrc),
            rtx: rtx.map(|ssrc| RtpEncodingRtx { ssrc }),
            ..Default::default()
        })
        .collect())
}

/// Carry opus `sprop-stereo` from the remote offer into the local answer as
/// `stereo`, so the local decoder outputs what the sender encodes.
pub fn apply_codec_parameters(offer_rtp_parameters: &RtpParameters, answer_media: &mut MediaDescription) {
    for codec in &offer_rtp_parameters.codecs {
        if !codec.mime_type.eq_ignore_ascii_case("audio/opus") {
            continue;
        }
        if answer_media.rtp_for(codec.payload_type).is_none() {
            continue;
        }
        let Some(sprop_stereo) = codec.parameters.get_u32("sprop-stereo") else {
            continue;
        };
        let stereo = if sprop_stereo != 0 { "1" } else { "0" };

        let idx = match answer_media.fmtp.iter().position(|f| f.payload == codec.payload_type) {
            Some(idx) => idx,
            None => {
                answer_media.fmtp.push(Fmtp { payload: codec.payload_type, config: String::new() });
                answer_media.fmtp.len() - 1
            }
        };

        let mut params = parse_params(&answer_media.fmtp[idx].config);
        match params.iter_mut().find(|(name, _)| name == "stereo") {
            Some((_, value)) => *value = Some(stereo.to_string()),
            None => params.push(("stereo".to_string(), Some(stereo.to_string()))),
        }
        answer_media.fmtp[idx].config =
            write_params(params.iter().map(|(name, value)| (name.as_str(), value.as_deref())));
    }
}
