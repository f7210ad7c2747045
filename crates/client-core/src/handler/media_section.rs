//! One `m=` section of the remote description.
//!
//! A section plays one of two roles. Sections created for local send tracks
//! answer the local offer ([`SectionRole::Answer`], `recvonly`). Sections
//! created for consumers offer the server's media ([`SectionRole::Offer`],
//! `sendonly`, always `setup:actpass`).

use crate::config::ProducerCodecOptions;
use crate::error::ClientResult;
use ortc_core::{
    rtp_parameters::codec_name, CodecFamily, CodecParameters, DtlsRole, IceCandidate, IceParameters,
    NegotiationError, RtcpFeedback, RtpParameters, SctpParameters,
};
use ortc_sdp_core::{
    Candidate, Connection, Direction, ExtMap, Fmtp, MediaDescription, Rid, RtcpFb, RtpMap, SsrcAttribute,
    SsrcGroup, Simulcast,
};
use tracing::warn;

const RTP_PROTOCOL: &str = "UDP/TLS/RTP/SAVPF";
const SCTP_PROTOCOL: &str = "UDP/DTLS/SCTP";
const DATA_CHANNEL_FORMAT: &str = "webrtc-datachannel";

/// Transport level data every section repeats.
#[derive(Debug, Clone, Default)]
pub struct TransportContext {
    pub ice_parameters: Option<IceParameters>,
    pub ice_candidates: Vec<IceCandidate>,
    pub dtls_role: Option<DtlsRole>,
    pub sctp_parameters: Option<SctpParameters>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRole {
    Answer,
    Offer,
}

/// Inputs for a section answering a local send offer.
pub struct AnswerSection<'a> {
    pub offer_media: &'a MediaDescription,
    /// Parameters the local stack sends with. Codec options that both sides
    /// must agree on are written back into these.
    pub offer_rtp_parameters: Option<&'a mut RtpParameters>,
    pub answer_rtp_parameters: Option<&'a RtpParameters>,
    pub codec_options: Option<&'a ProducerCodecOptions>,
    pub extmap_allow_mixed: bool,
}

/// Inputs for a section offering server media to the local stack.
pub struct OfferSection<'a> {
    pub mid: &'a str,
    /// `audio`, `video` or `application`.
    pub kind: &'a str,
    pub offer_rtp_parameters: Option<&'a RtpParameters>,
    pub stream_id: Option<&'a str>,
    pub track_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaSection {
    role: SectionRole,
    media: MediaDescription,
}

impl MediaSection {
    pub fn answer(context: &TransportContext, section: AnswerSection<'_>) -> Self {
        let offer = section.offer_media;
        let mut media = MediaDescription::new(offer.media_type.clone(), 7, offer.protocol.clone());
        media.mid = offer.mid.clone();
        media.connection = Some(Connection::ipv4("127.0.0.1"));

        match offer.media_type.as_str() {
            "audio" | "video" => {
                media.direction = Some(Direction::RecvOnly);
                if let Some(answer) = section.answer_rtp_parameters {
                    write_answer_codecs(&mut media, answer, section.offer_rtp_parameters, section.codec_options);

                    media.ext = answer
                        .header_extensions
                        .iter()
                        .filter(|ext| offer.ext.iter().any(|local| local.uri == ext.uri))
                        .map(|ext| extmap(ext.id, &ext.uri))
                        .collect();
                }

                media.extmap_allow_mixed = section.extmap_allow_mixed && offer.extmap_allow_mixed;

                if let Some(simulcast) = &offer.simulcast {
                    media.simulcast = Some(Simulcast {
                        dir1: "recv".to_string(),
                        list1: simulcast.list1.clone(),
                        dir2: None,
                        list2: None,
                    });
                    media.rids = offer
                        .rids
                        .iter()
                        .filter(|rid| rid.direction == "send")
                        .map(|rid| Rid { id: rid.id.clone(), direction: "recv".to_string(), params: None })
                        .collect();
                }

                media.rtcp_mux = true;
                media.rtcp_rsize = true;
            }
            "application" => {
                let sctp = context.sctp_parameters.unwrap_or_default();
                if offer.sctp_port.is_some() {
                    media.payloads = DATA_CHANNEL_FORMAT.to_string();
                    media.sctp_port = Some(sctp.port);
                    media.max_message_size = Some(sctp.max_message_size);
                } else if offer.sctpmap.is_some() {
                    media.payloads = sctp.port.to_string();
                    media.sctpmap = Some(ortc_sdp_core::SctpMap {
                        number: sctp.port,
                        app: DATA_CHANNEL_FORMAT.to_string(),
                        max_message_size: Some(sctp.max_message_size),
                    });
                }
            }
            other => {
                // Rejected, but kept so the answer lines up with the offer.
                warn!(media_type = other, "rejecting unsupported media section type");
                media.port = 0;
                media.payloads = offer.payloads.clone();
                media.direction = Some(Direction::Inactive);
            }
        }

        let mut section = Self { role: SectionRole::Answer, media };
        section.apply_transport(context);
        section
    }

    /// Fails for a kind the local stack cannot be offered.
    pub fn offer(context: &TransportContext, section: OfferSection<'_>) -> ClientResult<Self> {
        let protocol = if context.sctp_parameters.is_some() && section.kind == "application" {
            SCTP_PROTOCOL
        } else {
            RTP_PROTOCOL
        };
        let mut media = MediaDescription::new(section.kind, 7, protocol);
        media.mid = Some(section.mid.to_string());
        media.connection = Some(Connection::ipv4("127.0.0.1"));

        match section.kind {
            "audio" | "video" => {
                media.direction = Some(Direction::SendOnly);
                if let Some(track_id) = section.track_id {
                    media.msid = Some(format!("{} {}", section.stream_id.unwrap_or("-"), track_id));
                }

                if let Some(offer) = section.offer_rtp_parameters {
                    for codec in &offer.codecs {
                        media.rtp.push(rtpmap(codec.payload_type, &codec.mime_type, codec.clock_rate, codec.channels));
                        push_fmtp(&mut media, codec.payload_type, &codec.parameters);
                        push_rtcp_fb(&mut media, codec.payload_type, &codec.rtcp_feedback);
                    }
                    media.payloads = payload_list(offer.codecs.iter().map(|c| c.payload_type));
                    media.ext = offer.header_extensions.iter().map(|ext| extmap(ext.id, &ext.uri)).collect();

                    if let Some(encoding) = offer.encodings.first() {
                        let cname = offer.rtcp.cname.as_deref();
                        if let Some(ssrc) = encoding.ssrc {
                            push_cname(&mut media, ssrc, cname);
                            if let Some(rtx) = &encoding.rtx {
                                push_cname(&mut media, rtx.ssrc, cname);
                                media.ssrc_groups.push(SsrcGroup {
                                    semantics: "FID".to_string(),
                                    ssrcs: vec![ssrc, rtx.ssrc],
                                });
                            }
                        }
                    }
                }

                media.rtcp_mux = true;
                media.rtcp_rsize = true;
            }
            "application" => {
                let sctp = context.sctp_parameters.unwrap_or_default();
                media.payloads = DATA_CHANNEL_FORMAT.to_string();
                media.sctp_port = Some(sctp.port);
                media.max_message_size = Some(sctp.max_message_size);
            }
            other => return Err(NegotiationError::UnsupportedKind { kind: other.to_string() }.into()),
        }

        let mut section = Self { role: SectionRole::Offer, media };
        section.apply_transport(context);
        Ok(section)
    }

    pub fn role(&self) -> SectionRole {
        self.role
    }

    pub fn mid(&self) -> &str {
        self.media.mid.as_deref().unwrap_or_default()
    }

    /// A closed section has port 0 and may be recycled for a new track.
    pub fn closed(&self) -> bool {
        self.media.port == 0
    }

    pub fn media(&self) -> &MediaDescription {
        &self.media
    }

    pub fn set_ice_parameters(&mut self, ice: &IceParameters) {
        self.media.ice_ufrag = Some(ice.username_fragment.clone());
        self.media.ice_pwd = Some(ice.password.clone());
    }

    pub fn set_dtls_role(&mut self, role: DtlsRole) {
        let setup = match (self.role, role) {
            (SectionRole::Offer, _) | (SectionRole::Answer, DtlsRole::Auto) => "actpass",
            (SectionRole::Answer, DtlsRole::Client) => "active",
            (SectionRole::Answer, DtlsRole::Server) => "passive",
        };
        self.media.setup = Some(setup.to_string());
    }

    pub fn pause(&mut self) {
        self.media.direction = Some(Direction::Inactive);
    }

    /// Back to the role's natural direction.
    pub fn resume(&mut self) {
        self.media.direction = Some(match self.role {
            SectionRole::Answer => Direction::RecvOnly,
            SectionRole::Offer => Direction::SendOnly,
        });
    }

    /// Inactive with per-stream state removed, but still bundled.
    pub fn disable(&mut self) {
        self.pause();
        self.strip_streams();
    }

    /// Port 0: rejected, leaves the bundle and becomes reusable.
    pub fn close(&mut self) {
        self.disable();
        self.media.port = 0;
    }

    fn strip_streams(&mut self) {
        self.media.ext.clear();
        self.media.ssrcs.clear();
        self.media.ssrc_groups.clear();
        self.media.simulcast = None;
        self.media.rids.clear();
        self.media.extmap_allow_mixed = false;
    }

    fn apply_transport(&mut self, context: &TransportContext) {
        if let Some(ice) = &context.ice_parameters {
            self.set_ice_parameters(ice);
        }
        if !context.ice_candidates.is_empty() {
            self.media.candidates = context.ice_candidates.iter().map(candidate).collect();
            self.media.end_of_candidates = true;
            self.media.ice_options = Some("renomination".to_string());
        }
        if let Some(role) = context.dtls_role {
            self.set_dtls_role(role);
        }
    }
}

fn write_answer_codecs(
    media: &mut MediaDescription,
    answer: &RtpParameters,
    mut offer: Option<&mut RtpParameters>,
    codec_options: Option<&ProducerCodecOptions>,
) {
    let options = codec_options.copied().unwrap_or_default();

    for codec in &answer.codecs {
        media.rtp.push(rtpmap(codec.payload_type, &codec.mime_type, codec.clock_rate, codec.channels));

        let mut parameters = codec.parameters.clone();
        let mut feedback = codec.rtcp_feedback.clone();
        let mut offer_codec = offer
            .as_deref_mut()
            .and_then(|offer| offer.codecs.iter_mut().find(|c| c.payload_type == codec.payload_type));

        let family = CodecFamily::from_mime_type(&codec.mime_type);
        if family.is_opus() {
            let mut both = |key: &str, value: u32, offer_key: Option<&str>| {
                parameters.insert(key, value);
                if let (Some(offer_codec), Some(offer_key)) = (offer_codec.as_deref_mut(), offer_key) {
                    offer_codec.parameters.insert(offer_key, value);
                }
            };
            if let Some(stereo) = options.opus_stereo {
                both("stereo", u32::from(stereo), Some("sprop-stereo"));
            }
            if let Some(fec) = options.opus_fec {
                both("useinbandfec", u32::from(fec), Some("useinbandfec"));
            }
            if let Some(dtx) = options.opus_dtx {
                both("usedtx", u32::from(dtx), Some("usedtx"));
            }
            if let Some(rate) = options.opus_max_playback_rate {
                both("maxplaybackrate", rate, None);
            }
            if let Some(bitrate) = options.opus_max_average_bitrate {
                both("maxaveragebitrate", bitrate, None);
            }
            if let Some(ptime) = options.opus_ptime {
                both("ptime", ptime, Some("ptime"));
            }
            if options.opus_nack != Some(true) {
                feedback.retain(|fb| !fb.is_generic_nack());
                if let Some(offer_codec) = offer_codec.as_deref_mut() {
                    offer_codec.rtcp_feedback.retain(|fb| !fb.is_generic_nack());
                }
            }
        } else if family.accepts_google_bitrate_hints() {
            if let Some(bitrate) = options.video_google_start_bitrate {
                parameters.insert("x-google-start-bitrate", bitrate);
            }
            if let Some(bitrate) = options.video_google_max_bitrate {
                parameters.insert("x-google-max-bitrate", bitrate);
            }
            if let Some(bitrate) = options.video_google_min_bitrate {
                parameters.insert("x-google-min-bitrate", bitrate);
            }
        }

        push_fmtp(media, codec.payload_type, &parameters);
        push_rtcp_fb(media, codec.payload_type, &feedback);
    }

    media.payloads = payload_list(answer.codecs.iter().map(|c| c.payload_type));
}

fn rtpmap(payload: u8, mime_type: &str, rate: u32, channels: Option<u8>) -> RtpMap {
    RtpMap {
        payload,
        codec: codec_name(mime_type).to_string(),
        rate,
        encoding: channels.filter(|&c| c > 1),
    }
}

fn push_fmtp(media: &mut MediaDescription, payload: u8, parameters: &CodecParameters) {
    if !parameters.is_empty() {
        media.fmtp.push(Fmtp { payload, config: parameters.to_fmtp_config() });
    }
}

fn push_rtcp_fb(media: &mut MediaDescription, payload: u8, feedback: &[RtcpFeedback]) {
    media.rtcp_fb.extend(feedback.iter().map(|fb| RtcpFb {
        payload: payload.to_string(),
        fb_type: fb.feedback_type.clone(),
        subtype: fb.parameter.clone(),
    }));
}

fn push_cname(media: &mut MediaDescription, ssrc: u32, cname: Option<&str>) {
    if let Some(cname) = cname {
        media.ssrcs.push(SsrcAttribute {
            id: ssrc,
            attribute: "cname".to_string(),
            value: Some(cname.to_string()),
        });
    }
}

fn extmap(id: u16, uri: &str) -> ExtMap {
    ExtMap { id, direction: None, encrypt: false, uri: uri.to_string(), config: None }
}

fn payload_list(payloads: impl Iterator<Item = u8>) -> String {
    payloads.map(|pt| pt.to_string()).collect::<Vec<_>>().join(" ")
}

fn candidate(candidate: &IceCandidate) -> Candidate {
    Candidate {
        foundation: candidate.foundation.clone(),
        component: 1,
        transport: candidate.protocol.clone(),
        priority: u64::from(candidate.priority),
        ip: candidate.ip.clone(),
        port: candidate.port,
        candidate_type: candidate.candidate_type.clone(),
        raddr: None,
        rport: None,
        tcptype: candidate.tcp_type.clone(),
        generation: None,
        extensions: Vec::new(),
    }
}
