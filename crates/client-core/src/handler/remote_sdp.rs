//! The description this client fabricates on behalf of the server.
//!
//! The server never speaks SDP. Its transport parameters are turned into a
//! session with one `m=` section per local track, in the same order as the
//! local description. Closed sections are recycled for new tracks and the
//! first section is never closed, so the BUNDLE transport survives.

use super::media_section::{AnswerSection, MediaSection, OfferSection, TransportContext};
use crate::config::ProducerCodecOptions;
use crate::error::{ClientError, ClientResult};
use ortc_core::{DtlsParameters, DtlsRole, IceCandidate, IceParameters, RtpParameters, SctpParameters};
use ortc_sdp_core::{write, Fingerprint, Group, MediaDescription, MsidSemantic, Origin, SessionDescription};
use std::collections::HashMap;
use tracing::debug;

const ORIGIN_USERNAME: &str = "ortc-client";
const ORIGIN_SESSION_ID: u64 = 10000;

/// Options for answering a local send offer section.
pub struct SendSection<'a> {
    pub offer_media: &'a MediaDescription,
    /// Mid of a closed section to recycle.
    pub reuse_mid: Option<&'a str>,
    pub offer_rtp_parameters: &'a mut RtpParameters,
    pub answer_rtp_parameters: &'a RtpParameters,
    pub codec_options: Option<&'a ProducerCodecOptions>,
    pub extmap_allow_mixed: bool,
}

/// Options for offering a consumer's media to the local stack.
pub struct ReceiveSection<'a> {
    pub mid: &'a str,
    pub kind: &'a str,
    pub offer_rtp_parameters: &'a RtpParameters,
    pub stream_id: Option<&'a str>,
    pub track_id: &'a str,
}

#[derive(Debug)]
pub struct RemoteSdp {
    context: TransportContext,
    bundled: bool,
    sections: Vec<MediaSection>,
    mid_to_index: HashMap<String, usize>,
    first_mid: Option<String>,
    sdp: SessionDescription,
}

impl RemoteSdp {
    pub fn new(
        ice_parameters: Option<IceParameters>,
        ice_candidates: Vec<IceCandidate>,
        dtls_parameters: Option<DtlsParameters>,
        sctp_parameters: Option<SctpParameters>,
    ) -> Self {
        let mut sdp = SessionDescription {
            origin: Origin {
                username: ORIGIN_USERNAME.to_string(),
                session_id: ORIGIN_SESSION_ID,
                session_version: 0,
                net_type: "IN".to_string(),
                ip_ver: 4,
                address: "0.0.0.0".to_string(),
            },
            ..Default::default()
        };

        if ice_parameters.as_ref().is_some_and(|ice| ice.ice_lite) {
            sdp.ice_lite = true;
        }

        let bundled = dtls_parameters.is_some();
        if let Some(dtls) = &dtls_parameters {
            sdp.msid_semantic = Some(MsidSemantic { semantic: "WMS".to_string(), token: Some("*".to_string()) });
            // The server lists its strongest algorithm last.
            if let Some(fingerprint) = dtls.fingerprints.last() {
                sdp.fingerprint = Some(Fingerprint {
                    hash_type: fingerprint.algorithm.clone(),
                    hash: fingerprint.value.clone(),
                });
            }
            sdp.groups.push(Group { semantics: "BUNDLE".to_string(), mids: Vec::new() });
        }

        Self {
            context: TransportContext {
                ice_parameters,
                ice_candidates,
                dtls_role: dtls_parameters.map(|dtls| dtls.role),
                sctp_parameters,
            },
            bundled,
            sections: Vec::new(),
            mid_to_index: HashMap::new(),
            first_mid: None,
            sdp,
        }
    }

    pub fn update_ice_parameters(&mut self, ice_parameters: IceParameters) {
        debug!(ufrag = %ice_parameters.username_fragment, "updating remote ICE parameters");
        self.sdp.ice_lite = ice_parameters.ice_lite;
        for section in &mut self.sections {
            section.set_ice_parameters(&ice_parameters);
        }
        self.context.ice_parameters = Some(ice_parameters);
    }

    pub fn update_dtls_role(&mut self, role: DtlsRole) {
        debug!(?role, "updating remote DTLS role");
        self.context.dtls_role = Some(role);
        for section in &mut self.sections {
            section.set_dtls_role(role);
        }
    }

    /// Index the next section will take, and the mid it recycles if any.
    pub fn next_media_section_idx(&self) -> (usize, Option<String>) {
        match self.sections.iter().position(MediaSection::closed) {
            Some(idx) => (idx, Some(self.sections[idx].mid().to_string())),
            None => (self.sections.len(), None),
        }
    }

    pub fn send(&mut self, options: SendSection<'_>) -> ClientResult<()> {
        let section = MediaSection::answer(
            &self.context,
            AnswerSection {
                offer_media: options.offer_media,
                offer_rtp_parameters: Some(options.offer_rtp_parameters),
                answer_rtp_parameters: Some(options.answer_rtp_parameters),
                codec_options: options.codec_options,
                extmap_allow_mixed: options.extmap_allow_mixed,
            },
        );

        match options.reuse_mid {
            Some(reuse_mid) => self.replace_section(section, Some(reuse_mid)),
            None if !self.mid_to_index.contains_key(section.mid()) => {
                self.add_section(section);
                Ok(())
            }
            None => self.replace_section(section, None),
        }
    }

    pub fn receive(&mut self, options: ReceiveSection<'_>) -> ClientResult<()> {
        let section = MediaSection::offer(
            &self.context,
            OfferSection {
                mid: options.mid,
                kind: options.kind,
                offer_rtp_parameters: Some(options.offer_rtp_parameters),
                stream_id: options.stream_id,
                track_id: Some(options.track_id),
            },
        )?;

        if self.mid_to_index.contains_key(options.mid) {
            return self.replace_section(section, None);
        }
        match self.sections.iter().find(|s| s.closed()).map(|s| s.mid().to_string()) {
            Some(closed_mid) => self.replace_section(section, Some(&closed_mid)),
            None => {
                self.add_section(section);
                Ok(())
            }
        }
    }

    pub fn pause_media_section(&mut self, mid: &str) -> ClientResult<()> {
        self.section_mut(mid)?.pause();
        Ok(())
    }

    pub fn resume_sending_media_section(&mut self, mid: &str) -> ClientResult<()> {
        self.section_mut(mid)?.resume();
        Ok(())
    }

    pub fn resume_receiving_media_section(&mut self, mid: &str) -> ClientResult<()> {
        self.section_mut(mid)?.resume();
        Ok(())
    }

    pub fn disable_media_section(&mut self, mid: &str) -> ClientResult<()> {
        self.section_mut(mid)?.disable();
        Ok(())
    }

    /// Close the section for `mid`.
    ///
    /// Returns `false` when the section is the first one, which is only
    /// disabled since closing it would tear down the bundle transport.
    pub fn close_media_section(&mut self, mid: &str) -> ClientResult<bool> {
        if self.first_mid.as_deref() == Some(mid) {
            debug!(mid, "first media section is disabled instead of closed");
            self.disable_media_section(mid)?;
            return Ok(false);
        }
        self.section_mut(mid)?.close();
        self.regenerate_bundle_mids();
        Ok(true)
    }

    pub fn send_sctp_association(&mut self, offer_media: &MediaDescription) {
        let section = MediaSection::answer(
            &self.context,
            AnswerSection {
                offer_media,
                offer_rtp_parameters: None,
                answer_rtp_parameters: None,
                codec_options: None,
                extmap_allow_mixed: false,
            },
        );
        self.add_section(section);
    }

    pub fn receive_sctp_association(&mut self) -> ClientResult<()> {
        let section = MediaSection::offer(
            &self.context,
            OfferSection {
                mid: "datachannel",
                kind: "application",
                offer_rtp_parameters: None,
                stream_id: None,
                track_id: None,
            },
        )?;
        self.add_section(section);
        Ok(())
    }

    /// Render the session, bumping the origin version.
    pub fn get_sdp(&mut self) -> String {
        self.sdp.origin.session_version += 1;
        self.sdp.media = self.sections.iter().map(|s| s.media().clone()).collect();
        write(&self.sdp)
    }

    pub fn mids(&self) -> Vec<&str> {
        self.sections.iter().map(MediaSection::mid).collect()
    }

    pub fn section(&self, mid: &str) -> Option<&MediaSection> {
        self.mid_to_index.get(mid).map(|&idx| &self.sections[idx])
    }

    fn section_mut(&mut self, mid: &str) -> ClientResult<&mut MediaSection> {
        match self.mid_to_index.get(mid) {
            Some(&idx) => Ok(&mut self.sections[idx]),
            None => Err(ClientError::invalid_state("media_section", format!("no media section found with mid '{mid}'"))),
        }
    }

    fn add_section(&mut self, section: MediaSection) {
        let mid = section.mid().to_string();
        if self.first_mid.is_none() {
            self.first_mid = Some(mid.clone());
        }
        self.sections.push(section);
        self.mid_to_index.insert(mid, self.sections.len() - 1);
        self.regenerate_bundle_mids();
    }

    fn replace_section(&mut self, section: MediaSection, reuse_mid: Option<&str>) -> ClientResult<()> {
        match reuse_mid {
            Some(reuse_mid) => {
                let idx = self.mid_to_index.remove(reuse_mid).ok_or_else(|| {
                    ClientError::invalid_state("media_section", format!("no media section found for reuseMid '{reuse_mid}'"))
                })?;
                self.mid_to_index.insert(section.mid().to_string(), idx);
                self.sections[idx] = section;
                self.regenerate_bundle_mids();
            }
            None => {
                let idx = *self.mid_to_index.get(section.mid()).ok_or_else(|| {
                    ClientError::invalid_state(
                        "media_section",
                        format!("no media section found with mid '{}'", section.mid()),
                    )
                })?;
                self.sections[idx] = section;
            }
        }
        Ok(())
    }

    fn regenerate_bundle_mids(&mut self) {
        if !self.bundled {
            return;
        }
        let mids = self.sections.iter().filter(|s| !s.closed()).map(|s| s.mid().to_string()).collect();
        if let Some(group) = self.sdp.groups.first_mut() {
            group.mids = mids;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ortc_core::{CodecParameters, DtlsFingerprint, RtpCodecParameters};
    use ortc_sdp_core::{parse, Direction};

    fn remote_sdp() -> RemoteSdp {
        RemoteSdp::new(
            Some(IceParameters { username_fragment: "ufrag".into(), password: "pwd".into(), ice_lite: true }),
            vec![],
            Some(DtlsParameters {
                role: DtlsRole::Auto,
                fingerprints: vec![
                    DtlsFingerprint { algorithm: "sha-1".into(), value: "11:22".into() },
                    DtlsFingerprint { algorithm: "sha-256".into(), value: "AA:BB".into() },
                ],
            }),
            None,
        )
    }

    fn vp8() -> RtpParameters {
        RtpParameters {
            codecs: vec![RtpCodecParameters {
                mime_type: "video/VP8".into(),
                payload_type: 101,
                clock_rate: 90000,
                channels: None,
                parameters: CodecParameters::new(),
                rtcp_feedback: vec![],
            }],
            ..Default::default()
        }
    }

    fn offer_media(mid: &str) -> MediaDescription {
        let mut media = MediaDescription::new("video", 9, "UDP/TLS/RTP/SAVPF");
        media.mid = Some(mid.to_string());
        media
    }

    fn send(remote: &mut RemoteSdp, mid: &str, reuse_mid: Option<&str>) {
        let mut offer = vp8();
        let answer = vp8();
        remote
            .send(SendSection {
                offer_media: &offer_media(mid),
                reuse_mid,
                offer_rtp_parameters: &mut offer,
                answer_rtp_parameters: &answer,
                codec_options: None,
                extmap_allow_mixed: false,
            })
            .unwrap();
    }

    #[test]
    fn test_session_level_lines() {
        let mut remote = remote_sdp();
        let sdp = parse(&remote.get_sdp()).unwrap();

        assert_eq!(sdp.origin.username, "ortc-client");
        assert_eq!(sdp.origin.session_id, 10000);
        assert_eq!(sdp.origin.session_version, 1);
        assert!(sdp.ice_lite);
        assert_eq!(sdp.fingerprint.unwrap().hash_type, "sha-256");
        assert_eq!(sdp.msid_semantic.unwrap().token.as_deref(), Some("*"));

        let again = parse(&remote.get_sdp()).unwrap();
        assert_eq!(again.origin.session_version, 2);
    }

    #[test]
    fn test_sections_and_bundle() {
        let mut remote = remote_sdp();
        assert_eq!(remote.next_media_section_idx(), (0, None));

        send(&mut remote, "0", None);
        send(&mut remote, "1", None);
        assert_eq!(remote.mids(), vec!["0", "1"]);
        assert_eq!(remote.next_media_section_idx(), (2, None));

        let sdp = parse(&remote.get_sdp()).unwrap();
        assert_eq!(sdp.bundle_group().unwrap().mids, vec!["0", "1"]);
    }

    #[test]
    fn test_close_first_section_only_disables() {
        let mut remote = remote_sdp();
        send(&mut remote, "0", None);
        send(&mut remote, "1", None);

        assert!(!remote.close_media_section("0").unwrap());
        let first = remote.section("0").unwrap();
        assert!(!first.closed());
        assert_eq!(first.media().direction, Some(Direction::Inactive));

        assert!(remote.close_media_section("1").unwrap());
        assert!(remote.section("1").unwrap().closed());
        assert_eq!(remote.next_media_section_idx(), (1, Some("1".to_string())));

        let sdp = parse(&remote.get_sdp()).unwrap();
        assert_eq!(sdp.bundle_group().unwrap().mids, vec!["0"]);
        assert_eq!(sdp.media[1].port, 0);
    }

    #[test]
    fn test_closed_section_is_recycled() {
        let mut remote = remote_sdp();
        send(&mut remote, "0", None);
        send(&mut remote, "1", None);
        remote.close_media_section("1").unwrap();

        send(&mut remote, "2", Some("1"));
        assert_eq!(remote.mids(), vec!["0", "2"]);
        assert!(remote.section("1").is_none());
        assert!(!remote.section("2").unwrap().closed());
    }

    #[test]
    fn test_send_with_known_mid_replaces_in_place() {
        let mut remote = remote_sdp();
        send(&mut remote, "0", None);
        remote.pause_media_section("0").unwrap();
        assert_eq!(remote.section("0").unwrap().media().direction, Some(Direction::Inactive));

        send(&mut remote, "0", None);
        assert_eq!(remote.mids(), vec!["0"]);
        assert_eq!(remote.next_media_section_idx(), (1, None));
        assert_eq!(remote.section("0").unwrap().media().direction, Some(Direction::RecvOnly));

        let sdp = parse(&remote.get_sdp()).unwrap();
        assert_eq!(sdp.media.len(), 1);
        assert_eq!(sdp.bundle_group().unwrap().mids, vec!["0"]);
    }

    #[test]
    fn test_disabled_first_section_is_never_recycled() {
        let mut remote = remote_sdp();
        for mid in ["0", "1", "2"] {
            send(&mut remote, mid, None);
        }
        remote.close_media_section("0").unwrap();
        remote.close_media_section("1").unwrap();
        assert_eq!(remote.next_media_section_idx(), (1, Some("1".to_string())));

        send(&mut remote, "3", Some("1"));
        assert_eq!(remote.mids(), vec!["0", "3", "2"]);
        assert_eq!(remote.next_media_section_idx(), (3, None));

        remote.close_media_section("3").unwrap();
        assert_eq!(remote.next_media_section_idx(), (1, Some("3".to_string())));

        let first = remote.section("0").unwrap();
        assert!(!first.closed());
        assert_eq!(first.media().direction, Some(Direction::Inactive));
        assert!(first.media().ssrcs.is_empty());

        let sdp = parse(&remote.get_sdp()).unwrap();
        assert_ne!(sdp.media[0].port, 0);
        assert_eq!(sdp.bundle_group().unwrap().mids, vec!["0", "2"]);
    }

    #[test]
    fn test_unknown_mid_is_a_state_error() {
        let mut remote = remote_sdp();
        let err = remote.pause_media_section("7").unwrap_err();
        assert_eq!(err.category(), "state");

        let mut offer = vp8();
        let answer = vp8();
        let err = remote
            .send(SendSection {
                offer_media: &offer_media("0"),
                reuse_mid: Some("9"),
                offer_rtp_parameters: &mut offer,
                answer_rtp_parameters: &answer,
                codec_options: None,
                extmap_allow_mixed: false,
            })
            .unwrap_err();
        assert!(err.to_string().contains("reuseMid '9'"));
    }

    #[test]
    fn test_update_dtls_role_and_ice() {
        let mut remote = remote_sdp();
        send(&mut remote, "0", None);
        remote.update_dtls_role(DtlsRole::Server);
        assert_eq!(remote.section("0").unwrap().media().setup.as_deref(), Some("passive"));

        remote.update_ice_parameters(IceParameters {
            username_fragment: "new".into(),
            password: "newpwd".into(),
            ice_lite: true,
        });
        assert_eq!(remote.section("0").unwrap().media().ice_ufrag.as_deref(), Some("new"));
    }

    #[test]
    fn test_receive_recycles_closed_section() {
        let mut remote = remote_sdp();
        let params = vp8();
        for mid in ["0", "1"] {
            remote
                .receive(ReceiveSection {
                    mid,
                    kind: "video",
                    offer_rtp_parameters: &params,
                    stream_id: None,
                    track_id: "track",
                })
                .unwrap();
        }
        remote.close_media_section("1").unwrap();
        remote
            .receive(ReceiveSection { mid: "2", kind: "video", offer_rtp_parameters: &params, stream_id: None, track_id: "t2" })
            .unwrap();
        assert_eq!(remote.mids(), vec!["0", "2"]);
    }
}
