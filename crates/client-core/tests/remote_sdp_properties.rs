//! Section bookkeeping of the remote description under arbitrary
//! receive/close/pause sequences.

use ortc_client_core::handler::remote_sdp::ReceiveSection;
use ortc_client_core::handler::RemoteSdp;
use ortc_core::{DtlsFingerprint, DtlsParameters, DtlsRole, IceParameters, RtpCodecParameters, RtpParameters};
use ortc_sdp_core::{parse, Direction};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Receive { video: bool },
    Close(usize),
    Pause(usize),
    Resume(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<bool>().prop_map(|video| Op::Receive { video }),
        2 => any::<usize>().prop_map(Op::Close),
        1 => any::<usize>().prop_map(Op::Pause),
        1 => any::<usize>().prop_map(Op::Resume),
    ]
}

fn remote_sdp() -> RemoteSdp {
    RemoteSdp::new(
        Some(IceParameters { username_fragment: "ufrag".into(), password: "pwd".into(), ice_lite: true }),
        vec![],
        Some(DtlsParameters {
            role: DtlsRole::Auto,
            fingerprints: vec![DtlsFingerprint { algorithm: "sha-256".into(), value: "AA:BB".into() }],
        }),
        None,
    )
}

fn parameters(video: bool) -> RtpParameters {
    let codec = if video {
        RtpCodecParameters { mime_type: "video/VP8".into(), payload_type: 101, clock_rate: 90000, ..Default::default() }
    } else {
        RtpCodecParameters {
            mime_type: "audio/opus".into(),
            payload_type: 100,
            clock_rate: 48000,
            channels: Some(2),
            ..Default::default()
        }
    };
    RtpParameters { codecs: vec![codec], ..Default::default() }
}

proptest! {
    #[test]
    fn prop_bundle_tracks_open_sections(ops in prop::collection::vec(op(), 1..40)) {
        let mut remote = remote_sdp();
        let mut open: Vec<String> = Vec::new();
        let mut next_mid = 0u32;
        let mut receives = 0usize;
        let mut version = 0u64;
        let mut first_mid: Option<String> = None;

        for op in ops {
            match op {
                Op::Receive { video } => {
                    let mid = next_mid.to_string();
                    next_mid += 1;
                    receives += 1;
                    let had_closed = remote.mids().len() > open.len();
                    let before = remote.mids().len();

                    let params = parameters(video);
                    remote
                        .receive(ReceiveSection {
                            mid: &mid,
                            kind: if video { "video" } else { "audio" },
                            offer_rtp_parameters: &params,
                            stream_id: None,
                            track_id: "track",
                        })
                        .unwrap();

                    let after = remote.mids().len();
                    if had_closed {
                        prop_assert_eq!(after, before);
                    } else {
                        prop_assert_eq!(after, before + 1);
                    }
                    first_mid.get_or_insert_with(|| mid.clone());
                    open.push(mid);
                }
                Op::Close(i) if !open.is_empty() => {
                    let mid = open[i % open.len()].clone();
                    let closed = remote.close_media_section(&mid).unwrap();
                    prop_assert_eq!(closed, first_mid.as_deref() != Some(mid.as_str()));
                    if closed {
                        open.retain(|m| m != &mid);
                    }
                }
                Op::Pause(i) if !open.is_empty() => {
                    let mid = open[i % open.len()].clone();
                    remote.pause_media_section(&mid).unwrap();
                }
                Op::Resume(i) if !open.is_empty() => {
                    let mid = open[i % open.len()].clone();
                    remote.resume_receiving_media_section(&mid).unwrap();
                }
                _ => {}
            }

            let sdp = parse(&remote.get_sdp()).unwrap();
            version += 1;
            prop_assert_eq!(sdp.origin.session_version, version);
            prop_assert!(sdp.media.len() <= receives);

            let mids: Vec<String> = sdp.media.iter().filter_map(|m| m.mid.clone()).collect();
            let unique: HashSet<&String> = mids.iter().collect();
            prop_assert_eq!(unique.len(), mids.len());

            let active: Vec<String> =
                sdp.media.iter().filter(|m| m.port != 0).filter_map(|m| m.mid.clone()).collect();
            prop_assert_eq!(&sdp.bundle_group().unwrap().mids, &active);

            if let Some(first) = &first_mid {
                let section = sdp.media.iter().find(|m| m.mid.as_deref() == Some(first.as_str()));
                prop_assert!(section.is_some_and(|m| m.port != 0));
            }

            for media in sdp.media.iter().filter(|m| m.port == 0) {
                prop_assert_eq!(media.direction, Some(Direction::Inactive));
                prop_assert!(media.ssrcs.is_empty());
            }
        }
    }
}
