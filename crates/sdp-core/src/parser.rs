//! Line oriented SDP parser.
//!
//! Lines are split into `<type>=<value>`. Session level lines are applied to
//! the [`SessionDescription`] until the first `m=` line; from then on
//! attributes belong to the most recent media description. Attributes this
//! crate does not model are preserved in `other_attributes`.

use crate::attributes::{self, common::{not_space, u16_number, u32_number, u64_number, u8_number}};
use crate::error::{Result, SdpError};
use crate::session::{
    Attribute, Bandwidth, Connection, MediaDescription, Origin, SessionDescription, Timing,
};
use nom::{
    bytes::complete::{tag, take_till1},
    character::complete::{char, space1},
    combinator::{all_consuming, opt, rest},
    sequence::{preceded, tuple},
    IResult,
};
use tracing::trace;

/// Parse an SDP document. Accepts both CRLF and LF line endings.
pub fn parse(sdp: &str) -> Result<SessionDescription> {
    let mut session = SessionDescription::default();
    let mut seen_version = false;
    let mut seen_origin = false;

    for (index, raw) in sdp.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }

        let (kind, value) = split_line(line).ok_or_else(|| SdpError::ParseError {
            line: line_no,
            reason: format!("expected <type>=<value>, got {line:?}"),
        })?;
        let at_line = |e: SdpError| SdpError::ParseError { line: line_no, reason: e.to_string() };

        match kind {
            'v' => {
                session.version = value.trim().parse().map_err(|_| SdpError::ParseError {
                    line: line_no,
                    reason: format!("invalid version {value:?}"),
                })?;
                seen_version = true;
            }
            'o' => {
                session.origin = run_line(line_no, "origin", value, origin_parser)?;
                seen_origin = true;
            }
            's' => session.name = value.to_string(),
            't' => session.timing = run_line(line_no, "timing", value, timing_parser)?,
            'c' => {
                let connection = run_line(line_no, "connection", value, connection_parser)?;
                match session.media.last_mut() {
                    Some(media) => media.connection = Some(connection),
                    None => session.connection = Some(connection),
                }
            }
            'b' => {
                let bandwidth = run_line(line_no, "bandwidth", value, bandwidth_parser)?;
                match session.media.last_mut() {
                    Some(media) => media.bandwidths.push(bandwidth),
                    None => session.bandwidths.push(bandwidth),
                }
            }
            'm' => {
                let media = run_line(line_no, "media", value, media_parser)?;
                trace!(media_type = %media.media_type, port = media.port, "sdp media section");
                session.media.push(media);
            }
            'a' => {
                let (name, attr_value) = match value.split_once(':') {
                    Some((name, attr_value)) => (name, Some(attr_value)),
                    None => (value, None),
                };
                match session.media.last_mut() {
                    Some(media) => apply_media_attribute(media, name, attr_value).map_err(at_line)?,
                    None => apply_session_attribute(&mut session, name, attr_value).map_err(at_line)?,
                }
            }
            other => {
                if session.media.is_empty() {
                    session.other_lines.push((other, value.to_string()));
                } else {
                    trace!(line = line_no, kind = %other, "ignoring media level line");
                }
            }
        }
    }

    if !seen_version {
        return Err(SdpError::MissingLine('v'));
    }
    if !seen_origin {
        return Err(SdpError::MissingLine('o'));
    }

    Ok(session)
}

fn split_line(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let kind = chars.next()?;
    if !kind.is_ascii_alphabetic() || chars.next()? != '=' {
        return None;
    }
    Some((kind, &line[2..]))
}

fn run_line<'a, T, F>(line: usize, what: &str, value: &'a str, parser: F) -> Result<T>
where
    F: FnMut(&'a str) -> IResult<&'a str, T>,
{
    all_consuming(parser)(value.trim())
        .map(|(_, parsed)| parsed)
        .map_err(|_| SdpError::ParseError {
            line,
            reason: format!("invalid {what} line {value:?}"),
        })
}

fn ip_version(input: &str) -> IResult<&str, u8> {
    preceded(tag("IP"), u8_number)(input)
}

fn origin_parser(input: &str) -> IResult<&str, Origin> {
    let (input, (username, _, session_id, _, session_version, _, net_type, _, ip_ver, _, address)) =
        tuple((
            not_space, space1, u64_number, space1, u64_number, space1, not_space, space1, ip_version,
            space1, not_space,
        ))(input)?;
    Ok((
        input,
        Origin {
            username: username.to_string(),
            session_id,
            session_version,
            net_type: net_type.to_string(),
            ip_ver,
            address: address.to_string(),
        },
    ))
}

fn timing_parser(input: &str) -> IResult<&str, Timing> {
    let (input, (start, _, stop)) = tuple((u64_number, space1, u64_number))(input)?;
    Ok((input, Timing { start, stop }))
}

fn connection_parser(input: &str) -> IResult<&str, Connection> {
    let (input, (_, _, ip_ver, _, ip)) = tuple((tag("IN"), space1, ip_version, space1, not_space))(input)?;
    Ok((input, Connection { ip_ver, ip: ip.to_string() }))
}

fn bandwidth_parser(input: &str) -> IResult<&str, Bandwidth> {
    let (input, (bw_type, _, limit)) =
        tuple((take_till1(|c: char| c == ':'), char(':'), u64_number))(input)?;
    Ok((input, Bandwidth { bw_type: bw_type.to_string(), limit }))
}

fn media_parser(input: &str) -> IResult<&str, MediaDescription> {
    let (input, (media_type, _, port, num_ports, _, protocol)) = tuple((
        not_space,
        space1,
        u16_number,
        opt(preceded(char('/'), u16_number)),
        space1,
        not_space,
    ))(input)?;
    let (input, payloads) = opt(preceded(space1, rest))(input)?;

    let mut media = MediaDescription::new(media_type, port, protocol);
    media.num_ports = num_ports;
    media.payloads = payloads.map(str::trim).unwrap_or_default().to_string();
    Ok((input, media))
}

fn other_attribute(name: &str, value: Option<&str>) -> Attribute {
    Attribute { name: name.to_string(), value: value.map(str::to_string) }
}

fn apply_session_attribute(
    session: &mut SessionDescription,
    name: &str,
    value: Option<&str>,
) -> Result<()> {
    match (name, value) {
        ("ice-lite", _) => session.ice_lite = true,
        ("ice-ufrag", Some(v)) => session.ice_ufrag = Some(v.trim().to_string()),
        ("ice-pwd", Some(v)) => session.ice_pwd = Some(v.trim().to_string()),
        ("ice-options", Some(v)) => session.ice_options = Some(v.trim().to_string()),
        ("fingerprint", Some(v)) => session.fingerprint = Some(attributes::parse_fingerprint(v)?),
        ("setup", Some(v)) => session.setup = Some(attributes::parse_setup(v)?),
        ("group", Some(v)) => session.groups.push(attributes::parse_group(v)?),
        ("msid-semantic", Some(v)) => session.msid_semantic = Some(attributes::parse_msid_semantic(v)?),
        ("extmap-allow-mixed", _) => session.extmap_allow_mixed = true,
        _ => session.other_attributes.push(other_attribute(name, value)),
    }
    Ok(())
}

fn apply_media_attribute(media: &mut MediaDescription, name: &str, value: Option<&str>) -> Result<()> {
    match (name, value) {
        ("rtpmap", Some(v)) => media.rtp.push(attributes::parse_rtpmap(v)?),
        ("fmtp", Some(v)) => media.fmtp.push(attributes::parse_fmtp(v)?),
        ("rtcp-fb", Some(v)) => media.rtcp_fb.push(attributes::parse_rtcp_fb(v)?),
        ("extmap", Some(v)) => media.ext.push(attributes::parse_extmap(v)?),
        ("rtcp", Some(v)) => media.rtcp = Some(attributes::parse_rtcp(v)?),
        ("setup", Some(v)) => media.setup = Some(attributes::parse_setup(v)?),
        ("mid", Some(v)) => media.mid = Some(v.trim().to_string()),
        ("msid", Some(v)) => media.msid = Some(v.trim().to_string()),
        ("ptime", Some(v)) => media.ptime = Some(parse_number("ptime", v)?),
        ("maxptime", Some(v)) => media.maxptime = Some(parse_number("maxptime", v)?),
        ("sendrecv" | "sendonly" | "recvonly" | "inactive", None) => media.direction = name.parse().ok(),
        ("ice-ufrag", Some(v)) => media.ice_ufrag = Some(v.trim().to_string()),
        ("ice-pwd", Some(v)) => media.ice_pwd = Some(v.trim().to_string()),
        ("ice-options", Some(v)) => media.ice_options = Some(v.trim().to_string()),
        ("fingerprint", Some(v)) => media.fingerprint = Some(attributes::parse_fingerprint(v)?),
        ("candidate", Some(v)) => media.candidates.push(attributes::parse_candidate(v)?),
        ("end-of-candidates", _) => media.end_of_candidates = true,
        ("ssrc", Some(v)) => media.ssrcs.push(attributes::parse_ssrc(v)?),
        ("ssrc-group", Some(v)) => media.ssrc_groups.push(attributes::parse_ssrc_group(v)?),
        ("rtcp-mux", _) => media.rtcp_mux = true,
        ("rtcp-rsize", _) => media.rtcp_rsize = true,
        ("sctpmap", Some(v)) => media.sctpmap = Some(attributes::parse_sctpmap(v)?),
        ("sctp-port", Some(v)) => media.sctp_port = Some(attributes::parse_sctp_port(v)?),
        ("max-message-size", Some(v)) => media.max_message_size = Some(attributes::parse_max_message_size(v)?),
        ("rid", Some(v)) => media.rids.push(attributes::parse_rid(v)?),
        ("simulcast", Some(v)) => media.simulcast = Some(attributes::parse_simulcast(v)?),
        ("extmap-allow-mixed", _) => media.extmap_allow_mixed = true,
        _ => media.other_attributes.push(other_attribute(name, value)),
    }
    Ok(())
}

fn parse_number(name: &str, value: &str) -> Result<u32> {
    attributes::common::parse_value(name, value, u32_number)
}
