//! SDP serializer.
//!
//! Lines are emitted in RFC 8866 order with CRLF endings. Within a media
//! section each payload's `rtpmap`, `rtcp-fb` and `fmtp` lines are grouped,
//! which is the layout browsers produce and accept.

use crate::attributes::{
    write_candidate, write_extmap, write_group, write_msid_semantic, write_rid, write_rtcp,
    write_rtcp_fb, write_rtpmap, write_sctpmap, write_simulcast, write_ssrc, write_ssrc_group,
};
use crate::session::{Attribute, MediaDescription, SessionDescription};
use std::fmt::{self, Write};

struct Lines<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
}

impl Lines<'_, '_> {
    fn line(&mut self, kind: char, value: impl fmt::Display) -> fmt::Result {
        write!(self.f, "{kind}={value}\r\n")
    }

    fn attr(&mut self, name: &str, value: impl fmt::Display) -> fmt::Result {
        write!(self.f, "a={name}:{value}\r\n")
    }

    fn flag(&mut self, name: &str) -> fmt::Result {
        write!(self.f, "a={name}\r\n")
    }

    fn other(&mut self, attribute: &Attribute) -> fmt::Result {
        match &attribute.value {
            Some(value) => self.attr(&attribute.name, value),
            None => self.flag(&attribute.name),
        }
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Lines { f };
        let o = &self.origin;

        out.line('v', self.version)?;
        out.line(
            'o',
            format_args!(
                "{} {} {} {} IP{} {}",
                o.username, o.session_id, o.session_version, o.net_type, o.ip_ver, o.address
            ),
        )?;
        out.line('s', &self.name)?;
        for (kind, value) in &self.other_lines {
            out.line(*kind, value)?;
        }
        if let Some(c) = &self.connection {
            out.line('c', format_args!("IN IP{} {}", c.ip_ver, c.ip))?;
        }
        for b in &self.bandwidths {
            out.line('b', format_args!("{}:{}", b.bw_type, b.limit))?;
        }
        out.line('t', format_args!("{} {}", self.timing.start, self.timing.stop))?;

        if self.ice_lite {
            out.flag("ice-lite")?;
        }
        if let Some(ufrag) = &self.ice_ufrag {
            out.attr("ice-ufrag", ufrag)?;
        }
        if let Some(pwd) = &self.ice_pwd {
            out.attr("ice-pwd", pwd)?;
        }
        if let Some(options) = &self.ice_options {
            out.attr("ice-options", options)?;
        }
        if let Some(fp) = &self.fingerprint {
            out.attr("fingerprint", format_args!("{} {}", fp.hash_type, fp.hash))?;
        }
        if let Some(setup) = &self.setup {
            out.attr("setup", setup)?;
        }
        for group in &self.groups {
            out.attr("group", write_group(group))?;
        }
        if let Some(msid) = &self.msid_semantic {
            out.attr("msid-semantic", write_msid_semantic(msid))?;
        }
        if self.extmap_allow_mixed {
            out.flag("extmap-allow-mixed")?;
        }
        for attribute in &self.other_attributes {
            out.other(attribute)?;
        }

        for media in &self.media {
            write_media(&mut out, media)?;
        }
        Ok(())
    }
}

fn write_media(out: &mut Lines<'_, '_>, m: &MediaDescription) -> fmt::Result {
    let mut header = m.media_type.clone();
    let _ = write!(header, " {}", m.port);
    if let Some(n) = m.num_ports {
        let _ = write!(header, "/{n}");
    }
    let _ = write!(header, " {}", m.protocol);
    if !m.payloads.is_empty() {
        let _ = write!(header, " {}", m.payloads);
    }
    out.line('m', header)?;

    if let Some(c) = &m.connection {
        out.line('c', format_args!("IN IP{} {}", c.ip_ver, c.ip))?;
    }
    for b in &m.bandwidths {
        out.line('b', format_args!("{}:{}", b.bw_type, b.limit))?;
    }
    if let Some(rtcp) = &m.rtcp {
        out.attr("rtcp", write_rtcp(rtcp))?;
    }
    if let Some(ufrag) = &m.ice_ufrag {
        out.attr("ice-ufrag", ufrag)?;
    }
    if let Some(pwd) = &m.ice_pwd {
        out.attr("ice-pwd", pwd)?;
    }
    if let Some(options) = &m.ice_options {
        out.attr("ice-options", options)?;
    }
    if let Some(fp) = &m.fingerprint {
        out.attr("fingerprint", format_args!("{} {}", fp.hash_type, fp.hash))?;
    }
    if let Some(setup) = &m.setup {
        out.attr("setup", setup)?;
    }
    if let Some(mid) = &m.mid {
        out.attr("mid", mid)?;
    }
    for ext in &m.ext {
        out.attr("extmap", write_extmap(ext))?;
    }
    if let Some(direction) = m.direction {
        out.flag(direction.as_str())?;
    }
    if let Some(msid) = &m.msid {
        out.attr("msid", msid)?;
    }
    if m.rtcp_mux {
        out.flag("rtcp-mux")?;
    }
    if m.rtcp_rsize {
        out.flag("rtcp-rsize")?;
    }
    if m.extmap_allow_mixed {
        out.flag("extmap-allow-mixed")?;
    }

    for rtp in &m.rtp {
        out.attr("rtpmap", write_rtpmap(rtp))?;
        let payload = rtp.payload.to_string();
        for fb in m.rtcp_fb.iter().filter(|fb| fb.payload == payload) {
            out.attr("rtcp-fb", write_rtcp_fb(fb))?;
        }
        for fmtp in m.fmtp.iter().filter(|f| f.payload == rtp.payload) {
            out.attr("fmtp", format_args!("{} {}", fmtp.payload, fmtp.config))?;
        }
    }
    // Feedback and fmtp lines with no matching rtpmap (wildcards, static payloads).
    for fb in &m.rtcp_fb {
        let orphan = fb.payload.parse::<u8>().map_or(true, |pt| m.rtp_for(pt).is_none());
        if orphan {
            out.attr("rtcp-fb", write_rtcp_fb(fb))?;
        }
    }
    for fmtp in m.fmtp.iter().filter(|f| m.rtp_for(f.payload).is_none()) {
        out.attr("fmtp", format_args!("{} {}", fmtp.payload, fmtp.config))?;
    }

    if let Some(ptime) = m.ptime {
        out.attr("ptime", ptime)?;
    }
    if let Some(maxptime) = m.maxptime {
        out.attr("maxptime", maxptime)?;
    }
    for candidate in &m.candidates {
        out.attr("candidate", write_candidate(candidate))?;
    }
    if m.end_of_candidates {
        out.flag("end-of-candidates")?;
    }
    for group in &m.ssrc_groups {
        out.attr("ssrc-group", write_ssrc_group(group))?;
    }
    for ssrc in &m.ssrcs {
        out.attr("ssrc", write_ssrc(ssrc))?;
    }
    for rid in &m.rids {
        out.attr("rid", write_rid(rid))?;
    }
    if let Some(simulcast) = &m.simulcast {
        out.attr("simulcast", write_simulcast(simulcast))?;
    }
    if let Some(sctpmap) = &m.sctpmap {
        out.attr("sctpmap", write_sctpmap(sctpmap))?;
    }
    if let Some(port) = m.sctp_port {
        out.attr("sctp-port", port)?;
    }
    if let Some(size) = m.max_message_size {
        out.attr("max-message-size", size)?;
    }
    for attribute in &m.other_attributes {
        out.other(attribute)?;
    }
    Ok(())
}

/// Serialize a session description to SDP text.
pub fn write(session: &SessionDescription) -> String {
    session.to_string()
}
