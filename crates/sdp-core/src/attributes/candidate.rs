//! `a=candidate` (RFC 8839 section 5.1)
//!
//! Format: `<foundation> <component> <transport> <priority> <address> <port> typ <type> [<name> <value>]...`

use super::common::{not_space, parse_value, u16_number, u32_number, u64_number};
use crate::error::Result;
use crate::session::Candidate;
use nom::{
    bytes::complete::tag,
    character::complete::space1,
    multi::many0,
    sequence::{preceded, separated_pair, tuple},
    IResult,
};

fn candidate_parser(input: &str) -> IResult<&str, Candidate> {
    let (input, (foundation, _, component, _, transport, _, priority, _, ip, _, port, _, _, _, candidate_type)) =
        tuple((
            not_space,
            space1,
            u32_number,
            space1,
            not_space,
            space1,
            u64_number,
            space1,
            not_space,
            space1,
            u16_number,
            space1,
            tag("typ"),
            space1,
            not_space,
        ))(input)?;
    let (input, pairs) = many0(preceded(space1, separated_pair(not_space, space1, not_space)))(input)?;

    let mut candidate = Candidate {
        foundation: foundation.to_string(),
        component,
        transport: transport.to_string(),
        priority,
        ip: ip.to_string(),
        port,
        candidate_type: candidate_type.to_string(),
        raddr: None,
        rport: None,
        tcptype: None,
        generation: None,
        extensions: Vec::new(),
    };

    for (name, value) in pairs {
        match name {
            "raddr" => candidate.raddr = Some(value.to_string()),
            "rport" if value.parse::<u16>().is_ok() => candidate.rport = value.parse().ok(),
            "tcptype" => candidate.tcptype = Some(value.to_string()),
            "generation" if value.parse::<u32>().is_ok() => candidate.generation = value.parse().ok(),
            _ => candidate.extensions.push((name.to_string(), value.to_string())),
        }
    }

    Ok((input, candidate))
}

pub fn parse_candidate(value: &str) -> Result<Candidate> {
    parse_value("candidate", value, candidate_parser)
}

pub fn write_candidate(c: &Candidate) -> String {
    let mut out = format!(
        "{} {} {} {} {} {} typ {}",
        c.foundation, c.component, c.transport, c.priority, c.ip, c.port, c.candidate_type
    );
    if let Some(raddr) = &c.raddr {
        out.push_str(&format!(" raddr {raddr}"));
    }
    if let Some(rport) = c.rport {
        out.push_str(&format!(" rport {rport}"));
    }
    if let Some(tcptype) = &c.tcptype {
        out.push_str(&format!(" tcptype {tcptype}"));
    }
    if let Some(generation) = c.generation {
        out.push_str(&format!(" generation {generation}"));
    }
    for (name, value) in &c.extensions {
        out.push_str(&format!(" {name} {value}"));
    }
    out
}
