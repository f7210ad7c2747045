//! SCTP-over-DTLS attributes (RFC 8841) plus the legacy `a=sctpmap`, and `a=rtcp`.

use super::common::{not_space, parse_value, u16_number, u32_number, u8_number};
use crate::error::Result;
use crate::session::{RtcpAddress, SctpMap};
use nom::{
    bytes::complete::tag,
    character::complete::space1,
    combinator::opt,
    sequence::{preceded, tuple},
    IResult,
};

fn sctpmap_parser(input: &str) -> IResult<&str, SctpMap> {
    let (input, (number, _, app, max_message_size)) =
        tuple((u16_number, space1, not_space, opt(preceded(space1, u32_number))))(input)?;
    Ok((input, SctpMap { number, app: app.to_string(), max_message_size }))
}

fn rtcp_parser(input: &str) -> IResult<&str, RtcpAddress> {
    let (input, port) = u16_number(input)?;
    let (input, address) = opt(tuple((
        preceded(space1, not_space),
        preceded(space1, preceded(tag("IP"), u8_number)),
        preceded(space1, not_space),
    )))(input)?;
    Ok((
        input,
        RtcpAddress {
            port,
            net_type: address.map(|(net_type, _, _)| net_type.to_string()),
            ip_ver: address.map(|(_, ip_ver, _)| ip_ver),
            address: address.map(|(_, _, addr)| addr.to_string()),
        },
    ))
}

pub fn parse_sctp_port(value: &str) -> Result<u16> {
    parse_value("sctp-port", value, u16_number)
}

pub fn parse_max_message_size(value: &str) -> Result<u32> {
    parse_value("max-message-size", value, u32_number)
}

pub fn parse_sctpmap(value: &str) -> Result<SctpMap> {
    parse_value("sctpmap", value, sctpmap_parser)
}

pub fn parse_rtcp(value: &str) -> Result<RtcpAddress> {
    parse_value("rtcp", value, rtcp_parser)
}

pub fn write_sctpmap(map: &SctpMap) -> String {
    match map.max_message_size {
        Some(size) => format!("{} {} {}", map.number, map.app, size),
        None => format!("{} {}", map.number, map.app),
    }
}

pub fn write_rtcp(rtcp: &RtcpAddress) -> String {
    match (&rtcp.net_type, rtcp.ip_ver, &rtcp.address) {
        (Some(net_type), Some(ip_ver), Some(address)) => {
            format!("{} {} IP{} {}", rtcp.port, net_type, ip_ver, address)
        }
        _ => rtcp.port.to_string(),
    }
}
