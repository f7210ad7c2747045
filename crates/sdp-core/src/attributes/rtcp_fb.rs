//! `a=rtcp-fb` (RFC 4585 section 4.2)

use super::common::{not_space, parse_value};
use crate::error::Result;
use crate::session::RtcpFb;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{digit1, space1},
    combinator::{map, opt, rest},
    sequence::{preceded, tuple},
    IResult,
};

fn rtcp_fb_parser(input: &str) -> IResult<&str, RtcpFb> {
    map(
        tuple((
            alt((tag("*"), digit1)),
            preceded(space1, not_space),
            opt(preceded(space1, rest)),
        )),
        |(payload, fb_type, subtype): (&str, &str, Option<&str>)| RtcpFb {
            payload: payload.to_string(),
            fb_type: fb_type.to_string(),
            subtype: subtype
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        },
    )(input)
}

pub fn parse_rtcp_fb(value: &str) -> Result<RtcpFb> {
    parse_value("rtcp-fb", value, rtcp_fb_parser)
}

pub fn write_rtcp_fb(fb: &RtcpFb) -> String {
    match &fb.subtype {
        Some(subtype) => format!("{} {} {}", fb.payload, fb.fb_type, subtype),
        None => format!("{} {}", fb.payload, fb.fb_type),
    }
}
