//! `a=rtpmap` (RFC 8866 section 6.6)
//!
//! Format: `a=rtpmap:<payload type> <encoding name>/<clock rate>[/<encoding parameters>]`

use super::common::{parse_value, u32_number, u8_number};
use crate::error::Result;
use crate::session::RtpMap;
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, space1},
    combinator::{map, opt},
    sequence::{preceded, tuple},
    IResult,
};

fn rtpmap_parser(input: &str) -> IResult<&str, RtpMap> {
    map(
        tuple((
            u8_number,
            preceded(space1, take_till1(|c: char| c == '/' || c.is_whitespace())),
            preceded(char('/'), u32_number),
            opt(preceded(char('/'), u8_number)),
        )),
        |(payload, codec, rate, encoding)| RtpMap {
            payload,
            codec: codec.to_string(),
            rate,
            encoding,
        },
    )(input)
}

pub fn parse_rtpmap(value: &str) -> Result<RtpMap> {
    parse_value("rtpmap", value, rtpmap_parser)
}

pub fn write_rtpmap(rtp: &RtpMap) -> String {
    match rtp.encoding {
        Some(encoding) => format!("{} {}/{}/{}", rtp.payload, rtp.codec, rtp.rate, encoding),
        None => format!("{} {}/{}", rtp.payload, rtp.codec, rtp.rate),
    }
}
