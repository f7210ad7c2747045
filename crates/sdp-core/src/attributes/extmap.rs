//! `a=extmap` (RFC 8285 section 8)
//!
//! Format: `a=extmap:<id>[/<direction>] [urn:ietf:params:rtp-hdrext:encrypt] <uri> [<attributes>]`

use super::common::{not_space, parse_value, u16_number};
use crate::error::Result;
use crate::session::{Direction, ExtMap};
use nom::{
    bytes::complete::tag,
    character::complete::{alpha1, char, space1},
    combinator::{map_res, opt, rest},
    sequence::{preceded, terminated},
    IResult,
};

/// Marker preceding the uri of an encrypted extension (RFC 6904).
pub const ENCRYPT_URI: &str = "urn:ietf:params:rtp-hdrext:encrypt";

fn direction(input: &str) -> IResult<&str, Direction> {
    map_res(alpha1, str::parse::<Direction>)(input)
}

fn extmap_parser(input: &str) -> IResult<&str, ExtMap> {
    let (input, id) = u16_number(input)?;
    let (input, direction) = opt(preceded(char('/'), direction))(input)?;
    let (input, _) = space1(input)?;
    let (input, encrypt) = opt(terminated(tag(ENCRYPT_URI), space1))(input)?;
    let (input, uri) = not_space(input)?;
    let (input, config) = opt(preceded(space1, rest))(input)?;

    Ok((
        input,
        ExtMap {
            id,
            direction,
            encrypt: encrypt.is_some(),
            uri: uri.to_string(),
            config: config.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        },
    ))
}

pub fn parse_extmap(value: &str) -> Result<ExtMap> {
    parse_value("extmap", value, extmap_parser)
}

pub fn write_extmap(ext: &ExtMap) -> String {
    let mut out = ext.id.to_string();
    if let Some(direction) = ext.direction {
        out.push('/');
        out.push_str(direction.as_str());
    }
    out.push(' ');
    if ext.encrypt {
        out.push_str(ENCRYPT_URI);
        out.push(' ');
    }
    out.push_str(&ext.uri);
    if let Some(config) = &ext.config {
        out.push(' ');
        out.push_str(config);
    }
    out
}
