//! `a=ssrc` and `a=ssrc-group` (RFC 5576)

use super::common::{not_space, parse_value, u32_number};
use crate::error::Result;
use crate::session::{SsrcAttribute, SsrcGroup};
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, space1},
    combinator::{opt, rest},
    multi::many1,
    sequence::preceded,
    IResult,
};

fn ssrc_parser(input: &str) -> IResult<&str, SsrcAttribute> {
    let (input, id) = u32_number(input)?;
    let (input, _) = space1(input)?;
    let (input, attribute) = take_till1(|c: char| c == ':' || c.is_whitespace())(input)?;
    let (input, value) = opt(preceded(char(':'), rest))(input)?;

    Ok((
        input,
        SsrcAttribute {
            id,
            attribute: attribute.to_string(),
            value: value.map(|v: &str| v.trim().to_string()),
        },
    ))
}

fn ssrc_group_parser(input: &str) -> IResult<&str, SsrcGroup> {
    let (input, semantics) = not_space(input)?;
    let (input, ssrcs) = many1(preceded(space1, u32_number))(input)?;
    Ok((input, SsrcGroup { semantics: semantics.to_string(), ssrcs }))
}

pub fn parse_ssrc(value: &str) -> Result<SsrcAttribute> {
    parse_value("ssrc", value, ssrc_parser)
}

pub fn parse_ssrc_group(value: &str) -> Result<SsrcGroup> {
    parse_value("ssrc-group", value, ssrc_group_parser)
}

pub fn write_ssrc(ssrc: &SsrcAttribute) -> String {
    match &ssrc.value {
        Some(value) => format!("{} {}:{}", ssrc.id, ssrc.attribute, value),
        None => format!("{} {}", ssrc.id, ssrc.attribute),
    }
}

pub fn write_ssrc_group(group: &SsrcGroup) -> String {
    let ssrcs: Vec<String> = group.ssrcs.iter().map(u32::to_string).collect();
    format!("{} {}", group.semantics, ssrcs.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssrc() {
        let ssrc = parse_ssrc("3510681183 cname:fLw0L2p+5+TgmXdB").unwrap();
        assert_eq!(ssrc.id, 3510681183);
        assert_eq!(ssrc.attribute, "cname");
        assert_eq!(ssrc.value.as_deref(), Some("fLw0L2p+5+TgmXdB"));

        let msid = parse_ssrc("1 msid:stream-0 track-0").unwrap();
        assert_eq!(msid.value.as_deref(), Some("stream-0 track-0"));

        assert!(parse_ssrc("abc cname:x").is_err());
    }

    #[test]
    fn test_parse_ssrc_group() {
        let group = parse_ssrc_group("FID 1111 2222").unwrap();
        assert_eq!(group.semantics, "FID");
        assert_eq!(group.ssrcs, vec![1111, 2222]);
        assert_eq!(write_ssrc_group(&group), "FID 1111 2222");
        assert!(parse_ssrc_group("FID").is_err());
    }
}
