//! `a=group` (RFC 5888) and `a=msid-semantic`

use super::common::{not_space, parse_value};
use crate::error::Result;
use crate::session::{Group, MsidSemantic};
use nom::{
    character::complete::space1,
    combinator::{opt, rest},
    multi::many0,
    sequence::{pair, preceded},
    IResult,
};

fn group_parser(input: &str) -> IResult<&str, Group> {
    let (input, (semantics, mids)) = pair(not_space, many0(preceded(space1, not_space)))(input)?;
    Ok((
        input,
        Group {
            semantics: semantics.to_string(),
            mids: mids.into_iter().map(str::to_string).collect(),
        },
    ))
}

fn msid_semantic_parser(input: &str) -> IResult<&str, MsidSemantic> {
    let (input, (semantic, token)) = pair(not_space, opt(preceded(space1, rest)))(input)?;
    Ok((
        input,
        MsidSemantic {
            semantic: semantic.to_string(),
            token: token.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string),
        },
    ))
}

pub fn parse_group(value: &str) -> Result<Group> {
    parse_value("group", value, group_parser)
}

pub fn parse_msid_semantic(value: &str) -> Result<MsidSemantic> {
    parse_value("msid-semantic", value, msid_semantic_parser)
}

pub fn write_group(group: &Group) -> String {
    if group.mids.is_empty() {
        group.semantics.clone()
    } else {
        format!("{} {}", group.semantics, group.mids.join(" "))
    }
}

pub fn write_msid_semantic(msid: &MsidSemantic) -> String {
    match &msid.token {
        Some(token) => format!(" {} {}", msid.semantic, token),
        None => format!(" {}", msid.semantic),
    }
}
