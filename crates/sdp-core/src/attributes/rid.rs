//! `a=rid` (RFC 8851) and `a=simulcast` (RFC 8853)

use super::common::{not_space, parse_value};
use crate::error::Result;
use crate::session::{Rid, Simulcast};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::space1,
    combinator::{opt, rest},
    sequence::{preceded, tuple},
    IResult,
};

fn rid_direction(input: &str) -> IResult<&str, &str> {
    alt((tag("send"), tag("recv")))(input)
}

fn rid_parser(input: &str) -> IResult<&str, Rid> {
    let (input, (id, _, direction, params)) =
        tuple((not_space, space1, rid_direction, opt(preceded(space1, rest))))(input)?;
    Ok((
        input,
        Rid {
            id: id.to_string(),
            direction: direction.to_string(),
            params: params.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string),
        },
    ))
}

fn simulcast_parser(input: &str) -> IResult<&str, Simulcast> {
    let (input, (dir1, _, list1)) = tuple((rid_direction, space1, not_space))(input)?;
    let (input, second) = opt(tuple((space1, rid_direction, space1, not_space)))(input)?;
    Ok((
        input,
        Simulcast {
            dir1: dir1.to_string(),
            list1: list1.to_string(),
            dir2: second.map(|(_, dir, _, _)| dir.to_string()),
            list2: second.map(|(_, _, _, list)| list.to_string()),
        },
    ))
}

pub fn parse_rid(value: &str) -> Result<Rid> {
    parse_value("rid", value, rid_parser)
}

pub fn parse_simulcast(value: &str) -> Result<Simulcast> {
    parse_value("simulcast", value, simulcast_parser)
}

pub fn write_rid(rid: &Rid) -> String {
    match &rid.params {
        Some(params) => format!("{} {} {}", rid.id, rid.direction, params),
        None => format!("{} {}", rid.id, rid.direction),
    }
}

pub fn write_simulcast(simulcast: &Simulcast) -> String {
    match (&simulcast.dir2, &simulcast.list2) {
        (Some(dir2), Some(list2)) => {
            format!("{} {} {} {}", simulcast.dir1, simulcast.list1, dir2, list2)
        }
        _ => format!("{} {}", simulcast.dir1, simulcast.list1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rid() {
        let rid = parse_rid("r0 send pt=96;max-width=320").unwrap();
        assert_eq!(rid.id, "r0");
        assert_eq!(rid.direction, "send");
        assert_eq!(rid.params.as_deref(), Some("pt=96;max-width=320"));
        assert_eq!(parse_rid("r1 recv").unwrap().params, None);
        assert!(parse_rid("r1 sideways").is_err());
    }

    #[test]
    fn test_parse_simulcast() {
        let sc = parse_simulcast("send r0;r1;r2").unwrap();
        assert_eq!(sc.dir1, "send");
        assert_eq!(sc.list1, "r0;r1;r2");
        assert_eq!(sc.dir2, None);

        let both = parse_simulcast("send r0;~r1 recv r2").unwrap();
        assert_eq!(both.dir2.as_deref(), Some("recv"));
        assert_eq!(both.list2.as_deref(), Some("r2"));
        assert_eq!(write_simulcast(&both), "send r0;~r1 recv r2");
    }
}
