//! `a=fmtp` and its `name=value;...` parameter list.

use super::common::{parse_value, u8_number};
use crate::error::Result;
use crate::session::Fmtp;
use nom::{
    character::complete::space1,
    combinator::{map, opt, rest},
    sequence::{pair, preceded},
    IResult,
};

fn fmtp_parser(input: &str) -> IResult<&str, Fmtp> {
    map(pair(u8_number, opt(preceded(space1, rest))), |(payload, config): (u8, Option<&str>)| Fmtp {
        payload,
        config: config.map(str::trim).unwrap_or_default().to_string(),
    })(input)
}

pub fn parse_fmtp(value: &str) -> Result<Fmtp> {
    parse_value("fmtp", value, fmtp_parser)
}

/// Split an fmtp config into `(name, value)` pairs, in order.
///
/// Entries without `=` (e.g. the `0-15` of telephone-event) yield a `None` value.
pub fn parse_params(config: &str) -> Vec<(String, Option<String>)> {
    config
        .split(';')
        .map(str::trim)
        .filter(|expr| !expr.is_empty())
        .map(|expr| match expr.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), Some(value.trim().to_string())),
            None => (expr.to_string(), None),
        })
        .collect()
}

/// Inverse of [`parse_params`].
pub fn write_params<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    params
        .into_iter()
        .map(|(name, value)| match value {
            Some(value) => format!("{name}={value}"),
            None => name.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fmtp() {
        let fmtp = parse_fmtp("111 minptime=10;useinbandfec=1").unwrap();
        assert_eq!(fmtp.payload, 111);
        assert_eq!(fmtp.config, "minptime=10;useinbandfec=1");
        assert_eq!(parse_fmtp("97").unwrap().config, "");
        assert!(parse_fmtp("x apt=96").is_err());
    }

    #[test]
    fn test_parse_params() {
        assert_eq!(
            parse_params("level-asymmetry-allowed=1; packetization-mode=1;profile-level-id=42e01f"),
            vec![
                ("level-asymmetry-allowed".to_string(), Some("1".to_string())),
                ("packetization-mode".to_string(), Some("1".to_string())),
                ("profile-level-id".to_string(), Some("42e01f".to_string())),
            ]
        );
        assert_eq!(parse_params("0-16"), vec![("0-16".to_string(), None)]);
        assert!(parse_params("").is_empty());
    }

    #[test]
    fn test_write_params() {
        assert_eq!(
            write_params(vec![("apt", Some("96")), ("x", None)]),
            "apt=96;x"
        );
    }
}
