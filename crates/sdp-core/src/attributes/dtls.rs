//! `a=fingerprint` (RFC 8122) and `a=setup` (RFC 4145)

use super::common::{not_space, parse_value};
use crate::error::{Result, SdpError};
use crate::session::Fingerprint;
use nom::{character::complete::space1, combinator::map, sequence::separated_pair, IResult};

fn fingerprint_parser(input: &str) -> IResult<&str, Fingerprint> {
    map(separated_pair(not_space, space1, not_space), |(hash_type, hash): (&str, &str)| {
        Fingerprint { hash_type: hash_type.to_string(), hash: hash.to_string() }
    })(input)
}

pub fn parse_fingerprint(value: &str) -> Result<Fingerprint> {
    parse_value("fingerprint", value, fingerprint_parser)
}

/// `active`, `passive`, `actpass` or `holdconn`.
pub fn parse_setup(value: &str) -> Result<String> {
    match value.trim() {
        role @ ("active" | "passive" | "actpass" | "holdconn") => Ok(role.to_string()),
        _ => Err(SdpError::invalid_attribute("setup", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fingerprint() {
        let fp = parse_fingerprint("sha-256 AF:9E:29:99:AC:F6:F6:A2").unwrap();
        assert_eq!(fp.hash_type, "sha-256");
        assert_eq!(fp.hash, "AF:9E:29:99:AC:F6:F6:A2");
        assert!(parse_fingerprint("sha-256").is_err());
    }

    #[test]
    fn test_parse_setup() {
        assert_eq!(parse_setup("actpass").unwrap(), "actpass");
        assert_eq!(parse_setup(" active ").unwrap(), "active");
        assert!(parse_setup("sometimes").is_err());
    }
}
