//! Shared nom building blocks for attribute and line grammars.

use crate::error::{Result, SdpError};
use nom::{
    bytes::complete::take_till1,
    character::complete::digit1,
    combinator::{all_consuming, map_res},
    IResult,
};

/// A run of non-whitespace characters.
pub fn not_space(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

pub fn u8_number(input: &str) -> IResult<&str, u8> {
    map_res(digit1, str::parse::<u8>)(input)
}

pub fn u16_number(input: &str) -> IResult<&str, u16> {
    map_res(digit1, str::parse::<u16>)(input)
}

pub fn u32_number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

pub fn u64_number(input: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>)(input)
}

/// Run `parser` over the whole (trimmed) attribute value.
pub fn parse_value<'a, T, F>(name: &str, value: &'a str, parser: F) -> Result<T>
where
    F: FnMut(&'a str) -> IResult<&'a str, T>,
{
    match all_consuming(parser)(value.trim()) {
        Ok((_, parsed)) => Ok(parsed),
        Err(_) => Err(SdpError::invalid_attribute(name, value)),
    }
}

/// Trimmed value, rejecting an empty one.
pub fn non_empty(name: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SdpError::invalid_attribute(name, value));
    }
    Ok(value.to_string())
}
