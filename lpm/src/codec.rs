// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Decoding of the string-encoded prefixes that peers hand out as next-hop
//! sources: `<addr>[/<plen>]`, where IPv6 addresses may carry a leading zero
//! MAC marker (`00:00:00:00:00:00:<addr>`).

use crate::prefix::{Prefix, PrefixError};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Zero MAC preceding the address in MAC-qualified prefix strings
pub const ZERO_MAC_MARKER: &str = "00:00:00:00:00:00:";

/// Parse a prefix string into an address and a prefix length.
///
/// A string is IPv4 iff it contains a `.`, and IPv6 iff it contains a `:` and
/// is not IPv4. The length defaults to the family maximum when absent and is
/// clamped to it when larger. The returned address keeps its host bits.
///
/// # Errors
/// Fails if the family cannot be told, the address does not parse or the length
/// is not a number.
pub fn parse_prefix_str(s: &str) -> Result<(IpAddr, u8), PrefixError> {
    let is_v4 = s.contains('.');
    if !is_v4 && !s.contains(':') {
        return Err(PrefixError::Invalid(s.to_owned()));
    }

    let (addr_str, len_str) = match s.split_once('/') {
        Some((a, l)) => (a, Some(l)),
        None => (s, None),
    };

    let address = addr_str
        .strip_prefix(ZERO_MAC_MARKER)
        .and_then(|a| parse_address(a, is_v4))
        .or_else(|| parse_address(addr_str, is_v4))
        .ok_or_else(|| PrefixError::InvalidAddress(s.to_owned()))?;

    let max_len = Prefix::max_len_for(&address);
    let length = match len_str {
        None => max_len,
        Some(l) => {
            let parsed = l
                .trim()
                .parse::<u32>()
                .map_err(|_| PrefixError::InvalidLengthStr(s.to_owned()))?;
            u8::try_from(parsed.min(u32::from(max_len))).unwrap_or(max_len)
        }
    };
    Ok((address, length))
}

fn parse_address(s: &str, is_v4: bool) -> Option<IpAddr> {
    if is_v4 {
        Ipv4Addr::from_str(s).ok().map(IpAddr::V4)
    } else {
        Ipv6Addr::from_str(s).ok().map(IpAddr::V6)
    }
}

/// Format an (address, length) pair the way [`parse_prefix_str`] reads it
#[must_use]
pub fn format_prefix(address: &IpAddr, length: u8) -> String {
    format!("{address}/{length}")
}

#[derive(Debug)]
#[repr(transparent)]
pub struct PrefixString<'a>(pub &'a str);

impl<'a> TryFrom<PrefixString<'a>> for Prefix {
    type Error = PrefixError;

    fn try_from(value: PrefixString<'a>) -> Result<Self, Self::Error> {
        let (address, length) = parse_prefix_str(value.0)?;
        Prefix::new(address, length)
    }
}
