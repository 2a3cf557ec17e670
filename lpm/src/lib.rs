// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IP prefixes, prefix-string decoding and Longest Prefix Match (LPM) maps.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::similar_names)]

pub mod codec;
pub mod prefix;
pub mod trie;

// re-exports
pub use codec::{PrefixString, format_prefix, parse_prefix_str};
pub use prefix::{Prefix, PrefixError};
pub use trie::IpPrefixMap;
