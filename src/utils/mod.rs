mod asn;
mod parse;
mod pattern;

pub use asn::{available_asns, AsnSlot};
pub use parse::{asn_from_dotted, ParseError};
pub use pattern::{expand_asns, expand_pattern, AsnPattern};

use std::fmt::Display;

/// Placeholder for unset values in output
pub const EMPTY_VALUE: &str = "";

/// Convert an ASN (4 byte) as dotted if it exceeds the 2-byte limit
/// E.g. 4259840100 -> "65000.100"
pub fn u32_to_dotted(asn: u32, sep: char) -> String {
    if asn <= u32::from(u16::MAX) {
        format!("{}", asn)
    } else {
        format!("{}{}{}", asn >> 16, sep, asn & 0xffff)
    }
}

pub fn maybe_string<T: Display>(item: Option<&T>) -> String {
    item.map(|i| i.to_string())
        .unwrap_or_else(|| String::from(EMPTY_VALUE))
}
