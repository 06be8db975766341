// Start/end range and CIDR membership for single addresses.

use crate::addr::{is_valid_len, parse_text};
use crate::cidr::{Network, parse_cidr};

/// Whether `start <= candidate <= end` in unsigned byte order.
///
/// All three buffers must be valid (4 or 16 bytes) and of equal length;
/// anything else is a non-match. No IPv4/mapped coercion happens here.
pub fn in_range_bytes(start: &[u8], end: &[u8], candidate: &[u8]) -> bool {
    let len = candidate.len();
    if !is_valid_len(len) || start.len() != len || end.len() != len {
        return false;
    }
    start <= candidate && candidate <= end
}

/// Text form of [`in_range_bytes`].
///
/// All three are parsed to the canonical 16-byte form first, so IPv4 and
/// mapped IPv4 text compare as equals. Invalid text is a non-match.
pub fn in_range(start: &str, end: &str, candidate: &str) -> bool {
    let (Some(start), Some(end), Some(candidate)) =
        (parse_text(start), parse_text(end), parse_text(candidate))
    else {
        return false;
    };
    in_range_bytes(start.as_bytes(), end.as_bytes(), candidate.as_bytes())
}

/// Whether `candidate` lies in `network`.
pub fn in_cidr(network: &Network, candidate: &[u8]) -> bool {
    network.contains(candidate)
}

/// Whether the address text `candidate` lies in the CIDR text `cidr`.
pub fn in_cidr_str(cidr: &str, candidate: &str) -> bool {
    if cidr.is_empty() || candidate.is_empty() {
        return false;
    }
    match parse_text(candidate) {
        Some(addr) => in_cidr_bytes(cidr, addr.as_bytes()),
        None => false,
    }
}

/// Whether the buffer `candidate` lies in the CIDR text `cidr`.
pub fn in_cidr_bytes(cidr: &str, candidate: &[u8]) -> bool {
    if cidr.is_empty() || candidate.is_empty() {
        return false;
    }
    match parse_cidr(cidr) {
        (version, _, Some(network)) if version.is_valid() => network.contains(candidate),
        _ => false,
    }
}
