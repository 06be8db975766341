// Numeric forms of addresses.
//
// The numeric value of an address is the big-endian integer of its real
// (narrowed) bytes, so `::ffff:10.1.255.255` and `10.1.255.255` are the same
// number. Raw and IPv4-only views are provided separately.

use num_bigint::BigUint;

use super::codec::{Address, is_valid_len, narrow, parse_text, to_ip_real};
use super::format::to_text;
use super::version::{IPV4_LEN, IPV6_LEN, VersionHint};
use crate::error::{Error, Result};

/// Smallest radix accepted by the text helpers.
pub const MIN_RADIX: u32 = 2;
/// Largest radix accepted by the text helpers.
pub const MAX_RADIX: u32 = 36;

#[inline]
fn radix_ok(radix: u32) -> bool {
    (MIN_RADIX..=MAX_RADIX).contains(&radix)
}

// ---------------------------------------------------------------------------
// Address -> number
// ---------------------------------------------------------------------------

/// Number of the narrowed bytes. Invalid lengths yield zero.
pub fn address_to_number(bytes: &[u8]) -> BigUint {
    if !is_valid_len(bytes.len()) {
        return BigUint::default();
    }
    BigUint::from_bytes_be(narrow(bytes))
}

/// Number of an address text (narrowed policy). Invalid text yields zero.
pub fn to_number(s: &str) -> BigUint {
    to_ip_real(s).map_or_else(BigUint::default, |a| BigUint::from_bytes_be(a.as_bytes()))
}

/// Number of the raw bytes without narrowing. Invalid lengths yield zero.
pub fn bytes_to_number(bytes: &[u8]) -> BigUint {
    if !is_valid_len(bytes.len()) {
        return BigUint::default();
    }
    BigUint::from_bytes_be(bytes)
}

/// Number of the low 4 bytes. Invalid lengths yield zero.
pub fn bytes_to_ipv4_number(bytes: &[u8]) -> BigUint {
    match bytes.len() {
        IPV4_LEN => BigUint::from_bytes_be(bytes),
        IPV6_LEN => BigUint::from_bytes_be(&bytes[12..]),
        _ => BigUint::default(),
    }
}

/// IPv4 number of `s`; zero unless `s` is (mapped) IPv4.
pub fn to_ipv4_number(s: &str) -> u32 {
    match to_ip_real(s) {
        Some(Address::V4(b)) => u32::from_be_bytes(b),
        _ => 0,
    }
}

/// Low 32 bits of any valid address text; zero for invalid text.
pub fn to_number_ipv4(s: &str) -> u32 {
    match parse_text(s) {
        Some(Address::V6(b)) => u32::from_be_bytes([b[12], b[13], b[14], b[15]]),
        Some(Address::V4(b)) => u32::from_be_bytes(b),
        None => 0,
    }
}

/// Dotted-quad text of an IPv4 number.
pub fn number_ipv4_to_str(n: u32) -> String {
    to_text(&n.to_be_bytes(), VersionHint::V4)
}

// ---------------------------------------------------------------------------
// Number -> address
// ---------------------------------------------------------------------------

/// Address for `n`, left-padded with zeros to the width chosen by `hint`.
///
/// - `V4`: 4 bytes. Values wider than 32 bits keep their low 4 bytes.
/// - `V6`: 16 bytes.
/// - `Any`: 4 bytes when `n` fits, else 16.
///
/// Returns `None` when `n` needs more than 16 bytes.
pub fn from_number(n: &BigUint, hint: VersionHint) -> Option<Address> {
    let raw = if n.bits() == 0 {
        Vec::new()
    } else {
        n.to_bytes_be()
    };
    if raw.len() > IPV6_LEN {
        return None;
    }

    let size = match hint {
        VersionHint::V4 => IPV4_LEN,
        VersionHint::V6 => IPV6_LEN,
        VersionHint::Any if raw.len() <= IPV4_LEN => IPV4_LEN,
        VersionHint::Any => IPV6_LEN,
    };
    Address::from_slice(&copy_from_right(&raw, size))
}

/// Byte form of [`from_number`].
pub fn number_to_ip(n: &BigUint, hint: VersionHint) -> Option<Vec<u8>> {
    from_number(n, hint).map(|a| a.to_vec())
}

/// Right-aligned copy of `src` into `size` bytes, truncating from the left.
fn copy_from_right(src: &[u8], size: usize) -> Vec<u8> {
    let mut dst = vec![0u8; size];
    if src.len() >= size {
        dst.copy_from_slice(&src[src.len() - size..]);
    } else {
        dst[size - src.len()..].copy_from_slice(src);
    }
    dst
}

// ---------------------------------------------------------------------------
// Radix text
// ---------------------------------------------------------------------------

/// Number of `s` (narrowed policy) as text in `radix`. Empty on invalid
/// address or radix outside `2..=36`.
pub fn to_text_number(s: &str, radix: u32) -> String {
    if !radix_ok(radix) {
        return String::new();
    }
    to_ip_real(s).map_or_else(String::new, |a| {
        BigUint::from_bytes_be(a.as_bytes()).to_str_radix(radix)
    })
}

/// Low 32 bits of `s` as text in `radix`. Empty on invalid input.
pub fn to_text_ipv4_number(s: &str, radix: u32) -> String {
    if !radix_ok(radix) {
        return String::new();
    }
    parse_text(s).map_or_else(String::new, |a| {
        BigUint::from_bytes_be(&a.as_bytes()[12..]).to_str_radix(radix)
    })
}

/// Parse numeric text in `radix`. Values needing more than 16 bytes are
/// rejected.
pub fn parse_number(num: &str, radix: u32) -> Result<BigUint> {
    if !radix_ok(radix) {
        return Err(Error::InvalidRadix(radix));
    }
    let n = BigUint::parse_bytes(num.trim().as_bytes(), radix)
        .ok_or_else(|| Error::InvalidNumber(num.to_string()))?;
    if n.bits() > 8 * IPV6_LEN as u64 {
        return Err(Error::InvalidNumber(num.to_string()));
    }
    Ok(n)
}

/// Address text for a number written in `radix`. Empty on invalid input.
pub fn text_number_to_ip_str(num: &str, radix: u32) -> String {
    parse_number(num, radix)
        .ok()
        .and_then(|n| from_number(&n, VersionHint::Any))
        .map_or_else(String::new, |a| to_text(a.as_bytes(), VersionHint::Any))
}
