// Address value type, text parsing and IPv4-mapped narrowing.
//
// Text is parsed with the standard library grammar. The canonical parsed
// form is always 16 bytes: IPv4 text is stored as `::ffff:a.b.c.d`.
// `narrow` is the single place that decides whether a 16-byte buffer is
// really an IPv4 address.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use super::format::to_text;
use super::version::{IPV4_LEN, IPV6_LEN, IpVersion, V4_IN_V6_PREFIX, VersionHint};
use crate::error::Error;

// ---------------------------------------------------------------------------
// Byte-level helpers
// ---------------------------------------------------------------------------

/// True when `len` is a valid address width (4 or 16).
#[inline]
pub fn is_valid_len(len: usize) -> bool {
    len == IPV4_LEN || len == IPV6_LEN
}

/// True when `bytes` is a 16-byte buffer carrying an IPv4 address.
#[inline]
pub fn is_mapped_v4(bytes: &[u8]) -> bool {
    bytes.len() == IPV6_LEN && bytes[..12] == V4_IN_V6_PREFIX
}

/// Strip a mapped IPv4 buffer down to its 4 real bytes.
///
/// Any other input, including lengths other than 4 and 16, is returned
/// unchanged. Idempotent.
#[inline]
pub fn narrow(bytes: &[u8]) -> &[u8] {
    if is_mapped_v4(bytes) {
        &bytes[12..]
    } else {
        bytes
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 4-byte or 16-byte address, most-significant byte first.
///
/// `V6` may hold a mapped IPv4 address; see [`Address::narrow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Address {
    V4([u8; IPV4_LEN]),
    V6([u8; IPV6_LEN]),
}

impl Address {
    /// Build from a 4 or 16 byte slice. Other lengths yield `None`.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        match bytes.len() {
            IPV4_LEN => bytes.try_into().ok().map(Self::V4),
            IPV6_LEN => bytes.try_into().ok().map(Self::V6),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::V4(b) => b,
            Self::V6(b) => b,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Always false; present for symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Width in bits of the stored form (32 or 128).
    pub fn bits(&self) -> u32 {
        8 * self.len() as u32
    }

    /// The real form: mapped IPv4 becomes `V4`, everything else is kept.
    pub fn narrow(self) -> Self {
        match self {
            Self::V6(b) if is_mapped_v4(&b) => Self::V4([b[12], b[13], b[14], b[15]]),
            other => other,
        }
    }

    /// The 16-byte form: `V4` becomes mapped IPv4.
    pub fn widen(self) -> Self {
        match self {
            Self::V4(b) => Self::V6(Ipv4Addr::from(b).to_ipv6_mapped().octets()),
            other => other,
        }
    }

    /// Family the address represents; mapped IPv4 reports `V4`.
    pub fn version(&self) -> IpVersion {
        version_of_bytes(self.as_bytes())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self::V4(v4.octets()),
            IpAddr::V6(v6) => Self::V6(v6.octets()),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self::V4(ip.octets())
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Self::V6(ip.octets())
    }
}

impl From<Address> for IpAddr {
    fn from(addr: Address) -> Self {
        match addr {
            Address::V4(b) => IpAddr::V4(Ipv4Addr::from(b)),
            Address::V6(b) => IpAddr::V6(Ipv6Addr::from(b)),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_text(self.as_bytes(), VersionHint::Any))
    }
}

/// Parses to the real (narrowed) form, unlike [`parse_text`].
impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_ip_real(s).ok_or_else(|| Error::InvalidAddress(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Text parsing
// ---------------------------------------------------------------------------

/// Parse dotted-quad or colon-hex text into the canonical 16-byte form.
///
/// IPv4 text is stored mapped. Malformed text (signs, extra dots, octets
/// above 255, bad hextets, repeated `::`, wrong group counts, zones)
/// yields `None`.
pub fn parse_text(s: &str) -> Option<Address> {
    let ip: IpAddr = s.parse().ok()?;
    Some(match ip {
        IpAddr::V4(v4) => Address::V6(v4.to_ipv6_mapped().octets()),
        IpAddr::V6(v6) => Address::V6(v6.octets()),
    })
}

/// Canonical 16-byte form of `s`; alias of [`parse_text`].
pub fn to_ip(s: &str) -> Option<Address> {
    parse_text(s)
}

/// Real form of `s`: 4 bytes for IPv4 (including mapped text), 16 for IPv6.
pub fn to_ip_real(s: &str) -> Option<Address> {
    parse_text(s).map(Address::narrow)
}

// ---------------------------------------------------------------------------
// Version detection
// ---------------------------------------------------------------------------

/// Version of a byte buffer: `V4` for 4 bytes or mapped 16 bytes, `V6` for
/// other 16-byte values, `Invalid` otherwise.
pub fn version_of_bytes(bytes: &[u8]) -> IpVersion {
    match narrow(bytes).len() {
        IPV4_LEN => IpVersion::V4,
        IPV6_LEN => IpVersion::V6,
        _ => IpVersion::Invalid,
    }
}

/// Version of an address text. Mapped IPv4 text reports `V4`.
pub fn version_of(s: &str) -> IpVersion {
    parse_text(s).map_or(IpVersion::Invalid, |a| a.version())
}

/// Version of a valid address text decided by its separators: any `.`
/// means `V4`, otherwise `:` means `V6`.
pub fn version_by_contains(s: &str) -> IpVersion {
    if parse_text(s).is_none() {
        return IpVersion::Invalid;
    }
    if s.contains('.') {
        IpVersion::V4
    } else if s.contains(':') {
        IpVersion::V6
    } else {
        IpVersion::Invalid
    }
}

pub fn is_v4(s: &str) -> bool {
    version_of(s) == IpVersion::V4
}

pub fn is_v6(s: &str) -> bool {
    version_of(s) == IpVersion::V6
}

pub fn is_v4_bytes(bytes: &[u8]) -> bool {
    version_of_bytes(bytes) == IpVersion::V4
}

pub fn is_v6_bytes(bytes: &[u8]) -> bool {
    version_of_bytes(bytes) == IpVersion::V6
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
