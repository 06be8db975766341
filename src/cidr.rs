// CIDR notation: `address/prefix-length`.
//
// The prefix bound is the width of the address as written: 32 for
// dotted-quad text, 128 for any colon-hex text, including mapped IPv4.
// So `192.168.192.1/20` and `::ffff:192.168.192.1/116` describe the same
// block with different nominal prefix lengths. The two are not unified.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::addr::{Address, IPV6_LEN, IpVersion, VersionHint, to_text, version_of_bytes};
use crate::error::Error;
use crate::mask::Mask;
use crate::rule;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// A network number and prefix length.
///
/// Invariant: `ones <= 8 * addr.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Network {
    addr: Address,
    ones: u8,
}

impl Network {
    /// Build a network without masking `addr`. `None` if `ones` exceeds the
    /// address width.
    pub fn new(addr: Address, ones: u32) -> Option<Self> {
        if ones > addr.bits() {
            return None;
        }
        Some(Self {
            addr,
            ones: ones as u8,
        })
    }

    /// Build a network whose base is `addr` masked to `ones` bits.
    pub fn masked(addr: Address, ones: u32) -> Option<Self> {
        let mask = Mask::new(ones, addr.bits())?;
        let base = mask.apply(addr.as_bytes())?;
        Self::new(base, ones)
    }

    /// Base address as stored.
    pub fn addr(&self) -> Address {
        self.addr
    }

    pub fn ones(&self) -> u32 {
        u32::from(self.ones)
    }

    pub fn bits(&self) -> u32 {
        self.addr.bits()
    }

    /// Prefix mask over the stored width.
    pub fn mask(&self) -> Mask {
        Mask::saturating(self.ones(), self.bits())
    }

    /// Base masked to the prefix length.
    pub fn network(&self) -> Address {
        self.mask().apply(self.addr.as_bytes()).unwrap_or(self.addr)
    }

    /// Version of the base; a mapped IPv4 base reports `V4`.
    pub fn version(&self) -> IpVersion {
        version_of_bytes(self.addr.as_bytes())
    }

    /// Containment test. The candidate is narrowed, so 4-byte and mapped
    /// 16-byte IPv4 candidates behave the same.
    pub fn contains(&self, candidate: &[u8]) -> bool {
        rule::contains(self.ones(), self.addr.as_bytes(), candidate, true)
    }
}

/// `network/ones`. A 128-bit network keeps its colon-hex form, even when it
/// holds mapped IPv4, so the prefix length stays in range on re-parse.
impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.network();
        let hint = match base {
            Address::V4(_) => VersionHint::V4,
            Address::V6(_) => VersionHint::V6,
        };
        write!(f, "{}/{}", to_text(base.as_bytes(), hint), self.ones)
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((_, network)) = parse_parts(s) {
            return Ok(network);
        }
        // Tell an out-of-range prefix apart from malformed text.
        if let Some((addr, ones)) = s.split_once('/') {
            let addr = addr.parse::<IpAddr>().ok().map(Address::from);
            if let (Some(addr), Some(ones)) = (addr, parse_prefix_len(ones)) {
                return Err(Error::InvalidPrefix {
                    ones,
                    bits: addr.bits(),
                });
            }
        }
        Err(Error::InvalidCidr(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `s` as CIDR notation.
///
/// Returns the version of the address (mapped IPv4 reports `V4`), the
/// address text, and the network implied by address and prefix length.
/// `parse_cidr("192.0.2.1/24")` gives `(V4, "192.0.2.1", 192.0.2.0/24)`.
///
/// Any failure yields `(Invalid, None, None)`.
pub fn parse_cidr(s: &str) -> (IpVersion, Option<String>, Option<Network>) {
    match parse_parts(s) {
        Some((addr, network)) => (
            version_of_bytes(addr.as_bytes()),
            Some(to_text(addr.as_bytes(), VersionHint::Any)),
            Some(network),
        ),
        None => (IpVersion::Invalid, None, None),
    }
}

fn parse_parts(s: &str) -> Option<(Address, Network)> {
    let (addr_text, ones_text) = s.split_once('/')?;
    let ones = parse_prefix_len(ones_text)?;
    let ip: IpAddr = addr_text.parse().ok()?;
    let addr = Address::from(ip);
    let network = Network::masked(addr, ones)?;
    Some((addr, network))
}

/// Decimal digits only: no sign, no whitespace.
fn parse_prefix_len(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ---------------------------------------------------------------------------
// Mask text helpers
// ---------------------------------------------------------------------------

/// Mask bytes of a CIDR, empty if invalid.
pub fn mask_bytes(cidr: &str) -> Vec<u8> {
    parse_cidr(cidr)
        .2
        .map_or_else(Vec::new, |n| n.mask().as_bytes().to_vec())
}

/// Hex mask of a CIDR, empty if invalid.
pub fn mask_string(cidr: &str) -> String {
    parse_cidr(cidr).2.map_or_else(String::new, |n| n.mask().to_string())
}

/// `address/hex-mask` for a CIDR.
///
/// An IPv4 address written in 16-byte form carries a 16-byte mask; only its
/// last 4 bytes are emitted so the mask lines up with the dotted-quad text.
pub fn to_ip_mask_string(cidr: &str) -> Option<String> {
    let (version, addr, network) = parse_cidr(cidr);
    let (addr, network) = (addr?, network?);
    let mut mask = network.mask();
    if version == IpVersion::V4 && mask.len() == IPV6_LEN {
        mask = mask.low_v4();
    }
    Some(format!("{addr}/{mask}"))
}

/// Convert `ip/hex-mask` (8 or 32 hex digits) to `ip/ones`, where `ones` is
/// the number of set bits in the mask. The address part is passed through.
pub fn mask_ip_to_cidr(ip_mask: &str) -> Option<String> {
    let mut parts = ip_mask.split('/');
    let (ip, mask) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || (mask.len() != 8 && mask.len() != 32) {
        return None;
    }
    let mask = hex::decode(mask).ok()?;
    let ones: u32 = mask.iter().map(|b| b.count_ones()).sum();
    Some(format!("{ip}/{ones}"))
}

/// Convert a fuzzy IPv4 pattern to CIDR text.
///
/// Two to four dotted groups; missing trailing groups count as `0`. The
/// first `*` decides the prefix length and every `*` becomes `0`:
///
/// ```text
/// 192.168.1.1  -> 192.168.1.1/32
/// 192.168.1.*  -> 192.168.1.0/24
/// 192.*        -> 192.0.0.0/8
/// *.*          -> 0.0.0.0/0
/// ```
pub fn to_cidr_str(fuzzy: &str) -> Option<String> {
    let groups: Vec<&str> = fuzzy.split('.').collect();
    if groups.len() <= 1 || groups.len() > 4 {
        return None;
    }

    let mut octets = [0u8; 4];
    let mut wildcard = None;
    for (i, g) in groups.iter().enumerate() {
        if *g == "*" {
            wildcard.get_or_insert(i);
            continue;
        }
        if g.is_empty() || !g.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        octets[i] = g.parse().ok()?;
    }
    let ones = wildcard.map_or(32, |pos| 8 * pos);

    let [a, b, c, d] = octets;
    Some(format!("{a}.{b}.{c}.{d}/{ones}"))
}
