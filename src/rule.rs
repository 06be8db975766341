// Compact rule encoding and the containment predicate.
//
// A compact rule packs a bare address or a CIDR into one opaque buffer so it
// can travel as a single repeated-bytes field:
//
//   len  4   bare IPv4 address
//   len  5   IPv4 CIDR: [ones (0..=32)] ++ 4-byte network
//   len 16   bare IPv6 address
//   len 17   IPv6 CIDR: [ones (0..=128)] ++ 16-byte network
//
// Encoders here always emit the minimal form: IPv4 is 4 bytes (never
// mapped) and networks are masked. That is the precondition of
// `batch::fast_match`.

use crate::addr::{
    Address, IPV4_LEN, IPV6_LEN, VersionHint, is_valid_len, narrow, parse_text, to_text,
};
use crate::cidr::{Network, parse_cidr};
use crate::error::{Error, Result};
use crate::mask::Mask;

/// Length of an IPv4 CIDR rule.
pub const V4_CIDR_LEN: usize = IPV4_LEN + 1;
/// Length of an IPv6 CIDR rule.
pub const V6_CIDR_LEN: usize = IPV6_LEN + 1;

/// True when `len` is one of the four valid rule lengths.
#[inline]
pub fn is_valid_rule_len(len: usize) -> bool {
    matches!(len, IPV4_LEN | V4_CIDR_LEN | IPV6_LEN | V6_CIDR_LEN)
}

// ---------------------------------------------------------------------------
// Containment
// ---------------------------------------------------------------------------

/// Whether `candidate` lies in the network `network/ones`.
///
/// Pass `ones = 8 * network.len()` to test a bare address.
///
/// `network` is always narrowed when it is mapped IPv4. `candidate` is
/// narrowed only when `coerce_to_v4` is set; without it a mapped 16-byte
/// candidate never matches a narrowed IPv4 network. Callers that cannot
/// vouch for the candidate's form should set the flag.
///
/// Returns false, never panics, for `ones` above the network width and for
/// buffers that are not 4 or 16 bytes.
pub fn contains(ones: u32, network: &[u8], candidate: &[u8], coerce_to_v4: bool) -> bool {
    let mask_len = network.len();
    if ones as usize > 8 * mask_len {
        return false;
    }
    if !is_valid_len(candidate.len()) || !is_valid_len(mask_len) {
        return false;
    }

    let candidate = if coerce_to_v4 {
        narrow(candidate)
    } else {
        candidate
    };
    let network = narrow(network);

    // Full-width prefix: plain equality.
    if ones as usize == 8 * mask_len && candidate.len() == network.len() {
        return network == candidate;
    }

    let Some(mut mask) = Mask::new(ones, 8 * mask_len as u32) else {
        return false;
    };
    if mask_len == IPV6_LEN && network.len() == IPV4_LEN {
        mask = mask.low_v4();
    }
    if candidate.len() != network.len() {
        return false;
    }
    mask.same_network(network, candidate)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Borrowed view of a compact rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactRule<'a> {
    /// Bare 4 or 16 byte address.
    Address(&'a [u8]),
    /// Prefix length and 4 or 16 byte network.
    Cidr { ones: u8, network: &'a [u8] },
}

impl<'a> CompactRule<'a> {
    /// Classify `bytes` by length. Invalid lengths yield `None`.
    pub fn decode(bytes: &'a [u8]) -> Option<Self> {
        match bytes.len() {
            IPV4_LEN | IPV6_LEN => Some(Self::Address(bytes)),
            V4_CIDR_LEN | V6_CIDR_LEN => Some(Self::Cidr {
                ones: bytes[0],
                network: &bytes[1..],
            }),
            _ => None,
        }
    }

    /// Containment test; see [`contains`] for `coerce_to_v4`.
    pub fn contains(&self, candidate: &[u8], coerce_to_v4: bool) -> bool {
        match *self {
            Self::Address(addr) => contains(8 * addr.len() as u32, addr, candidate, coerce_to_v4),
            Self::Cidr { ones, network } => {
                contains(u32::from(ones), network, candidate, coerce_to_v4)
            }
        }
    }

    /// Human-readable form: `a.b.c.d`, `x::y`, or `network/ones`.
    pub fn to_text(&self) -> String {
        match *self {
            Self::Address(addr) => to_text(addr, VersionHint::Any),
            Self::Cidr { ones, network } => {
                format!("{}/{}", to_text(network, VersionHint::Any), ones)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Minimal-form bare-address rule: mapped IPv4 is emitted as 4 bytes.
pub fn encode_address(addr: &Address) -> Vec<u8> {
    addr.narrow().to_vec()
}

/// Minimal-form CIDR rule: the network is masked, and a network that is
/// mapped IPv4 after masking is emitted as an IPv4 CIDR with the prefix
/// length reduced by 96.
pub fn encode_network(network: &Network) -> Vec<u8> {
    let base = network.network();
    let mut ones = network.ones();
    let base = match base {
        Address::V6(_) => {
            let narrowed = base.narrow();
            if narrowed.len() == IPV4_LEN {
                ones = ones.saturating_sub(96);
            }
            narrowed
        }
        v4 => v4,
    };

    let mut out = Vec::with_capacity(base.len() + 1);
    out.push(ones as u8);
    out.extend_from_slice(base.as_bytes());
    out
}

/// Encode address or CIDR text as a minimal-form rule.
pub fn encode_rule(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    if text.contains('/') {
        let (_, _, network) = parse_cidr(text);
        let network = network.ok_or_else(|| Error::InvalidCidr(text.to_string()))?;
        Ok(encode_network(&network))
    } else {
        let addr = parse_text(text).ok_or_else(|| Error::InvalidAddress(text.to_string()))?;
        Ok(encode_address(&addr))
    }
}

/// Text form of an encoded rule, `None` for invalid lengths.
pub fn rule_to_text(bytes: &[u8]) -> Option<String> {
    CompactRule::decode(bytes).map(|r| r.to_text())
}
