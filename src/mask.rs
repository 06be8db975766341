// Prefix masks.
//
// A mask is a left-aligned run of one-bits over a 32 or 128 bit address.
// `Mask` lives on the stack so the batch matchers can build one per rule
// without allocating.

use std::fmt;

use crate::addr::{Address, IPV4_LEN, IPV6_LEN};

/// Prefix mask for a 4-byte or 16-byte address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask {
    bytes: [u8; IPV6_LEN],
    len: u8,
}

impl Mask {
    /// Mask of `ones` leading one-bits over `total_bits`.
    ///
    /// `total_bits` must be 32 or 128 and `ones` at most `total_bits`;
    /// anything else yields `None`, which callers treat as "no match".
    #[inline]
    pub fn new(ones: u32, total_bits: u32) -> Option<Self> {
        if (total_bits != 32 && total_bits != 128) || ones > total_bits {
            return None;
        }
        let len = (total_bits / 8) as usize;
        let mut bytes = [0u8; IPV6_LEN];
        let mut n = ones;
        for b in bytes.iter_mut().take(len) {
            if n >= 8 {
                *b = 0xFF;
                n -= 8;
            } else {
                *b = !(0xFFu8 >> n);
                n = 0;
            }
        }
        Some(Self {
            bytes,
            len: len as u8,
        })
    }

    /// Mask over 32 bits when `total_bits` is 32, else over 128 bits, with
    /// `ones` clamped to the width.
    pub(crate) fn saturating(ones: u32, total_bits: u32) -> Self {
        let total_bits = if total_bits == 32 { 32 } else { 128 };
        match Self::new(ones.min(total_bits), total_bits) {
            Some(m) => m,
            None => Self {
                bytes: [0u8; IPV6_LEN],
                len: (total_bits / 8) as u8,
            },
        }
    }

    /// Wrap raw mask bytes (4 or 16). Non-contiguous masks are accepted.
    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        if raw.len() != IPV4_LEN && raw.len() != IPV6_LEN {
            return None;
        }
        let mut bytes = [0u8; IPV6_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Some(Self {
            bytes,
            len: raw.len() as u8,
        })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Width in bits (32 or 128).
    pub fn bits(&self) -> u32 {
        8 * self.len as u32
    }

    /// Number of one-bits.
    pub fn ones(&self) -> u32 {
        self.as_bytes().iter().map(|b| b.count_ones()).sum()
    }

    /// The last 4 bytes of a 16-byte mask, aligned with a narrowed IPv4
    /// network. A 4-byte mask is returned unchanged.
    #[inline]
    pub fn low_v4(&self) -> Self {
        if self.len() != IPV6_LEN {
            return *self;
        }
        let mut bytes = [0u8; IPV6_LEN];
        bytes[..IPV4_LEN].copy_from_slice(&self.bytes[12..IPV6_LEN]);
        Self {
            bytes,
            len: IPV4_LEN as u8,
        }
    }

    /// `addr & mask`. `None` when the lengths differ.
    pub fn apply(&self, addr: &[u8]) -> Option<Address> {
        if addr.len() != self.len() {
            return None;
        }
        let mut out = [0u8; IPV6_LEN];
        for (o, (a, m)) in out.iter_mut().zip(addr.iter().zip(self.as_bytes())) {
            *o = a & m;
        }
        Address::from_slice(&out[..self.len()])
    }

    /// True when `a` and `b` agree on every masked bit. Both must have the
    /// mask's length.
    #[inline]
    pub fn same_network(&self, a: &[u8], b: &[u8]) -> bool {
        let m = self.as_bytes();
        if a.len() != m.len() || b.len() != m.len() {
            return false;
        }
        a.iter()
            .zip(b)
            .zip(m)
            .all(|((x, y), m)| x & m == y & m)
    }
}

/// Lowercase hex of the mask bytes, e.g. `ffffff00`.
impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_bytes()))
    }
}

/// Mask of `ones` leading one-bits over `total_bits` (32 or 128).
pub fn prefix_mask(ones: u32, total_bits: u32) -> Option<Mask> {
    Mask::new(ones, total_bits)
}

/// Byte-wise AND of `addr` and `mask`. `None` on length mismatch.
pub fn apply(addr: &[u8], mask: &[u8]) -> Option<Vec<u8>> {
    if addr.len() != mask.len() {
        return None;
    }
    Some(addr.iter().zip(mask).map(|(a, m)| a & m).collect())
}
