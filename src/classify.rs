// Address classification and selection over caller-supplied address lists.
//
// Nothing here touches the network stack. Callers enumerate their own
// interface addresses and hand them in.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use bitflags::bitflags;

use crate::addr::{Address, IPV4_LEN, IPV6_LEN, VersionHint, is_valid_len, narrow, to_text};

bitflags! {
    /// Categories an address can fall into. One address can carry several.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AddrKind: u16 {
        /// `0.0.0.0` or `::`
        const UNSPECIFIED = 1 << 0;
        /// `127.0.0.0/8` or `::1`
        const LOOPBACK = 1 << 1;
        /// RFC 1918 IPv4 or RFC 4193 `fc00::/7`
        const PRIVATE = 1 << 2;
        /// `224.0.0.0/4` or `ff00::/8`
        const MULTICAST = 1 << 3;
        /// `ff01::/16` (IPv6 only)
        const INTERFACE_LOCAL_MULTICAST = 1 << 4;
        /// `224.0.0.0/24` or `ff02::/16`
        const LINK_LOCAL_MULTICAST = 1 << 5;
        /// `169.254.0.0/16` or `fe80::/10`
        const LINK_LOCAL_UNICAST = 1 << 6;
        /// Anything routable that is not one of the special blocks above
        /// (private addresses are still global unicast).
        const GLOBAL_UNICAST = 1 << 7;

        const LOOPBACK_AND_LINK_LOCAL_UNICAST =
            Self::LOOPBACK.bits() | Self::LINK_LOCAL_UNICAST.bits();
    }
}

/// Lowercase names joined with `|`, e.g. `private|global_unicast`.
impl fmt::Display for AddrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (name, flag) in self.iter_names() {
            // Composite names would repeat their members.
            if flag == Self::LOOPBACK_AND_LINK_LOCAL_UNICAST {
                continue;
            }
            if !first {
                f.write_str("|")?;
            }
            f.write_str(&name.to_ascii_lowercase())?;
            first = false;
        }
        Ok(())
    }
}

/// Every category `bytes` belongs to. Buffers that are not 4 or 16 bytes
/// get the empty set.
pub fn kind_of(bytes: &[u8]) -> AddrKind {
    let mut kind = AddrKind::empty();
    let ip = narrow(bytes);
    match ip.len() {
        IPV4_LEN => {
            let (a, b, c) = (ip[0], ip[1], ip[2]);
            if ip == [0, 0, 0, 0] {
                kind |= AddrKind::UNSPECIFIED;
            }
            if a == 127 {
                kind |= AddrKind::LOOPBACK;
            }
            if a == 10 || (a == 172 && b & 0xF0 == 16) || (a == 192 && b == 168) {
                kind |= AddrKind::PRIVATE;
            }
            if a & 0xF0 == 0xE0 {
                kind |= AddrKind::MULTICAST;
            }
            if a == 224 && b == 0 && c == 0 {
                kind |= AddrKind::LINK_LOCAL_MULTICAST;
            }
            if a == 169 && b == 254 {
                kind |= AddrKind::LINK_LOCAL_UNICAST;
            }
            if ip != [255, 255, 255, 255] && is_global(kind) {
                kind |= AddrKind::GLOBAL_UNICAST;
            }
        }
        IPV6_LEN => {
            if ip.iter().all(|&b| b == 0) {
                kind |= AddrKind::UNSPECIFIED;
            }
            if ip[..15].iter().all(|&b| b == 0) && ip[15] == 1 {
                kind |= AddrKind::LOOPBACK;
            }
            if ip[0] & 0xFE == 0xFC {
                kind |= AddrKind::PRIVATE;
            }
            if ip[0] == 0xFF {
                kind |= AddrKind::MULTICAST;
                match ip[1] & 0x0F {
                    0x01 => kind |= AddrKind::INTERFACE_LOCAL_MULTICAST,
                    0x02 => kind |= AddrKind::LINK_LOCAL_MULTICAST,
                    _ => {}
                }
            }
            if ip[0] == 0xFE && ip[1] & 0xC0 == 0x80 {
                kind |= AddrKind::LINK_LOCAL_UNICAST;
            }
            if is_global(kind) {
                kind |= AddrKind::GLOBAL_UNICAST;
            }
        }
        _ => {}
    }
    kind
}

fn is_global(kind: AddrKind) -> bool {
    !kind.intersects(
        AddrKind::UNSPECIFIED
            | AddrKind::LOOPBACK
            | AddrKind::MULTICAST
            | AddrKind::LINK_LOCAL_UNICAST,
    )
}

pub fn is_private(bytes: &[u8]) -> bool {
    kind_of(bytes).contains(AddrKind::PRIVATE)
}

/// Not private, loopback, link-local unicast or link-local multicast.
///
/// Invalid buffers are not public.
pub fn is_public(bytes: &[u8]) -> bool {
    if !is_valid_len(bytes.len()) {
        return false;
    }
    !kind_of(bytes).intersects(
        AddrKind::PRIVATE
            | AddrKind::LOOPBACK
            | AddrKind::LINK_LOCAL_UNICAST
            | AddrKind::LINK_LOCAL_MULTICAST,
    )
}

fn v4_of(addr: &IpAddr) -> Option<Ipv4Addr> {
    match addr {
        IpAddr::V4(v4) => Some(*v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

/// Text of every address matching `hint` that carries none of the `ignore`
/// kinds, in input order.
///
/// Mapped IPv4 counts as IPv4 for the hint and is rendered dotted-quad.
pub fn filter_addrs(addrs: &[IpAddr], hint: VersionHint, ignore: AddrKind) -> Vec<String> {
    addrs
        .iter()
        .filter(|ip| {
            let is_v4 = v4_of(ip).is_some();
            match hint {
                VersionHint::V4 => is_v4,
                VersionHint::V6 => !is_v4,
                VersionHint::Any => true,
            }
        })
        .filter_map(|ip| {
            let addr = Address::from(*ip);
            if kind_of(addr.as_bytes()).intersects(ignore) {
                return None;
            }
            Some(to_text(addr.as_bytes(), VersionHint::Any))
        })
        .collect()
}

/// The first IPv4 address that is neither loopback nor link-local unicast;
/// typically the one used for outbound traffic.
pub fn first_outbound_v4(addrs: &[IpAddr]) -> Option<Ipv4Addr> {
    addrs.iter().filter_map(v4_of).find(|v4| {
        !kind_of(&v4.octets()).intersects(AddrKind::LOOPBACK_AND_LINK_LOCAL_UNICAST)
    })
}

/// The first private, non-loopback IPv4 address.
pub fn first_private_v4(addrs: &[IpAddr]) -> Option<Ipv4Addr> {
    private_v4_iter(addrs).next()
}

/// Every private, non-loopback IPv4 address, in input order.
pub fn private_v4_all(addrs: &[IpAddr]) -> Vec<Ipv4Addr> {
    private_v4_iter(addrs).collect()
}

fn private_v4_iter(addrs: &[IpAddr]) -> impl Iterator<Item = Ipv4Addr> + '_ {
    addrs.iter().filter_map(v4_of).filter(|v4| {
        let kind = kind_of(&v4.octets());
        kind.contains(AddrKind::PRIVATE) && !kind.contains(AddrKind::LOOPBACK)
    })
}
