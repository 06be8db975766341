// Text rendering of address buffers.
//
// IPv6 output uses lowercase hex groups without leading zeros and replaces
// the longest run of zero groups with `::`. A run must cover at least two
// groups; the first of several equally long runs wins.

use std::fmt::Write;
use std::net::Ipv4Addr;

use super::codec::{narrow, parse_text};
use super::version::{IPV4_LEN, IPV6_LEN, VersionHint};

/// Render `bytes` as address text.
///
/// - `V4`: dotted-quad if the buffer is (or maps) IPv4, else empty.
/// - `V6`: colon-hex if the buffer is 16 bytes, else empty. Mapped IPv4 is
///   rendered as plain hextets (`::ffff:a00:1`).
/// - `Any`: IPv4 when representable, else IPv6, else `"?"` followed by the
///   hex of the raw bytes.
///
/// An empty buffer always renders as an empty string.
pub fn to_text(bytes: &[u8], hint: VersionHint) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    match hint {
        VersionHint::V4 => ipv4_string(bytes),
        VersionHint::V6 => ipv6_string(bytes),
        VersionHint::Any => {
            let v4 = ipv4_string(bytes);
            if !v4.is_empty() {
                return v4;
            }
            if bytes.len() != IPV6_LEN {
                return format!("?{}", hex::encode(bytes));
            }
            ipv6_string(bytes)
        }
    }
}

/// Parse `s` and render it with `hint`. Invalid text renders empty.
pub fn to_str_ip(s: &str, hint: VersionHint) -> String {
    parse_text(s).map_or_else(String::new, |a| to_text(a.as_bytes(), hint))
}

/// IPv4 text of `s`, or empty if `s` is not (mapped) IPv4.
pub fn to_str_ipv4(s: &str) -> String {
    to_str_ip(s, VersionHint::V4)
}

/// IPv6 text of `s`; IPv4 input is rendered in its mapped 16-byte form.
pub fn to_str_ipv6(s: &str) -> String {
    to_str_ip(s, VersionHint::V6)
}

fn ipv4_string(bytes: &[u8]) -> String {
    let p4 = narrow(bytes);
    if p4.len() != IPV4_LEN {
        return String::new();
    }
    Ipv4Addr::new(p4[0], p4[1], p4[2], p4[3]).to_string()
}

fn ipv6_string(p: &[u8]) -> String {
    if p.len() != IPV6_LEN {
        return String::new();
    }

    // Longest run of zero groups, as [e0, e1) byte offsets.
    let mut e0 = usize::MAX;
    let mut e1 = usize::MAX;
    let mut best = 0;
    let mut i = 0;
    while i < IPV6_LEN {
        let mut j = i;
        while j < IPV6_LEN && p[j] == 0 && p[j + 1] == 0 {
            j += 2;
        }
        if j > i && j - i > best {
            best = j - i;
            e0 = i;
            e1 = j;
            i = j;
        }
        i += 2;
    }
    if best <= 2 {
        e0 = usize::MAX;
        e1 = usize::MAX;
    }

    let mut out = String::with_capacity(39);
    let mut i = 0;
    while i < IPV6_LEN {
        if i == e0 {
            out.push_str("::");
            i = e1;
            if i >= IPV6_LEN {
                break;
            }
        } else if i > 0 {
            out.push(':');
        }
        let group = u16::from_be_bytes([p[i], p[i + 1]]);
        let _ = write!(out, "{group:x}");
        i += 2;
    }
    out
}
