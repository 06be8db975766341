// Client address extraction from proxy headers.
//
// Works on plain header values so any HTTP stack can call it:
// `X-Forwarded-For` (`client, proxy1, proxy2`), `X-Real-Ip`, and the
// peer's `host:port`.

use std::net::IpAddr;

use crate::addr::{Address, VersionHint, to_text};
use crate::classify::is_public;

fn parse_ip(s: &str) -> Option<Address> {
    s.trim().parse::<IpAddr>().ok().map(Address::from)
}

fn render(addr: Address) -> String {
    to_text(addr.as_bytes(), VersionHint::Any)
}

/// Host part of `host:port` or `[host]:port`. The port may be empty.
fn split_host(remote_addr: &str) -> Option<&str> {
    let remote_addr = remote_addr.trim();
    if let Some(rest) = remote_addr.strip_prefix('[') {
        let (host, port) = rest.split_once(']')?;
        return port.starts_with(':').then_some(host);
    }
    let (host, _) = remote_addr.rsplit_once(':')?;
    (!host.contains(':')).then_some(host)
}

/// Best-effort client address.
///
/// Tries the first `X-Forwarded-For` entry, then `X-Real-Ip`, then the
/// host part of `remote_addr`. The first one that parses wins. Mapped IPv4
/// is rendered dotted-quad.
pub fn client_ip(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    remote_addr: &str,
) -> Option<String> {
    let first_hop = forwarded_for.and_then(|h| h.split(',').next());
    first_hop
        .and_then(parse_ip)
        .or_else(|| real_ip.and_then(parse_ip))
        .or_else(|| split_host(remote_addr).and_then(parse_ip))
        .map(render)
}

/// Like [`client_ip`], but only public addresses qualify and every
/// `X-Forwarded-For` entry is considered, left to right.
pub fn client_public_ip(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    remote_addr: &str,
) -> Option<String> {
    let public = |addr: &Address| is_public(addr.as_bytes());

    forwarded_for
        .into_iter()
        .flat_map(|h| h.split(','))
        .filter_map(parse_ip)
        .find(public)
        .or_else(|| real_ip.and_then(parse_ip).filter(public))
        .or_else(|| split_host(remote_addr).and_then(parse_ip).filter(public))
        .map(render)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_first_hop() {
        assert_eq!(
            client_ip(Some(" 203.0.113.9 , 10.0.0.1"), Some("198.51.100.1"), "127.0.0.1:80")
                .as_deref(),
            Some("203.0.113.9")
        );
        // Only the first entry counts.
        assert_eq!(
            client_ip(Some("junk, 10.0.0.1"), None, "127.0.0.1:80").as_deref(),
            Some("127.0.0.1")
        );
    }

    #[test]
    fn fallback_chain() {
        assert_eq!(
            client_ip(None, Some(" 198.51.100.1 "), "127.0.0.1:80").as_deref(),
            Some("198.51.100.1")
        );
        assert_eq!(client_ip(None, None, "[::1]:8080").as_deref(), Some("::1"));
        assert_eq!(client_ip(Some(""), Some(""), "10.1.1.1:").as_deref(), Some("10.1.1.1"));
        assert_eq!(client_ip(None, None, "10.1.1.1"), None);
        assert_eq!(client_ip(None, None, "::1:80"), None);
        assert_eq!(client_ip(None, None, ""), None);
    }

    #[test]
    fn mapped_rendered_as_v4() {
        assert_eq!(
            client_ip(Some("::ffff:192.0.2.7"), None, "").as_deref(),
            Some("192.0.2.7")
        );
    }

    #[test]
    fn public_only() {
        assert_eq!(
            client_public_ip(Some("10.0.0.1, 192.168.1.1, 203.0.113.5"), None, "").as_deref(),
            Some("203.0.113.5")
        );
        assert_eq!(
            client_public_ip(Some("10.0.0.1"), Some("172.16.0.9"), "198.51.100.3:443").as_deref(),
            Some("198.51.100.3")
        );
        assert_eq!(client_public_ip(Some("10.0.0.1"), Some("127.0.0.1"), "[fe80::1]:1"), None);
    }
}
