use ipmatch::addr::{
    self, Address, IpVersion, VersionHint, bytes_to_ipv4_number, bytes_to_number, from_number,
    narrow, number_ipv4_to_str, parse_text, text_number_to_ip_str, to_ip, to_ip_real,
    to_ipv4_number, to_number_ipv4, to_str_ipv4, to_str_ipv6, to_text, to_text_ipv4_number,
    to_text_number, version_by_contains, version_of,
};
use ipmatch::cidr::{mask_ip_to_cidr, to_cidr_str, to_ip_mask_string};
use ipmatch::{Network, number_to_ip, parse_cidr, to_ip_string, to_number};
use num_bigint::BigUint;

#[test]
fn parse_then_render_ipv4() {
    let addr = parse_text("192.0.2.33").unwrap();
    assert_eq!(addr.len(), 16);
    assert_eq!(&addr.as_bytes()[..12], &addr::V4_IN_V6_PREFIX);
    assert_eq!(to_text(addr.as_bytes(), VersionHint::V4), "192.0.2.33");
    assert_eq!(to_text(addr.as_bytes(), VersionHint::Any), "192.0.2.33");
    assert_eq!(to_text(addr.as_bytes(), VersionHint::V6), "::ffff:c000:221");
    assert_eq!(to_ip_string(narrow(addr.as_bytes()), VersionHint::Any), "192.0.2.33");
}

#[test]
fn ipv6_text_compression() {
    let cases = [
        ("2001:0db8:0000:0000:0000:0000:0000:0001", "2001:db8::1"),
        ("2001:db8:0:1:0:0:0:1", "2001:db8:0:1::1"),
        ("2001:0:0:1:0:0:1:1", "2001::1:0:0:1:1"),
        ("2001:db8:1:1:1:1:0:1", "2001:db8:1:1:1:1:0:1"),
        ("::", "::"),
        ("0:0:0:0:0:0:0:1", "::1"),
        ("fe80::", "fe80::"),
    ];
    for (input, want) in cases {
        let addr = parse_text(input).unwrap();
        assert_eq!(to_text(addr.as_bytes(), VersionHint::V6), want, "input {input}");
    }
}

#[test]
fn render_odd_buffers() {
    assert_eq!(to_text(&[], VersionHint::Any), "");
    assert_eq!(to_text(&[1, 2, 3], VersionHint::Any), "?010203");
    assert_eq!(to_text(&[1, 2, 3], VersionHint::V4), "");
    assert_eq!(to_text(&[1, 2, 3, 4], VersionHint::V6), "");
}

#[test]
fn version_queries() {
    assert_eq!(version_of("10.0.0.1"), IpVersion::V4);
    assert_eq!(version_of("::ffff:10.0.0.1"), IpVersion::V4);
    assert_eq!(version_of("2001:db8::"), IpVersion::V6);
    assert_eq!(version_of("10.0.0.256"), IpVersion::Invalid);
    assert_eq!(version_by_contains("::ffff:10.0.0.1"), IpVersion::V4);
    assert_eq!(version_by_contains("::ffff:a00:1"), IpVersion::V6);
    assert_eq!(version_by_contains("10.0.0.1"), IpVersion::V4);
    assert_eq!(version_by_contains("nope"), IpVersion::Invalid);
    assert_eq!(IpVersion::V6.flag(), 6);
}

#[test]
fn canonical_and_real_forms() {
    assert_eq!(to_ip("1.2.3.4").unwrap().len(), 16);
    assert_eq!(to_ip_real("1.2.3.4").unwrap(), Address::V4([1, 2, 3, 4]));
    assert_eq!(to_ip_real("::ffff:1.2.3.4").unwrap(), Address::V4([1, 2, 3, 4]));
    assert_eq!(to_ip_real("::1").unwrap().len(), 16);
    assert!(to_ip("").is_none());
    assert_eq!("10.0.0.1".parse::<Address>().unwrap().to_string(), "10.0.0.1");
    assert_eq!(to_str_ipv4("2001:db8::"), "");
    assert_eq!(to_str_ipv6("10.0.0.1"), "::ffff:a00:1");
}

#[test]
fn number_scenarios() {
    assert_eq!(to_number("10.1.255.255"), BigUint::from(167_903_231u32));
    assert_eq!(to_number("::ffff:10.1.255.255"), BigUint::from(167_903_231u32));
    assert_eq!(to_ipv4_number("10.1.255.255"), 167_903_231);
    assert_eq!(to_ipv4_number("2001:db8::1"), 0);
    assert_eq!(to_number_ipv4("2001:db8::a01:ffff"), 167_903_231);
    assert_eq!(number_ipv4_to_str(167_903_231), "10.1.255.255");

    let mapped = parse_text("10.1.255.255").unwrap();
    assert!(bytes_to_number(mapped.as_bytes()) > BigUint::from(u32::MAX));
    assert_eq!(bytes_to_ipv4_number(mapped.as_bytes()), BigUint::from(167_903_231u32));
}

#[test]
fn number_to_address() {
    let n = BigUint::from(167_903_231u32);
    assert_eq!(number_to_ip(&n, VersionHint::Any), Some(vec![10, 1, 255, 255]));
    assert_eq!(number_to_ip(&n, VersionHint::V6).map(|v| v.len()), Some(16));
    assert_eq!(
        from_number(&BigUint::from(0u32), VersionHint::Any),
        Some(Address::V4([0, 0, 0, 0]))
    );
    let too_big = BigUint::from(1u32) << 128u32;
    assert_eq!(number_to_ip(&too_big, VersionHint::Any), None);
    let max_v6 = (BigUint::from(1u32) << 128u32) - 1u32;
    assert_eq!(
        from_number(&max_v6, VersionHint::Any).map(|a| a.to_string()).as_deref(),
        Some("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")
    );
}

#[test]
fn radix_text() {
    assert_eq!(to_text_number("10.1.255.255", 16), "a01ffff");
    assert_eq!(to_text_number("10.1.255.255", 10), "167903231");
    assert_eq!(to_text_number("10.1.255.255", 1), "");
    assert_eq!(to_text_number("10.1.255.255", 37), "");
    assert_eq!(to_text_ipv4_number("::1:a01:ffff", 10), "167903231");
    assert_eq!(text_number_to_ip_str("a01ffff", 16), "10.1.255.255");
    assert_eq!(text_number_to_ip_str("1", 2), "0.0.0.1");
    assert_eq!(text_number_to_ip_str("nope", 10), "");
}

#[test]
fn cidr_scenarios() {
    let (version, addr, network) = parse_cidr("192.0.2.1/24");
    assert_eq!(version, IpVersion::V4);
    assert_eq!(addr.as_deref(), Some("192.0.2.1"));
    assert_eq!(network.map(|n| n.to_string()).as_deref(), Some("192.0.2.0/24"));

    let net: Network = "2001:db8:abcd::1/48".parse().unwrap();
    assert_eq!(net.to_string(), "2001:db8:abcd::/48");
    assert_eq!(net.mask().to_string(), "ffffffffffff00000000000000000000");

    assert_eq!(
        to_ip_mask_string("192.168.192.1/20").as_deref(),
        Some("192.168.192.1/fffff000")
    );
    assert_eq!(mask_ip_to_cidr("192.168.192.1/fffff000").as_deref(), Some("192.168.192.1/20"));
    assert_eq!(to_cidr_str("10.*").as_deref(), Some("10.0.0.0/8"));
}
