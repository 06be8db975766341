#![no_main]
use ipmatch::cidr::{mask_ip_to_cidr, parse_cidr, to_cidr_str, to_ip_mask_string};
use ipmatch::rule::encode_rule;
use ipmatch::{Network, in_cidr_str, in_range, parse_text};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Text parsers must reject garbage without panicking.
    let _ = parse_text(&text);
    let _ = to_cidr_str(&text);
    let _ = mask_ip_to_cidr(&text);
    let _ = to_ip_mask_string(&text);

    let (version, addr, network) = parse_cidr(&text);
    assert_eq!(version.is_valid(), network.is_some());
    assert_eq!(addr.is_some(), network.is_some());
    if let Some(network) = network {
        // Display output parses back to the same masked network.
        let again: Network = network.to_string().parse().unwrap();
        assert_eq!(again.network(), network.network());
        assert!(encode_rule(&text).is_ok());
    }

    if let Some((left, right)) = text.split_once(' ') {
        let _ = in_cidr_str(left, right);
        let _ = in_range(left, right, left);
    }
});
