// Address representation and conversion.
//
// Three views of the same address: text (dotted-quad or colon-hex), fixed
// width bytes (4 or 16, big-endian), and an arbitrary-precision integer.
//
// # Modules
//
// - `version`: IPv4/IPv6/invalid tag and the formatting/width hint
// - `codec`: `Address` value type, text parsing, mapped-IPv4 narrowing
// - `format`: text rendering with IPv6 zero-run compression
// - `number`: numeric forms (`BigUint`, `u32`, radix text)

pub mod codec;
pub mod format;
pub mod number;
pub mod version;

pub use codec::{
    Address, is_mapped_v4, is_v4, is_v4_bytes, is_v6, is_v6_bytes, is_valid_len, narrow,
    parse_text, to_ip, to_ip_real, version_by_contains, version_of, version_of_bytes,
};
pub use format::{to_str_ip, to_str_ipv4, to_str_ipv6, to_text};
pub use number::{
    MAX_RADIX, MIN_RADIX, address_to_number, bytes_to_ipv4_number, bytes_to_number, from_number,
    number_ipv4_to_str, number_to_ip, parse_number, text_number_to_ip_str, to_ipv4_number,
    to_number, to_number_ipv4, to_text_ipv4_number, to_text_number,
};
pub use version::{IPV4_LEN, IPV6_LEN, IpVersion, V4_IN_V6_PREFIX, VersionHint};
