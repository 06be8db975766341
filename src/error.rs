// Crate error type.
//
// The matching core never fails: malformed input is a non-match or an empty
// result. This type covers the places where a typed error is expected by the
// caller, such as `FromStr` impls and rule-list loading.

use std::io;

use thiserror::Error;

/// Errors surfaced by the typed parsing entry points and the CLI.
#[derive(Debug, Error)]
pub enum Error {
    /// Text that is not a valid IPv4 or IPv6 address.
    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// Text that is not valid `address/prefix-length` notation.
    #[error("invalid CIDR: {0:?}")]
    InvalidCidr(String),

    /// Prefix length outside `0..=bits` for the address family.
    #[error("prefix length {ones} out of range for a {bits}-bit address")]
    InvalidPrefix { ones: u32, bits: u32 },

    /// A compact rule or rule-list entry that cannot be encoded.
    #[error("invalid rule: {0:?}")]
    InvalidRule(String),

    /// Numeric text that does not parse in the requested radix, or needs
    /// more than 16 bytes.
    #[error("invalid address number: {0:?}")]
    InvalidNumber(String),

    /// Radix outside `2..=36`.
    #[error("radix {0} out of range (2..=36)")]
    InvalidRadix(u32),

    /// I/O error while reading a rule list.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
