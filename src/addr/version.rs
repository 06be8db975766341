// Address family tags.

use std::fmt;

/// Byte length of an IPv4 address.
pub const IPV4_LEN: usize = 4;
/// Byte length of an IPv6 address.
pub const IPV6_LEN: usize = 16;

/// Leading 12 bytes of an IPv4 address stored in 16 bytes (`::ffff:a.b.c.d`).
pub const V4_IN_V6_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF];

/// Version of a parsed or inspected address.
///
/// A 16-byte value carrying a mapped IPv4 address reports [`IpVersion::V4`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IpVersion {
    #[default]
    Invalid,
    V4,
    V6,
}

impl IpVersion {
    /// True for `V4` and `V6`.
    pub fn is_valid(self) -> bool {
        matches!(self, Self::V4 | Self::V6)
    }

    /// Numeric flag: 0, 4 or 6.
    pub fn flag(self) -> u8 {
        match self {
            Self::Invalid => 0,
            Self::V4 => 4,
            Self::V6 => 6,
        }
    }

    /// Address width in bits, 0 for `Invalid`.
    pub fn bits(self) -> u32 {
        match self {
            Self::Invalid => 0,
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::V4 => "ipv4",
            Self::V6 => "ipv6",
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested output family for rendering and number conversion.
///
/// `Any` is the best-effort mode: IPv4 when representable, otherwise IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VersionHint {
    V4,
    V6,
    #[default]
    Any,
}

impl From<IpVersion> for VersionHint {
    fn from(v: IpVersion) -> Self {
        match v {
            IpVersion::V4 => Self::V4,
            IpVersion::V6 => Self::V6,
            IpVersion::Invalid => Self::Any,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_bits() {
        assert_eq!(IpVersion::V4.flag(), 4);
        assert_eq!(IpVersion::V6.flag(), 6);
        assert_eq!(IpVersion::Invalid.flag(), 0);
        assert_eq!(IpVersion::V4.bits(), 32);
        assert_eq!(IpVersion::V6.bits(), 128);
        assert!(!IpVersion::Invalid.is_valid());
        assert!(IpVersion::V6.is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(IpVersion::V4.to_string(), "ipv4");
        assert_eq!(IpVersion::V6.to_string(), "ipv6");
        assert_eq!(IpVersion::Invalid.to_string(), "invalid");
    }

    #[test]
    fn invalid_version_is_best_effort_hint() {
        assert_eq!(VersionHint::from(IpVersion::Invalid), VersionHint::Any);
        assert_eq!(VersionHint::from(IpVersion::V4), VersionHint::V4);
        assert_eq!(VersionHint::default(), VersionHint::Any);
    }
}
