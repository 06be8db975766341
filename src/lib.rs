//! ipmatch: IP address codec and CIDR / range / rule-list membership.
//!
//! The crate provides:
//! - Address parsing, rendering and numeric conversion (`addr`)
//! - Prefix masks and CIDR notation (`mask`, `cidr`)
//! - Range and single-network membership (`range`)
//! - Compact byte rules and first-match scanning over rule lists
//!   (`rule`, `batch`)
//! - Address classification and client-address helpers (`classify`,
//!   `client`, `cache`)
//! - An optional CLI (`cli` feature)
//!
//! IPv4 addresses can appear as 4 bytes or mapped into 16
//! (`::ffff:a.b.c.d`). Parsing always yields the 16-byte form; every
//! comparison treats the two as the same address unless documented
//! otherwise (see [`batch::fast_match`]).
//!
//! # Quick Start
//!
//! ```
//! use ipmatch::batch::RuleSet;
//!
//! let rules = RuleSet::from_lines("10.0.0.0/8\n192.168.1.1\n2001:db8::/32\n").unwrap();
//! assert_eq!(rules.first_match(&[10, 20, 30, 40]), Some(0));
//! assert_eq!(rules.fast_first_match(&[192, 168, 1, 1]), Some(1));
//!
//! assert!(ipmatch::in_cidr_str("192.168.0.0/16", "::ffff:192.168.7.7"));
//! assert_eq!(ipmatch::to_number("10.1.255.255").to_string(), "167903231");
//! ```

pub mod addr;
pub mod batch;
pub mod cache;
pub mod cidr;
pub mod classify;
pub mod client;
pub mod error;
pub mod mask;
pub mod range;
pub mod rule;

#[cfg(feature = "cli")]
pub mod cli;

pub use addr::{
    Address, IpVersion, VersionHint, number_to_ip, parse_text, to_number, to_text as to_ip_string,
};
pub use batch::{RuleSet, fast_in_range_mixed, in_range_mixed};
pub use cidr::{Network, parse_cidr};
pub use error::{Error, Result};
pub use range::{in_cidr_str, in_range};
