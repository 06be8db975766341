// First-match scanning of compact rule lists.
//
// Two variants share one contract: scan the rules in order and report the
// index of the first rule that covers the query.
//
// - `fast_match` trusts its input. Rules and query must already be in
//   minimal form (IPv4 as 4 bytes, never mapped into 16). No narrowing or
//   length coercion is done, which keeps the loop tight.
// - `general_match` narrows the query once and routes every rule through
//   `rule::contains`, so mapped IPv4 rules and queries are fine.
//
// Malformed rules are skipped, never reported.

use log::trace;

use crate::addr::{IPV4_LEN, IPV6_LEN, VersionHint, is_valid_len, narrow, parse_text, to_text};
use crate::cidr::parse_cidr;
use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::rule::{self, V4_CIDR_LEN, V6_CIDR_LEN, encode_rule, is_valid_rule_len};

// ---------------------------------------------------------------------------
// Fast variant
// ---------------------------------------------------------------------------

/// First rule covering `query`, for minimal-form input.
///
/// Per rule: same length as the query means exact byte equality; one byte
/// longer means `[ones] ++ network` compared under the prefix mask; any
/// other length is skipped. A 4-byte query never matches 16/17-byte rules
/// and vice versa.
///
/// Passing mapped 16-byte IPv4 rules or queries is a caller error: they are
/// compared as IPv6 and will miss their IPv4 counterparts.
pub fn fast_match<R: AsRef<[u8]>>(rules: &[R], query: &[u8]) -> Option<usize> {
    let q_len = query.len();
    if !is_valid_len(q_len) {
        return None;
    }

    for (index, rule) in rules.iter().enumerate() {
        let rule = rule.as_ref();
        let r_len = rule.len();
        if r_len == q_len {
            if rule == query {
                return Some(index);
            }
        } else if r_len == q_len + 1 {
            let Some(mask) = Mask::new(u32::from(rule[0]), 8 * q_len as u32) else {
                continue;
            };
            if mask.same_network(&rule[1..], query) {
                return Some(index);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// General variant
// ---------------------------------------------------------------------------

/// First rule covering `query`, tolerating mapped IPv4 anywhere.
///
/// The query (4 or 16 bytes) is narrowed once. Rules of 5 or 17 bytes are
/// CIDRs, everything else is tried as a bare address.
pub fn general_match<R: AsRef<[u8]>>(rules: &[R], query: &[u8]) -> Option<usize> {
    if !is_valid_len(query.len()) {
        return None;
    }
    let query = narrow(query);

    for (index, rule) in rules.iter().enumerate() {
        let rule = rule.as_ref();
        let hit = match rule.len() {
            V4_CIDR_LEN | V6_CIDR_LEN => {
                rule::contains(u32::from(rule[0]), &rule[1..], query, false)
            }
            IPV4_LEN | IPV6_LEN => rule::contains(8 * rule.len() as u32, rule, query, false),
            len => {
                trace!("skipping rule {index}: invalid length {len}");
                false
            }
        };
        if hit {
            return Some(index);
        }
    }
    None
}

fn index_pair(found: Option<usize>) -> (i64, bool) {
    match found {
        Some(index) => (index as i64, true),
        None => (-1, false),
    }
}

/// [`fast_match`] as `(index, true)` or `(-1, false)`.
pub fn fast_in_range_mixed<R: AsRef<[u8]>>(rules: &[R], candidate: &[u8]) -> (i64, bool) {
    index_pair(fast_match(rules, candidate))
}

/// [`general_match`] as `(index, true)` or `(-1, false)`.
pub fn in_range_mixed<R: AsRef<[u8]>>(rules: &[R], candidate: &[u8]) -> (i64, bool) {
    index_pair(general_match(rules, candidate))
}

// ---------------------------------------------------------------------------
// Text rules
// ---------------------------------------------------------------------------

/// First textual rule (CIDR or bare address) covering `candidate`.
///
/// Rules are parsed on every call; prefer [`RuleSet`] for repeated use.
/// Unparseable rules are skipped.
pub fn match_text_rules<S: AsRef<str>>(rules: &[S], candidate: &[u8]) -> Option<usize> {
    if !is_valid_len(candidate.len()) {
        return None;
    }
    let candidate = narrow(candidate);

    rules.iter().position(|rule| {
        let rule = rule.as_ref();
        if rule.contains('/') {
            match parse_cidr(rule) {
                (version, _, Some(network)) if version.is_valid() => network.contains(candidate),
                _ => false,
            }
        } else {
            parse_text(rule).is_some_and(|addr| narrow(addr.as_bytes()) == candidate)
        }
    })
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Owned list of minimal-form compact rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Vec<u8>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already-encoded rule. Only the four rule lengths are
    /// accepted; the bytes are stored as given.
    pub fn push_encoded(&mut self, rule: Vec<u8>) -> Result<()> {
        if !is_valid_rule_len(rule.len()) {
            return Err(Error::InvalidRule(hex::encode(&rule)));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Encode and append an address or CIDR text.
    pub fn push_text(&mut self, text: &str) -> Result<()> {
        self.rules.push(encode_rule(text)?);
        Ok(())
    }

    /// Parse one rule per line. Blank lines and `#` comments are ignored;
    /// any other malformed line fails the whole list.
    pub fn from_lines(text: &str) -> Result<Self> {
        let mut set = Self::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            set.push_text(line).map_err(|e| {
                trace!("rule list line {}: {e}", lineno + 1);
                Error::InvalidRule(format!("line {}: {line}", lineno + 1))
            })?;
        }
        log::debug!("loaded {} rules", set.len());
        Ok(set)
    }

    /// Read a rule list file; see [`RuleSet::from_lines`].
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_lines(&text)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn as_slice(&self) -> &[Vec<u8>] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.rules.iter().map(Vec::as_slice)
    }

    /// Text form of every rule, in order.
    pub fn to_text_lines(&self) -> Vec<String> {
        self.iter()
            .map(|r| rule::rule_to_text(r).unwrap_or_else(|| to_text(r, VersionHint::Any)))
            .collect()
    }

    /// [`general_match`] over this set.
    pub fn first_match(&self, query: &[u8]) -> Option<usize> {
        general_match(&self.rules, query)
    }

    /// [`fast_match`] over this set. The query must be minimal form.
    pub fn fast_first_match(&self, query: &[u8]) -> Option<usize> {
        fast_match(&self.rules, query)
    }

    /// [`general_match`] for every query, in parallel.
    #[cfg(feature = "parallel")]
    pub fn first_match_many<Q: AsRef<[u8]> + Sync>(&self, queries: &[Q]) -> Vec<Option<usize>> {
        use rayon::prelude::*;

        queries
            .par_iter()
            .map(|q| general_match(&self.rules, q.as_ref()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Vec<u8>;
    type IntoIter = std::slice::Iter<'a, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped(a: u8, b: u8, c: u8, d: u8) -> Vec<u8> {
        let mut v = vec![0u8; 10];
        v.extend_from_slice(&[0xFF, 0xFF, a, b, c, d]);
        v
    }

    #[test]
    fn fast_cidr_rule() {
        let rules: &[&[u8]] = &[&[16, 192, 168, 16, 1]];
        assert_eq!(fast_in_range_mixed(rules, &[192, 168, 16, 1]), (0, true));
        let rules: &[&[u8]] = &[&[32, 192, 168, 1, 1]];
        assert_eq!(fast_in_range_mixed(rules, &[192, 168, 16, 1]), (-1, false));
    }

    #[test]
    fn fast_exact_and_order() {
        let rules: Vec<Vec<u8>> = vec![
            vec![10, 0, 0, 1],
            vec![8, 10, 0, 0, 0],
            vec![10, 0, 0, 2],
        ];
        assert_eq!(fast_match(&rules, &[10, 0, 0, 2]), Some(1));
        assert_eq!(fast_match(&rules, &[10, 0, 0, 1]), Some(0));
        assert_eq!(fast_match(&rules, &[11, 0, 0, 1]), None);
    }

    #[test]
    fn fast_skips_malformed_and_cross_family() {
        let v6 = parse_text("2001:db8::1").unwrap().to_vec();
        let mut v6_cidr = vec![32u8];
        v6_cidr.extend_from_slice(&parse_text("2001:db8::").unwrap().to_vec());
        let rules: Vec<Vec<u8>> = vec![
            vec![],
            vec![1, 2, 3],
            vec![40, 1, 2, 3, 4],
            vec![0, 0, 0, 0, 0, 0],
            v6_cidr,
            vec![0, 1, 2, 3, 4],
        ];
        assert_eq!(fast_match(&rules, &[9, 9, 9, 9]), Some(5));
        assert_eq!(fast_match(&rules, &v6), Some(4));
        assert_eq!(fast_match(&rules, &[1, 2, 3]), None);
    }

    #[test]
    fn fast_does_not_narrow() {
        let rules: &[&[u8]] = &[&[192, 168, 1, 1]];
        assert_eq!(fast_match(rules, &mapped(192, 168, 1, 1)), None);
        assert_eq!(general_match(rules, &mapped(192, 168, 1, 1)), Some(0));
    }

    #[test]
    fn general_prefix_lengths() {
        let rules: &[&[u8]] = &[&[18, 192, 168, 3, 1]];
        assert_eq!(in_range_mixed(rules, &[192, 168, 2, 1]), (0, true));
        let rules: &[&[u8]] = &[&[24, 192, 168, 3, 1]];
        assert_eq!(in_range_mixed(rules, &[192, 168, 2, 1]), (-1, false));
    }

    #[test]
    fn general_accepts_mapped_rules() {
        let mut mapped_cidr = vec![120u8];
        mapped_cidr.extend_from_slice(&mapped(10, 1, 2, 0));
        let rules = vec![vec![1u8, 2, 3], mapped(1, 1, 1, 1), mapped_cidr];
        assert_eq!(general_match(&rules, &[1, 1, 1, 1]), Some(1));
        assert_eq!(general_match(&rules, &mapped(1, 1, 1, 1)), Some(1));
        assert_eq!(general_match(&rules, &[10, 1, 2, 77]), Some(2));
        assert_eq!(general_match(&rules, &[10, 1, 3, 77]), None);
        assert_eq!(general_match(&rules, &[1, 2, 3]), None);
    }

    #[test]
    fn general_ipv6() {
        let mut cidr = vec![48u8];
        cidr.extend_from_slice(parse_text("2048:8226:6a02::").unwrap().as_bytes());
        let rules = vec![vec![24, 10, 0, 0, 0], cidr];
        let q = parse_text("2048:8226:6a02:3822::1").unwrap();
        assert_eq!(general_match(&rules, q.as_bytes()), Some(1));
        assert_eq!(general_match(&rules, &[10, 0, 0, 9]), Some(0));
    }

    #[test]
    fn text_rules() {
        let rules = [
            "192.168.192.0/16",
            "192.168.192.0/24",
            "192.168.192.0/16",
            "192.169.192.1",
            "::ffff:ffff/24",
            "::ffff:ffff:ffff/24",
            "::ffff:ffff:ffff/120",
            "2048:8226:6a02:3822::/48",
        ];
        let q = |s: &str| parse_text(s).unwrap();
        assert_eq!(match_text_rules(&rules, q("192.168.192.0").as_bytes()), Some(0));
        assert_eq!(match_text_rules(&rules, q("192.169.192.0").as_bytes()), None);
        assert_eq!(match_text_rules(&rules, q("192.169.192.1").as_bytes()), Some(3));
        assert_eq!(match_text_rules(&rules, &[192, 169, 192, 1]), Some(3));
        assert_eq!(match_text_rules(&rules, q("::ffff:ffff").as_bytes()), Some(4));
        assert_eq!(match_text_rules(&rules, q("255.255.255.255").as_bytes()), Some(6));
        assert_eq!(match_text_rules(&["junk", "10.0.0.0/8"], &[10, 0, 0, 1]), Some(1));
    }

    #[test]
    fn rule_set_from_lines() {
        let set = RuleSet::from_lines(
            "# office\n10.0.0.0/8\n\n  192.168.1.1  \n::ffff:172.16.0.0/108\n2001:db8::/32\n",
        )
        .unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(
            set.to_text_lines(),
            vec!["10.0.0.0/8", "192.168.1.1", "172.16.0.0/12", "2001:db8::/32"]
        );
        assert_eq!(set.first_match(&[172, 20, 0, 1]), Some(2));
        assert_eq!(set.fast_first_match(&[172, 20, 0, 1]), Some(2));
        assert_eq!(set.first_match(&[8, 8, 8, 8]), None);
        assert_eq!((&set).into_iter().count(), 4);
    }

    #[test]
    fn rule_set_rejects_bad_lines() {
        let err = RuleSet::from_lines("10.0.0.0/8\n10.0.0.0/33\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRule(ref s) if s.starts_with("line 2")));
        let mut set = RuleSet::new();
        assert!(set.push_encoded(vec![1, 2, 3]).is_err());
        assert!(set.push_encoded(vec![1, 2, 3, 4]).is_ok());
        assert!(!set.is_empty());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn rule_set_many() {
        let set = RuleSet::from_lines("10.0.0.0/8\n192.168.0.0/16\n").unwrap();
        let queries = vec![vec![10, 1, 1, 1], vec![192, 168, 3, 3], vec![1, 1, 1, 1]];
        assert_eq!(set.first_match_many(&queries), vec![Some(0), Some(1), None]);
    }
}
