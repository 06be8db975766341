#![no_main]
use ipmatch::batch::{fast_match, general_match};
use ipmatch::rule::{CompactRule, contains};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the query width, the rest is chopped into rules of
    // arbitrary (often invalid) lengths.
    let q_len = if data[0] & 1 == 0 { 4 } else { 16 };
    let payload = &data[1..];
    if payload.len() < q_len {
        return;
    }
    let (query, mut rest) = payload.split_at(q_len);

    let mut rules: Vec<&[u8]> = Vec::new();
    while !rest.is_empty() && rules.len() < 64 {
        let len = usize::from(rest[0] % 20).min(rest.len() - 1);
        rules.push(&rest[1..1 + len]);
        rest = &rest[1 + len..];
    }

    let fast = fast_match(&rules, query);
    let general = general_match(&rules, query);
    if let Some(i) = fast {
        assert!(i < rules.len());
    }
    if let Some(i) = general {
        assert!(i < rules.len());
        assert!(CompactRule::decode(rules[i]).is_some() || matches!(rules[i].len(), 4 | 16));
    }

    for rule in &rules {
        let ones = u32::from(rule.first().copied().unwrap_or(0));
        let _ = contains(ones, rule, query, data[0] & 2 != 0);
    }
});
