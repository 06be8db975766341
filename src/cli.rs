// Command-line front end for ipmatch.
//
// Every subcommand produces an `Outcome`: plain text lines, an equivalent
// JSON object, and an exit status. Membership questions exit 0 on yes and
// 1 on no; invalid input exits 2.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use log::{LevelFilter, debug};
use serde_json::{Value, json};

use crate::addr::{
    MAX_RADIX, MIN_RADIX, VersionHint, from_number, parse_number, parse_text, to_str_ip, to_text,
    to_text_ipv4_number, to_text_number,
};
use crate::batch::RuleSet;
use crate::cidr::{Network, mask_ip_to_cidr, parse_cidr, to_cidr_str, to_ip_mask_string};
use crate::classify::{AddrKind, is_private, is_public, kind_of};
use crate::error::{Error, Result};
use crate::range::{in_cidr_str, in_range};
use crate::rule::{encode_rule, rule_to_text};

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_OK: i32 = 0;
const EXIT_NO: i32 = 1;
const EXIT_INVALID: i32 = 2;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// IP address codec and CIDR / rule-list matcher.
#[derive(Parser, Debug)]
#[command(
    name = "ipmatch",
    version,
    about = "IP address codec and CIDR/rule-list matcher",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Only log errors.
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose logging (repeat for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON on stdout.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse CIDR notation and print version, address, network and mask.
    Parse(CidrArgs),
    /// Re-render an address for a family.
    Show(ShowArgs),
    /// Print the numeric form of an address.
    Number(NumberArgs),
    /// Print the address for a number.
    FromNumber(FromNumberArgs),
    /// Test whether an address lies in a CIDR.
    Contains(ContainsArgs),
    /// Test whether an address lies in an inclusive start/end range.
    Range(RangeArgs),
    /// Encode addresses and CIDRs as compact rules (hex).
    Encode(EncodeArgs),
    /// Report the first rule covering an address.
    Match(MatchArgs),
    /// Convert a fuzzy IPv4 pattern such as `192.168.*.*` to CIDR.
    Fuzzy(FuzzyArgs),
    /// Convert `ip/hex-mask` to `ip/prefix-length`.
    MaskToCidr(MaskArgs),
    /// Classify an address (loopback, private, multicast, ...).
    Kind(AddrArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FamilyArg {
    V4,
    V6,
    Any,
}

impl From<FamilyArg> for VersionHint {
    fn from(f: FamilyArg) -> Self {
        match f {
            FamilyArg::V4 => VersionHint::V4,
            FamilyArg::V6 => VersionHint::V6,
            FamilyArg::Any => VersionHint::Any,
        }
    }
}

fn parse_radix(s: &str) -> std::result::Result<u32, String> {
    let radix: u32 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid radix '{s}': {e}"))?;
    if !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
        return Err(Error::InvalidRadix(radix).to_string());
    }
    Ok(radix)
}

#[derive(Args, Debug)]
struct CidrArgs {
    /// CIDR, e.g. `192.168.0.0/16` or `2001:db8::/32`.
    cidr: String,
}

#[derive(Args, Debug)]
struct AddrArgs {
    /// IPv4 or IPv6 address.
    ip: String,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// IPv4 or IPv6 address.
    ip: String,

    /// Output family.
    #[arg(long, value_enum, default_value_t = FamilyArg::Any)]
    family: FamilyArg,
}

#[derive(Args, Debug)]
struct NumberArgs {
    /// IPv4 or IPv6 address.
    ip: String,

    /// Output radix (2-36).
    #[arg(long, short = 'r', value_parser = parse_radix, default_value_t = 10)]
    radix: u32,

    /// Use the low 32 bits of the address.
    #[arg(long)]
    ipv4: bool,
}

#[derive(Args, Debug)]
struct FromNumberArgs {
    /// Address number.
    number: String,

    /// Input radix (2-36).
    #[arg(long, short = 'r', value_parser = parse_radix, default_value_t = 10)]
    radix: u32,

    /// Address width: 4 bytes, 16 bytes, or the smallest that fits.
    #[arg(long, value_enum, default_value_t = FamilyArg::Any)]
    family: FamilyArg,
}

#[derive(Args, Debug)]
struct ContainsArgs {
    cidr: String,
    ip: String,
}

#[derive(Args, Debug)]
struct RangeArgs {
    start: String,
    end: String,
    ip: String,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Addresses or CIDRs.
    #[arg(required = true)]
    entries: Vec<String>,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Address to look up.
    ip: String,

    /// Rule (address or CIDR); may be repeated.
    #[arg(long = "rule", short = 'r')]
    rules: Vec<String>,

    /// File with one rule per line (`#` comments allowed).
    #[arg(long = "rules-file", value_hint = ValueHint::FilePath)]
    rules_file: Option<PathBuf>,

    /// Use the strict fast matcher.
    #[arg(long)]
    fast: bool,
}

#[derive(Args, Debug)]
struct FuzzyArgs {
    /// Pattern such as `10.*` or `192.168.1.*`.
    pattern: String,
}

#[derive(Args, Debug)]
struct MaskArgs {
    /// `ip/hex-mask`, e.g. `192.168.1.0/ffffff00`.
    ip_mask: String,
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

struct Options {
    command: Cmd,
    log_level: Option<LevelFilter>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let log_level = if cli.quiet {
        Some(LevelFilter::Error)
    } else {
        match cli.verbose {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        }
    };
    Options {
        command: cli.command,
        log_level,
        json_output: cli.json_output,
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("ipmatch".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        // File access is out of scope for fuzzing.
        if let Cmd::Match(MatchArgs {
            rules_file: Some(_),
            ..
        }) = opts.command
        {
            return;
        }
        let _ = execute(opts.command);
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Outcome {
    code: i32,
    lines: Vec<String>,
    json: Value,
}

impl Outcome {
    fn ok(lines: Vec<String>, json: Value) -> Self {
        Self {
            code: EXIT_OK,
            lines,
            json,
        }
    }

    fn answer(yes: bool, json: Value) -> Self {
        Self {
            code: if yes { EXIT_OK } else { EXIT_NO },
            lines: vec![yes.to_string()],
            json,
        }
    }
}

fn require_addr(ip: &str) -> Result<()> {
    match parse_text(ip) {
        Some(_) => Ok(()),
        None => Err(Error::InvalidAddress(ip.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_parse(args: &CidrArgs) -> Result<Outcome> {
    let network: Network = args.cidr.parse()?;
    let (version, addr, _) = parse_cidr(&args.cidr);
    let addr = addr.unwrap_or_default();
    let ip_mask = to_ip_mask_string(&args.cidr).unwrap_or_default();

    Ok(Outcome::ok(
        vec![
            format!("version: {version}"),
            format!("address: {addr}"),
            format!("network: {network}"),
            format!("mask:    {ip_mask}"),
        ],
        json!({
            "version": version.as_str(),
            "address": addr,
            "network": network.to_string(),
            "prefix_len": network.ones(),
            "mask": network.mask().to_string(),
            "ip_mask": ip_mask,
        }),
    ))
}

fn cmd_show(args: &ShowArgs) -> Result<Outcome> {
    require_addr(&args.ip)?;
    let text = to_str_ip(&args.ip, args.family.into());
    if text.is_empty() {
        return Err(Error::InvalidAddress(format!("{} (no {:?} form)", args.ip, args.family)));
    }
    let json = json!({ "input": args.ip, "address": text });
    Ok(Outcome::ok(vec![text], json))
}

fn cmd_number(args: &NumberArgs) -> Result<Outcome> {
    require_addr(&args.ip)?;
    let number = if args.ipv4 {
        to_text_ipv4_number(&args.ip, args.radix)
    } else {
        to_text_number(&args.ip, args.radix)
    };
    let json = json!({
        "address": args.ip,
        "radix": args.radix,
        "ipv4": args.ipv4,
        "number": number,
    });
    Ok(Outcome::ok(vec![number], json))
}

fn cmd_from_number(args: &FromNumberArgs) -> Result<Outcome> {
    let n = parse_number(&args.number, args.radix)?;
    let hint = VersionHint::from(args.family);
    let addr = from_number(&n, hint).ok_or_else(|| Error::InvalidNumber(args.number.clone()))?;
    let text = to_text(addr.as_bytes(), hint);
    let json = json!({
        "number": args.number,
        "radix": args.radix,
        "address": text,
        "bytes": hex::encode(addr.as_bytes()),
    });
    Ok(Outcome::ok(vec![text], json))
}

fn cmd_contains(args: &ContainsArgs) -> Result<Outcome> {
    args.cidr.parse::<Network>()?;
    require_addr(&args.ip)?;
    let yes = in_cidr_str(&args.cidr, &args.ip);
    Ok(Outcome::answer(
        yes,
        json!({ "cidr": args.cidr, "address": args.ip, "contains": yes }),
    ))
}

fn cmd_range(args: &RangeArgs) -> Result<Outcome> {
    for ip in [&args.start, &args.end, &args.ip] {
        require_addr(ip)?;
    }
    let yes = in_range(&args.start, &args.end, &args.ip);
    Ok(Outcome::answer(
        yes,
        json!({
            "start": args.start,
            "end": args.end,
            "address": args.ip,
            "in_range": yes,
        }),
    ))
}

fn cmd_encode(args: &EncodeArgs) -> Result<Outcome> {
    let mut lines = Vec::with_capacity(args.entries.len());
    let mut items = Vec::with_capacity(args.entries.len());
    for entry in &args.entries {
        let rule = hex::encode(encode_rule(entry)?);
        items.push(json!({ "input": entry, "rule": rule }));
        lines.push(rule);
    }
    Ok(Outcome::ok(lines, Value::Array(items)))
}

fn cmd_match(args: &MatchArgs) -> Result<Outcome> {
    let mut rules = match &args.rules_file {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::new(),
    };
    for rule in &args.rules {
        rules.push_text(rule)?;
    }
    let addr = parse_text(&args.ip).ok_or_else(|| Error::InvalidAddress(args.ip.clone()))?;
    debug!("matching {} against {} rules (fast: {})", args.ip, rules.len(), args.fast);

    let found = if args.fast {
        rules.fast_first_match(addr.narrow().as_bytes())
    } else {
        rules.first_match(addr.as_bytes())
    };
    let rule_text = found
        .and_then(|i| rules.as_slice().get(i))
        .and_then(|r| rule_to_text(r));

    let json = json!({
        "address": args.ip,
        "matched": found.is_some(),
        "index": found.map_or(-1, |i| i as i64),
        "rule": rule_text,
    });
    let line = match (found, &rule_text) {
        (Some(i), Some(text)) => format!("{i}\t{text}"),
        (Some(i), None) => i.to_string(),
        (None, _) => "no match".to_string(),
    };
    Ok(Outcome {
        code: if found.is_some() { EXIT_OK } else { EXIT_NO },
        lines: vec![line],
        json,
    })
}

fn cmd_fuzzy(args: &FuzzyArgs) -> Result<Outcome> {
    let cidr = to_cidr_str(&args.pattern).ok_or_else(|| Error::InvalidCidr(args.pattern.clone()))?;
    let json = json!({ "pattern": args.pattern, "cidr": cidr });
    Ok(Outcome::ok(vec![cidr], json))
}

fn cmd_mask_to_cidr(args: &MaskArgs) -> Result<Outcome> {
    let cidr =
        mask_ip_to_cidr(&args.ip_mask).ok_or_else(|| Error::InvalidCidr(args.ip_mask.clone()))?;
    let json = json!({ "input": args.ip_mask, "cidr": cidr });
    Ok(Outcome::ok(vec![cidr], json))
}

fn cmd_kind(args: &AddrArgs) -> Result<Outcome> {
    let addr = parse_text(&args.ip).ok_or_else(|| Error::InvalidAddress(args.ip.clone()))?;
    let kind = kind_of(addr.as_bytes());
    let (private, public) = (is_private(addr.as_bytes()), is_public(addr.as_bytes()));
    let names: Vec<String> = kind
        .iter_names()
        .filter(|(_, f)| *f != AddrKind::LOOPBACK_AND_LINK_LOCAL_UNICAST)
        .map(|(n, _)| n.to_ascii_lowercase())
        .collect();
    Ok(Outcome::ok(
        vec![
            format!("kind:    {kind}"),
            format!("private: {private}"),
            format!("public:  {public}"),
        ],
        json!({
            "address": args.ip,
            "kind": names,
            "private": private,
            "public": public,
        }),
    ))
}

fn cmd_config() -> Result<Outcome> {
    let version = env!("CARGO_PKG_VERSION");
    let parallel = cfg!(feature = "parallel");
    let ptr_size = std::mem::size_of::<*const ()>();
    Ok(Outcome::ok(
        vec![
            format!("ipmatch version {version}"),
            format!("PARALLEL={}", parallel as u8),
            format!("RADIX_RANGE={MIN_RADIX}..={MAX_RADIX}"),
            format!("sizeof(usize)={ptr_size}"),
        ],
        json!({
            "version": version,
            "parallel": parallel,
            "min_radix": MIN_RADIX,
            "max_radix": MAX_RADIX,
            "pointer_size": ptr_size,
        }),
    ))
}

fn execute(command: Cmd) -> Result<Outcome> {
    match &command {
        Cmd::Parse(args) => cmd_parse(args),
        Cmd::Show(args) => cmd_show(args),
        Cmd::Number(args) => cmd_number(args),
        Cmd::FromNumber(args) => cmd_from_number(args),
        Cmd::Contains(args) => cmd_contains(args),
        Cmd::Range(args) => cmd_range(args),
        Cmd::Encode(args) => cmd_encode(args),
        Cmd::Match(args) => cmd_match(args),
        Cmd::Fuzzy(args) => cmd_fuzzy(args),
        Cmd::MaskToCidr(args) => cmd_mask_to_cidr(args),
        Cmd::Kind(args) => cmd_kind(args),
        Cmd::Config => cmd_config(),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_logging(level: Option<LevelFilter>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp(None).format_target(false);
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);
    init_logging(opts.log_level);

    let json_output = opts.json_output;
    let exit_code = match execute(opts.command) {
        Ok(outcome) => {
            if json_output {
                println!("{:#}", outcome.json);
            } else {
                for line in &outcome.lines {
                    println!("{line}");
                }
            }
            outcome.code
        }
        Err(e) => {
            if json_output {
                println!("{:#}", json!({ "error": e.to_string() }));
            }
            eprintln!("ipmatch: {e}");
            EXIT_INVALID
        }
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("ipmatch".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    fn run_args(args: &[&str]) -> Result<Outcome> {
        execute(parse_opts(args).command)
    }

    #[test]
    fn radix_bounds() {
        assert_eq!(parse_radix("16").unwrap(), 16);
        assert!(parse_radix("1").is_err());
        assert!(parse_radix("37").is_err());
        assert!(parse_radix("x").is_err());
        let argv = ["ipmatch", "number", "1.2.3.4", "--radix", "40"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn log_levels() {
        assert_eq!(parse_opts(&["config"]).log_level, None);
        assert_eq!(parse_opts(&["-v", "config"]).log_level, Some(LevelFilter::Info));
        assert_eq!(parse_opts(&["-vv", "config"]).log_level, Some(LevelFilter::Debug));
        assert_eq!(parse_opts(&["-vvvv", "config"]).log_level, Some(LevelFilter::Trace));
        assert_eq!(parse_opts(&["-q", "config"]).log_level, Some(LevelFilter::Error));
        assert!(parse_opts(&["--json", "config"]).json_output);
    }

    #[test]
    fn parse_command() {
        let out = run_args(&["parse", "192.0.2.1/24"]).unwrap();
        assert_eq!(out.code, EXIT_OK);
        assert_eq!(out.json["version"], "ipv4");
        assert_eq!(out.json["address"], "192.0.2.1");
        assert_eq!(out.json["network"], "192.0.2.0/24");
        assert_eq!(out.json["ip_mask"], "192.0.2.1/ffffff00");

        assert!(matches!(
            run_args(&["parse", "10.0.0.0/33"]),
            Err(Error::InvalidPrefix { ones: 33, bits: 32 })
        ));
    }

    #[test]
    fn show_and_number() {
        let out = run_args(&["show", "::ffff:10.0.0.1", "--family", "v4"]).unwrap();
        assert_eq!(out.lines, vec!["10.0.0.1"]);
        assert!(run_args(&["show", "2001:db8::1", "--family", "v4"]).is_err());

        let out = run_args(&["number", "10.1.255.255"]).unwrap();
        assert_eq!(out.lines, vec!["167903231"]);
        let out = run_args(&["number", "10.1.255.255", "-r", "16"]).unwrap();
        assert_eq!(out.lines, vec!["a01ffff"]);
        let out = run_args(&["number", "::1:a01:ffff", "--ipv4"]).unwrap();
        assert_eq!(out.lines, vec!["167903231"]);
        assert!(matches!(run_args(&["number", "bad"]), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn from_number_command() {
        let out = run_args(&["from-number", "167903231"]).unwrap();
        assert_eq!(out.lines, vec!["10.1.255.255"]);
        let out = run_args(&["from-number", "1", "--family", "v6"]).unwrap();
        assert_eq!(out.lines, vec!["::1"]);
        assert!(matches!(
            run_args(&["from-number", "zz", "-r", "10"]),
            Err(Error::InvalidNumber(_))
        ));
    }

    #[test]
    fn membership_exit_codes() {
        assert_eq!(run_args(&["contains", "10.0.0.0/8", "10.9.9.9"]).unwrap().code, EXIT_OK);
        assert_eq!(run_args(&["contains", "10.0.0.0/8", "11.0.0.1"]).unwrap().code, EXIT_NO);
        assert!(run_args(&["contains", "10.0.0.0", "11.0.0.1"]).is_err());

        let out = run_args(&["range", "192.168.0.1", "192.168.192.0", "192.168.1.1"]).unwrap();
        assert_eq!(out.code, EXIT_OK);
        assert_eq!(out.json["in_range"], true);
        let out = run_args(&["range", "192.168.0.1", "192.168.192.0", "2048:db8::"]).unwrap();
        assert_eq!(out.code, EXIT_NO);
    }

    #[test]
    fn encode_command() {
        let out = run_args(&["encode", "192.168.16.1/16", "::ffff:1.2.3.4", "2001:db8::1"]).unwrap();
        assert_eq!(out.lines[0], "10c0a80000");
        assert_eq!(out.lines[1], "01020304");
        assert_eq!(out.lines[2], "20010db8000000000000000000000001");
        assert!(matches!(run_args(&["encode", "1.2.3.4/40"]), Err(Error::InvalidCidr(_))));
    }

    #[test]
    fn match_command() {
        let out = run_args(&[
            "match", "10.20.30.40", "-r", "192.168.0.0/16", "-r", "10.0.0.0/8",
        ])
        .unwrap();
        assert_eq!(out.code, EXIT_OK);
        assert_eq!(out.lines, vec!["1\t10.0.0.0/8"]);
        assert_eq!(out.json["index"], 1);

        let out = run_args(&["match", "::ffff:10.20.30.40", "--fast", "-r", "10.0.0.0/8"]).unwrap();
        assert_eq!(out.code, EXIT_OK);

        let out = run_args(&["match", "8.8.8.8", "-r", "10.0.0.0/8"]).unwrap();
        assert_eq!(out.code, EXIT_NO);
        assert_eq!(out.json["index"], -1);
        assert!(out.json["rule"].is_null());

        assert!(run_args(&["match", "8.8.8.8", "-r", "nope"]).is_err());
    }

    #[test]
    fn text_helpers() {
        assert_eq!(run_args(&["fuzzy", "192.168.*.*"]).unwrap().lines, vec!["192.168.0.0/16"]);
        assert!(run_args(&["fuzzy", "192"]).is_err());
        assert_eq!(
            run_args(&["mask-to-cidr", "192.168.1.0/ffffff00"]).unwrap().lines,
            vec!["192.168.1.0/24"]
        );
        assert!(run_args(&["mask-to-cidr", "192.168.1.0/ff"]).is_err());

        let out = run_args(&["kind", "10.0.0.1"]).unwrap();
        assert_eq!(out.json["kind"], json!(["private", "global_unicast"]));
        assert_eq!(out.json["public"], false);
    }

    #[test]
    fn config_reports_version() {
        let out = run_args(&["config"]).unwrap();
        assert_eq!(out.json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn fuzz_entry_tolerates_garbage() {
        for args in [
            vec![],
            vec!["match".to_string()],
            vec!["parse".to_string(), "\u{0}/\u{ff}".to_string()],
            vec!["from-number".to_string(), "9".repeat(200)],
        ] {
            fuzz_try_parse_args(&args);
        }
    }
}
