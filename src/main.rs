mod debug_report;

use kwres::{DEFAULT_REGISTRY_PATH, KeywordError, Policy, QueryParser, Resolver, Tier, TierSet};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const REGISTRY_ENV: &str = "KWRES_REGISTRY";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        std::process::exit(exit_code(&err));
    }
}

fn run(config: &CliConfig) -> Result<(), KeywordError> {
    let resolver = Resolver::from_path(&config.registry).with_tiers(config.tiers);
    let source = resolver.source().describe();

    match config.command {
        Command::Resolve => {
            let out = resolver.resolve_verbose(&config.input)?;
            if config.json {
                print_json(&out.resolution);
            } else {
                debug_report::print_resolve(&config.input, &source, &out, config.color);
            }
        }
        Command::Validate { lenient } => {
            let resolution = resolver.validate_only(&config.input, lenient)?;
            if config.json {
                print_json(&resolution);
            } else {
                debug_report::print_validate(&config.input, &source, resolution.as_ref(), config.color);
            }
        }
        Command::Parse(policy) => {
            let parsed = QueryParser::new(&resolver).parse(&config.input, policy)?;
            if config.json {
                print_json(&parsed);
            } else {
                debug_report::print_parsed(&config.input, &source, parsed.as_ref(), config.color);
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("error: failed to render JSON: {err}"),
    }
}

fn exit_code(err: &KeywordError) -> i32 {
    match err {
        KeywordError::UnapprovedKeyword(_) => 3,
        KeywordError::InvalidInput(_) | KeywordError::UnsupportedPolicy(_) => 2,
        _ => 1,
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Resolve,
    Validate { lenient: bool },
    Parse(Policy),
}

struct CliConfig {
    input: String,
    registry: PathBuf,
    command: Command,
    tiers: TierSet,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut registry = std::env::var_os(REGISTRY_ENV).map(PathBuf::from).unwrap_or_else(|| DEFAULT_REGISTRY_PATH.into());
    let mut policy: Option<Policy> = None;
    let mut validate = false;
    let mut lenient = false;
    let mut tiers = TierSet::all();
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("kwres {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--validate" => validate = true,
            "--lenient" => lenient = true,
            "--registry" | "-r" => {
                let value = args.next().ok_or_else(|| "error: --registry expects a value".to_string())?;
                registry = PathBuf::from(value);
            }
            "--policy" | "-p" => {
                let value = args.next().ok_or_else(|| "error: --policy expects a value".to_string())?;
                policy = Some(parse_policy(&value)?);
            }
            "--tiers" => {
                let value = args.next().ok_or_else(|| "error: --tiers expects a value".to_string())?;
                tiers = parse_tiers(&value)?;
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--registry=") => {
                registry = PathBuf::from(arg.trim_start_matches("--registry="));
            }
            _ if arg.starts_with("--policy=") => {
                policy = Some(parse_policy(arg.trim_start_matches("--policy="))?);
            }
            _ if arg.starts_with("--tiers=") => {
                tiers = parse_tiers(arg.trim_start_matches("--tiers="))?;
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let command = match (policy, validate) {
        (Some(_), true) => return Err("error: --policy and --validate are mutually exclusive".to_string()),
        (Some(policy), false) => Command::Parse(policy),
        (None, true) => Command::Validate { lenient },
        (None, false) if lenient => return Err("error: --lenient requires --validate".to_string()),
        (None, false) => Command::Resolve,
    };

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input: input.trim_end_matches(['\r', '\n']).to_string(), registry, command, tiers, json, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_policy(value: &str) -> Result<Policy, String> {
    value.parse().map_err(|err: KeywordError| format!("error: {err}"))
}

fn parse_tiers(value: &str) -> Result<TierSet, String> {
    let mut tiers = TierSet::empty();
    for part in value.split(',').filter(|p| !p.trim().is_empty()) {
        let tier: Tier = part.parse().map_err(|err| format!("error: {err}"))?;
        tiers |= TierSet::from(tier);
    }
    if tiers.is_empty() {
        return Err("error: --tiers expects at least one of exact, synonym, typo".to_string());
    }
    Ok(tiers)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "kwres {version}

Canonical keyword resolution CLI.

Usage:
  kwres [OPTIONS] [--] <query...>
  kwres [OPTIONS] --input <text>

By default the query is resolved and a match report is printed.

Options:
  -i, --input <text>         Query text. If omitted, reads remaining args
                             or stdin when no args are provided.
  -r, --registry <path>      Keyword registry YAML file.
                             Default: ${env} or {default_registry}
  -p, --policy <policy>      Parse the query under STRICT or LENIENT policy.
  --validate                 Fail unless the query resolves.
  --lenient                  With --validate, report no match without failing.
  --tiers <list>             Comma-separated tiers to consult
                             (exact,synonym,typo). Default: all.
  --json                     Print the result as JSON.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Logging:
  Set RUST_LOG (e.g. RUST_LOG=kwres=debug) to trace registry builds and matching.

Exit codes:
  0  Success (including \"no match\" for plain resolution).
  1  Registry could not be loaded or is invalid.
  2  Invalid arguments or input.
  3  Query is not an approved keyword.
",
        version = env!("CARGO_PKG_VERSION"),
        env = REGISTRY_ENV,
        default_registry = DEFAULT_REGISTRY_PATH
    )
}
