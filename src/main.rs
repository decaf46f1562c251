use anyhow::{anyhow, Context, Result};
use dex_fingerprint::corpus::Corpus;
use dex_fingerprint::generator;
use dex_fingerprint::models::MethodId;
use dex_fingerprint::session::{Session, SessionConfig};
use dex_fingerprint::FingerprintError;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::io::{Read, Write};
use std::path::PathBuf;

// Simple CLI without clap
#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");

    // Initialize logger
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .filter(None, if verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init();

    let options = match parse_args(&args)? {
        Command::Version => {
            println!("dex-fingerprint v{}", dex_fingerprint::VERSION);
            return Ok(());
        }
        Command::Usage => {
            print_usage(args.first().map(String::as_str).unwrap_or("dex-fingerprint"));
            return Ok(());
        }
        Command::Run(options) => options,
    };
    let Options { corpus_path, method, resolve_from, json, config } = options;

    let corpus = Corpus::from_json_file(&corpus_path)?;
    let session = Session::new(config);
    session.load(&corpus)?;

    if let Some(source_path) = resolve_from {
        return resolve(&session, &source_path).await;
    }

    let method = method.ok_or_else(|| anyhow!("Missing METHOD_ID"))?;
    info!("Fingerprinting {} in corpus {}", method, corpus.id);

    let task = session.spawn_fingerprint(method.clone())?;
    match task.wait().await {
        Ok(report) => {
            if json {
                println!("{}", generator::to_json(&report)?);
            } else {
                print!("{}", generator::format_text(&report));
            }
            Ok(())
        }
        Err(e) if e.is_indistinguishable() => {
            println!("No unique fingerprint possible for {}", method);
            if let FingerprintError::NoDistinguishingSet { twins, .. } = &e {
                for twin in twins {
                    println!("  structurally identical to {}", twin);
                }
            }
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

async fn resolve(session: &Session, source_path: &str) -> Result<()> {
    let source = if source_path == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read predicate from stdin")?;
        source
    } else {
        std::fs::read_to_string(source_path)
            .with_context(|| format!("Failed to read predicate file: {}", source_path))?
    };

    let task = session.spawn_resolve(source)?;
    match task.wait().await {
        Ok(resolution) => {
            print!("{}", generator::format_resolution(&resolution));
            Ok(())
        }
        Err(FingerprintError::MatchNotFound) => {
            println!("Fingerprint not found in the corpus.");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// What the command line asks for
#[derive(Debug, PartialEq)]
enum Command {
    Version,
    Usage,
    Run(Options),
}

/// Options of a fingerprint or resolve run
#[derive(Debug, PartialEq)]
struct Options {
    corpus_path: PathBuf,
    method: Option<MethodId>,
    resolve_from: Option<String>,
    json: bool,
    config: SessionConfig,
}

/// Parse the command line; flags may appear anywhere
fn parse_args(args: &[String]) -> Result<Command> {
    let mut config = SessionConfig::default();
    let mut positionals: Vec<&str> = Vec::new();
    let mut resolve_from = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--version" | "-v" => return Ok(Command::Version),
            "--resolve" | "-r" => {
                resolve_from = Some(value_of(args, i)?.to_string());
                i += 2;
            }
            "--max-sets" => {
                config.solver.max_sets = parse_count(args, i)?;
                i += 2;
            }
            "--opcodes" => {
                config.extractor.max_opcode_positions = parse_count(args, i)?;
                i += 2;
            }
            "--exhaustive-limit" => {
                config.solver.exhaustive_feature_limit = parse_count(args, i)?;
                i += 2;
            }
            "--json" => {
                json = true;
                i += 1;
            }
            "--verbose" => {
                i += 1;
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(anyhow!("Unknown argument: {}", other));
            }
            other => {
                positionals.push(other);
                i += 1;
            }
        }
    }

    let (corpus_path, method) = match positionals.as_slice() {
        [corpus] if resolve_from.is_some() => (corpus, None),
        [corpus, method] => (corpus, Some(MethodId::from(*method))),
        [] | [_] => return Ok(Command::Usage),
        [_, _, extra, ..] => return Err(anyhow!("Unexpected argument: {}", extra)),
    };

    Ok(Command::Run(Options {
        corpus_path: PathBuf::from(*corpus_path),
        method,
        resolve_from,
        json,
        config,
    }))
}

fn value_of(args: &[String], i: usize) -> Result<&str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing value for {}", args[i]))
}

fn parse_count(args: &[String], i: usize) -> Result<usize> {
    let value = value_of(args, i)?;
    value
        .parse()
        .with_context(|| format!("Invalid value for {}: {}", args[i], value))
}

fn print_usage(program: &str) {
    println!("dex-fingerprint v{}", dex_fingerprint::VERSION);
    println!("\nUsage:");
    println!("  {} <CORPUS.json> <METHOD_ID> [--max-sets N] [--opcodes N] [--exhaustive-limit N] [--json]", program);
    println!("  {} <CORPUS.json> --resolve <FILE|->", program);
    println!("  {} --version", program);
    println!("\nOptions:");
    println!("  --max-sets N           Return at most N fingerprints (default: 8)");
    println!("  --opcodes N            Use the first N opcodes as features (default: 16)");
    println!("  --exhaustive-limit N   Exhaustive search for methods with at most N features (default: 24)");
    println!("  --json                 Print the report as JSON");
    println!("  --resolve, -r FILE     Resolve a fingerprint read from FILE, or stdin with '-'");
    println!("  --verbose              Enable debug logging");
    println!("  --version, -v          Show version information");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("dex-fingerprint")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    fn run(list: &[&str]) -> Options {
        match parse_args(&args(list)).unwrap() {
            Command::Run(options) => options,
            other => panic!("expected a run, got {:?}", other),
        }
    }

    #[test]
    fn test_flags_before_positionals() {
        let options = run(&["--verbose", "--max-sets", "3", "corpus.json", "LA;->a()V"]);
        assert_eq!(options.corpus_path, PathBuf::from("corpus.json"));
        assert_eq!(options.method, Some(MethodId::from("LA;->a()V")));
        assert_eq!(options.config.solver.max_sets, 3);

        let trailing = run(&["corpus.json", "LA;->a()V", "--verbose", "--json"]);
        assert_eq!(trailing.corpus_path, PathBuf::from("corpus.json"));
        assert!(trailing.json);
    }

    #[test]
    fn test_resolve_mode() {
        let options = run(&["-r", "-", "corpus.json"]);
        assert_eq!(options.resolve_from.as_deref(), Some("-"));
        assert_eq!(options.method, None);
    }

    #[test]
    fn test_usage_version_and_errors() {
        assert_eq!(parse_args(&args(&[])).unwrap(), Command::Usage);
        assert_eq!(parse_args(&args(&["--verbose", "corpus.json"])).unwrap(), Command::Usage);
        assert_eq!(parse_args(&args(&["corpus.json", "--version"])).unwrap(), Command::Version);
        assert!(parse_args(&args(&["--bogus", "corpus.json", "M"])).is_err());
        assert!(parse_args(&args(&["corpus.json", "M", "extra"])).is_err());
        assert!(parse_args(&args(&["corpus.json", "M", "--opcodes", "many"])).is_err());
    }
}
