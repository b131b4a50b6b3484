use std::io::Read;
use std::process::exit;

use anyhow::Context;
use clap::Parser;

use revspec::diff::failing_input;
use revspec::history::HistoryFile;
use revspec::{Error, Revision, Spec, StoreKind, parse_diff_args, resolve, resolve_pair};

#[derive(clap::Parser)]
struct Cli {
    #[clap(subcommand)]
    mode: Mode,
}

#[derive(clap::Subcommand)]
enum Mode {
    #[command(about = "Parse a version specification and print its parts")]
    Parse(ParseArgs),

    #[command(about = "Print the revision a version specification resolves to")]
    Show(ShowArgs),

    #[command(about = "Compare two revisions given as 1 to 3 arguments")]
    Diff(DiffArgs),

    #[command(about = "Show version and exit")]
    Version,
}

#[derive(clap::Args)]
struct ParseArgs {
    #[clap(long, default_value = "param")]
    store: StoreKind,

    spec: String,
}

#[derive(clap::Args)]
struct ShowArgs {
    #[clap(long, default_value = "param")]
    store: StoreKind,

    #[clap(long, help = "JSON document of revision histories, or - for stdin")]
    history: String,

    spec: String,
}

#[derive(clap::Args)]
struct DiffArgs {
    #[clap(long, default_value = "param")]
    store: StoreKind,

    #[clap(long, help = "JSON document of revision histories, or - for stdin")]
    history: String,

    #[clap(allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn get_file_or_stdin(path: &str) -> anyhow::Result<Box<dyn Read>> {
    let result: Box<dyn Read> = if path == "-" {
        Box::new(std::io::stdin())
    } else {
        Box::new(std::fs::File::open(path).context(path.to_owned())?)
    };
    Ok(result)
}

fn load_history(path: &str) -> anyhow::Result<HistoryFile> {
    let input = get_file_or_stdin(path)?;
    let history = HistoryFile::from_reader(std::io::BufReader::new(input)).context(path.to_owned())?;
    Ok(history)
}

fn report_grammar_error(input: &str, e: &Error) {
    let line = input.trim();
    match e.offset() {
        Some(start) if start < line.len() => {
            let error = chic::Error::new(e.to_string())
                .error(0, start, start + 1, line, "")
                .help("version specifications look like name#3, name~1 or name:LABEL~2");
            eprintln!("{}", error.to_string());
        }
        _ => eprintln!("{}", e),
    }
}

fn handle_parse_error(input: &str, store: StoreKind) -> Spec {
    match store.parse(input) {
        Ok(spec) => spec,
        Err(e) => {
            report_grammar_error(input, &e);
            exit(1);
        }
    }
}

fn print_revision(revision: &Revision) {
    println!("version: {}", revision.version);
    if let Some(created_at) = revision.created_at {
        println!("created: {}", created_at.to_rfc3339());
    }
    if !revision.labels.is_empty() {
        println!("labels: {}", itertools::join(&revision.labels, ", "));
    }
    if let Some(value) = &revision.value {
        println!();
        println!("{value}");
    }
}

fn parse(args: &ParseArgs) -> anyhow::Result<()> {
    let spec = handle_parse_error(&args.spec, args.store);
    println!("name: {}", spec.name);
    if spec.absolute.is_none() {
        println!("absolute: none");
    } else {
        println!("absolute: {}", spec.absolute);
    }
    println!("shift: {}", spec.shift);
    println!("canonical: {spec}");
    Ok(())
}

fn show(args: &ShowArgs) -> anyhow::Result<()> {
    let spec = handle_parse_error(&args.spec, args.store);
    let history = load_history(&args.history)?;
    let revision = resolve(&spec, &history).with_context(|| spec.to_string())?;
    print_revision(&revision);
    Ok(())
}

fn diff(args: &DiffArgs) -> anyhow::Result<()> {
    let (from, to) = match parse_diff_args(&args.tokens, args.store) {
        Ok(pair) => pair,
        Err(Error::DiffUsage(n)) => {
            eprintln!("Expected 1 to 3 arguments, got {n}");
            eprintln!("Usage: revspec diff --history <FILE> <SPEC> [SPEC]");
            eprintln!("       revspec diff --history <FILE> <NAME> <SPECIFIER> [SPECIFIER]");
            exit(1);
        }
        Err(e) if e.is_grammar_error() => {
            match failing_input(&args.tokens, args.store, &e) {
                Some(input) => report_grammar_error(&input, &e),
                None => eprintln!("{e}"),
            }
            exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let history = load_history(&args.history)?;
    let (old, new) = resolve_pair(&from, &to, &history).context("failed to resolve revisions")?;
    log::debug!("{from} -> {}, {to} -> {}", old.version, new.version);

    if old.value == new.value {
        println!("No differences between {from} and {to}");
        return Ok(());
    }

    println!("--- {from} (version {})", old.version);
    println!("+++ {to} (version {})", new.version);
    for line in old.value.as_deref().unwrap_or_default().lines() {
        println!("-{line}");
    }
    for line in new.value.as_deref().unwrap_or_default().lines() {
        println!("+{line}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();
    match args.mode {
        Mode::Parse(args) => parse(&args)?,
        Mode::Show(args) => show(&args)?,
        Mode::Diff(args) => diff(&args)?,
        Mode::Version => {
            println!("{}", env!("REVSPEC_VERSION"));
        }
    };
    Ok(())
}
