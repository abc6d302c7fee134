//! searchtree - compile JSON search payloads into predicates

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{debug, info, warn};
use searchtree::access::Record;
use searchtree::catalog::EntityRegistry;
use searchtree::executor::{drain, FilterExecutor, MemoryScanExecutor};
use searchtree::search::{ResolverOptions, SearchCompiler, SearchError};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

/// searchtree - resolve a search payload, compile it, and optionally run it
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Search payload JSON file, or "-" for stdin
    #[arg(default_value = "-")]
    payload: String,

    /// Entity registry JSON file (defaults to the builtin User/Company registry)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// JSON array of records to filter with the compiled predicate
    #[arg(short, long)]
    records: Option<PathBuf>,

    /// Maximum nesting depth accepted in payloads
    #[arg(short, long)]
    max_depth: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let registry = match &args.schema {
        Some(path) => EntityRegistry::from_json_file(path)
            .with_context(|| format!("Failed to load registry from {}", path.display()))?,
        None => EntityRegistry::builtin(),
    };
    info!("Loaded {} entity kinds", registry.len());

    let compiler = SearchCompiler::new(registry)
        .context("Invalid entity registry")?
        .with_options(ResolverOptions {
            max_depth: args.max_depth,
        });

    let payload = read_json(&args.payload).context("Failed to read search payload")?;

    let node = match compiler.resolve(&payload) {
        Ok(node) => node,
        Err(errors) => return report(SearchError::from(errors)),
    };
    let predicate = match compiler.compile_node(&node) {
        Ok(predicate) => predicate,
        Err(err) => return report(SearchError::from(err)),
    };

    println!("{}", predicate);
    println!(
        "{}",
        serde_json::to_string_pretty(&predicate).context("Failed to serialize predicate")?
    );

    if let Some(path) = &args.records {
        let json = read_json(&path.to_string_lossy())
            .with_context(|| format!("Failed to read records from {}", path.display()))?;
        let records = Record::list_from_json(&json, compiler.registry())?;
        debug!("Loaded {} records", records.len());

        let scan = match node.entity_kind() {
            Some(kind) => MemoryScanExecutor::for_entity(records, kind),
            None => {
                warn!("Search names no entity kind; scanning every record");
                MemoryScanExecutor::new(records)
            }
        };
        let mut filter = FilterExecutor::new(Box::new(scan), predicate);
        let matches = drain(&mut filter)?;

        info!("{} records matched", matches.len());
        for record in &matches {
            println!("{}", record.to_json());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print a structured error and exit non-zero
fn report(err: SearchError) -> Result<ExitCode> {
    eprintln!(
        "{}",
        serde_json::to_string_pretty(&err.to_json()).context("Failed to serialize error")?
    );
    Ok(ExitCode::FAILURE)
}

fn read_json(source: &str) -> Result<serde_json::Value> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)?
    };
    Ok(serde_json::from_str(&text)?)
}
