//! xhub administration CLI.
//!
//! Provides the `xhub` binary for inspecting and editing a store offline. It
//! opens the same SQLite database the server uses and goes through the same
//! `ResourceRepository`, so keys, the creation index and cascading deletes
//! behave exactly as they do over HTTP.

use std::io::{self, Read, Write};
use std::process;
use std::sync::Arc;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde_json::value::RawValue;

use xhub_core::{ResourcePath, Scope};
use xhub_storage::{ResourceRepository, SqliteStore, StorageError, WriteMode};

const EXIT_NOT_FOUND: i32 = 1;
const EXIT_INVALID: i32 = 2;
const EXIT_STORE: i32 = 3;

/// Inspect and edit an xhub resource store.
#[derive(Parser)]
#[command(name = "xhub", about = "Inspect and edit an xhub resource store")]
struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, env = "XHUB_DB_PATH", default_value = "xhub.db")]
    db: String,

    /// Base URL used to build resource URLs in listings.
    #[arg(long, env = "XHUB_BASE_URL", default_value = "http://localhost:8081")]
    base_url: String,

    /// Apply multi-key writes in a single transaction.
    #[arg(long)]
    atomic: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the direct children of a collection, e.g. `/studies/S1/trials`.
    List { collection: String },

    /// Print the payload stored under an id.
    Get { id: String },

    /// Store a JSON payload under an id, replacing any previous one.
    Put {
        id: String,
        /// JSON text, or `-` to read it from stdin.
        data: String,
    },

    /// Delete a resource and everything filed beneath it.
    Delete { id: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let store = match SqliteStore::new(&cli.db) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: failed to open database '{}': {}", cli.db, e);
            process::exit(EXIT_STORE);
        }
    };
    let mode = if cli.atomic {
        WriteMode::Atomic
    } else {
        WriteMode::BestEffort
    };
    let repo = ResourceRepository::new(Arc::new(store), cli.base_url).with_write_mode(mode);

    let mut out = io::stdout().lock();
    let exit_code = match cli.command {
        Commands::List { collection } => run_list(&repo, &collection, &mut out),
        Commands::Get { id } => run_get(&repo, &id, &mut out),
        Commands::Put { id, data } => match read_data(data) {
            Ok(data) => run_put(&repo, &id, &data, &mut out),
            Err(e) => {
                eprintln!("Error: failed to read stdin: {}", e);
                EXIT_INVALID
            }
        },
        Commands::Delete { id } => run_delete(&repo, &id),
    };
    process::exit(exit_code);
}

fn read_data(data: String) -> io::Result<String> {
    if data != "-" {
        return Ok(data);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Maps a storage failure to an exit code: 2 for bad identities, 3 otherwise.
fn report(err: StorageError) -> i32 {
    eprintln!("Error: {}", err);
    if err.is_invalid_identity() {
        EXIT_INVALID
    } else {
        EXIT_STORE
    }
}

/// Prints the listing as a JSON array of envelopes.
fn run_list(repo: &ResourceRepository, collection: &str, out: &mut impl Write) -> i32 {
    let scope = match Scope::parse(collection) {
        Ok(scope) => scope,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID;
        }
    };
    let resources = match repo.list(&scope) {
        Ok(resources) => resources,
        Err(e) => return report(e),
    };
    match serde_json::to_string_pretty(&resources) {
        Ok(json) => emit(out, json.as_bytes()),
        Err(e) => {
            eprintln!("Error: stored payload is not valid JSON: {}", e);
            EXIT_STORE
        }
    }
}

fn run_get(repo: &ResourceRepository, id: &str, out: &mut impl Write) -> i32 {
    let path = match ResourcePath::parse(id) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID;
        }
    };
    match repo.get(&path) {
        Ok(Some(payload)) => emit(out, &payload),
        Ok(None) => {
            eprintln!("Error: {} does not exist", path);
            EXIT_NOT_FOUND
        }
        Err(e) => report(e),
    }
}

/// Stores `data` verbatim after checking it is a single JSON value.
fn run_put(repo: &ResourceRepository, id: &str, data: &str, out: &mut impl Write) -> i32 {
    let path = match ResourcePath::parse(id) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID;
        }
    };
    let raw: Box<RawValue> = match serde_json::from_str(data.trim()) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: payload is not valid JSON: {}", e);
            return EXIT_INVALID;
        }
    };
    let payload = Bytes::copy_from_slice(raw.get().as_bytes());
    match repo.put(&path, payload) {
        Ok(resource) => match serde_json::to_string_pretty(&resource) {
            Ok(json) => emit(out, json.as_bytes()),
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_STORE
            }
        },
        Err(e) => report(e),
    }
}

fn run_delete(repo: &ResourceRepository, id: &str) -> i32 {
    let path = match ResourcePath::parse(id) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID;
        }
    };
    match repo.delete(&path) {
        Ok(()) => 0,
        Err(e) => report(e),
    }
}

fn emit(out: &mut impl Write, bytes: &[u8]) -> i32 {
    match out.write_all(bytes).and_then(|()| out.write_all(b"\n")) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: failed to write output: {}", e);
            EXIT_STORE
        }
    }
}
