//! SnapKV CLI
//!
//! Command-line interface over a SnapKV database file.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use snapkv::{Command, Config, Database, Document, SnapError};
use tracing_subscriber::{fmt, EnvFilter};

/// SnapKV CLI
#[derive(Parser, Debug)]
#[command(name = "snapkv")]
#[command(about = "CLI for the SnapKV embedded key-value store")]
#[command(version)]
struct Args {
    /// Database file, or a directory holding {dir}/my-db.txt
    #[arg(short, long, default_value = ".")]
    path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Print the first JSON document whose field equals a value
    Find {
        /// Field to compare
        #[arg(short, long)]
        field: String,

        /// Expected value (parsed as JSON, else compared as a string)
        #[arg(short, long)]
        equals: String,
    },

    /// Print every JSON document whose field equals a value
    Where {
        /// Field to compare
        #[arg(short, long)]
        field: String,

        /// Expected value (parsed as JSON, else compared as a string)
        #[arg(short, long)]
        equals: String,
    },

    /// Print every key and value
    Dump,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,snapkv=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_not_found() => {
            eprintln!("{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), SnapError> {
    let config = Config::builder().path(&args.path).build();
    let db = Database::open(config)?;
    tracing::debug!("Using {}", db.path().display());

    match args.command {
        Commands::Get { key } => {
            if let Some(value) = db.execute(Command::Get { key })? {
                println!("{}", value);
            }
        }
        Commands::Set { key, value } => {
            db.execute(Command::Set { key, value })?;
        }
        Commands::Del { key } => {
            db.execute(Command::Delete { key })?;
        }
        Commands::Find { field, equals } => {
            let expected = parse_expected(&equals);
            let document = db.find(|doc| doc[field.as_str()] == expected)?;
            print_document(&document)?;
        }
        Commands::Where { field, equals } => {
            let expected = parse_expected(&equals);
            for document in db.filter(|doc| doc[field.as_str()] == expected)? {
                print_document(&document)?;
            }
        }
        Commands::Dump => {
            for (key, value) in db.snapshot() {
                println!("{}\t{}", key, value);
            }
        }
    }

    db.close()
}

fn parse_expected(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn print_document(document: &Document) -> Result<(), SnapError> {
    println!("{}", serde_json::to_string(document.as_map())?);
    Ok(())
}
