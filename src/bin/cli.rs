//! RowLog CLI
//!
//! Command-line interface operating directly on a data directory.
//! JSON arguments are decoded here into the typed engine API.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use rowlog::{
    ColumnType, Config, Engine, Item, Predicate, RowLogError, SyncStrategy, TableSchema, Value,
};
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// RowLog CLI
#[derive(Parser, Debug)]
#[command(name = "rowlog")]
#[command(about = "Typed single-node table store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./rowlog_data")]
    data_dir: PathBuf,

    /// fsync the table log after every write
    #[arg(long)]
    sync_every_write: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table from a JSON schema
    ///
    /// e.g. '{"name":"authors","columns":[{"name":"id","type":"Integer"}],"primary_key":"id"}'
    CreateTable {
        /// Schema as JSON
        schema: String,
    },

    /// Write an item (upsert on the primary key)
    Put {
        /// Table name
        table: String,

        /// Item as a JSON object
        item: String,
    },

    /// Read an item by primary key
    Get {
        /// Table name
        table: String,

        /// Key as a JSON literal (bare words are read as text)
        key: String,
    },

    /// List items matching a JSON predicate
    ///
    /// e.g. '{"$or":[{"column":"id","op":"$eq","value":1}]}'
    Filter {
        /// Table name
        table: String,

        /// Predicate as JSON
        predicate: String,
    },

    /// List tables
    Tables,

    /// Show key count and log size of a table
    Stats {
        /// Table name
        table: String,
    },

    /// Rewrite a table log without superseded records
    Compact {
        /// Table name
        table: String,
    },
}

/// Errors surfaced to the command line
#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Engine(#[from] RowLogError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Input(String),
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,rowlog=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let sync_strategy = if args.sync_every_write {
        SyncStrategy::EveryWrite
    } else {
        Config::default().sync_strategy
    };
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_strategy(sync_strategy)
        .build();
    let engine = Engine::open(config)?;

    match args.command {
        Commands::CreateTable { schema } => {
            let schema: TableSchema = serde_json::from_str(&schema)?;
            let name = schema.name.clone();
            engine.create_table(schema)?;
            println!("Table '{}' created", name);
        }
        Commands::Put { table, item } => {
            let schema = engine.schema(&table)?;
            let item = parse_item(&schema, &item)?;
            engine.put_item(&table, &item)?;
            println!("OK");
        }
        Commands::Get { table, key } => {
            let schema = engine.schema(&table)?;
            let key = parse_key(&schema, &key);
            let item = engine.get_item(&table, &key)?;
            println!("{}", serde_json::to_string(&item)?);
        }
        Commands::Filter { table, predicate } => {
            let predicate: Predicate = serde_json::from_str(&predicate)?;
            for item in engine.filter_item(&table, &predicate)? {
                println!("{}", serde_json::to_string(&item)?);
            }
        }
        Commands::Tables => {
            for name in engine.list_tables() {
                println!("{}", name);
            }
        }
        Commands::Stats { table } => {
            let stats = engine.table_stats(&table)?;
            println!("live_keys: {}", stats.live_keys);
            println!("log_bytes: {}", stats.log_bytes);
        }
        Commands::Compact { table } => {
            let report = engine.compact_table(&table)?;
            println!(
                "kept {} records, {} -> {} bytes",
                report.records_kept, report.bytes_before, report.bytes_after
            );
        }
    }

    engine.close()?;
    Ok(())
}

/// Decode a JSON object into an item, promoting integers for Float columns
fn parse_item(schema: &TableSchema, json: &str) -> Result<Item, CliError> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

    let mut item = Item::new();
    for (name, raw) in object {
        if raw.is_null() {
            // null means "no value"
            continue;
        }
        let value: Value = serde_json::from_value(raw)
            .map_err(|e| CliError::Input(format!("column '{}': {}", name, e)))?;
        let value = match schema.column(&name) {
            Some(column) => coerce(value, column.column_type),
            // Unknown columns are rejected by the engine
            None => value,
        };
        item.insert(name, value);
    }
    Ok(item)
}

/// Decode a key argument typed to the primary-key column
fn parse_key(schema: &TableSchema, raw: &str) -> Value {
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::from(raw));
    match schema.primary_key_column() {
        Some(column) if column.column_type == ColumnType::Text => match value {
            Value::Text(_) => value,
            // `get users 42` on a Text key means the text "42"
            _ => Value::from(raw),
        },
        Some(column) => coerce(value, column.column_type),
        None => value,
    }
}

fn coerce(value: Value, target: ColumnType) -> Value {
    value.promote_to(target).unwrap_or(value)
}
