//! Tabula CLI
//!
//! One-shot command-line access to a Tabula data directory.

use clap::{Parser, Subcommand};
use tabula::{Config, Database, Field, Predicate, Record, TabulaError, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// Tabula CLI
#[derive(Parser, Debug)]
#[command(name = "tabula-cli")]
#[command(about = "CLI for the Tabula flat-file record store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./tabula_data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all tables
    Tables,

    /// Create a table
    Create {
        /// Table name
        table: String,

        /// Field definition as name:type (integer, string, timestamp)
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,

        /// Key field name
        #[arg(short, long)]
        key: String,
    },

    /// Drop a table
    Drop {
        /// Table name
        table: String,
    },

    /// Insert a record
    Insert {
        /// Table name
        table: String,

        /// Field assignment as name=value
        #[arg(short, long = "set")]
        values: Vec<String>,
    },

    /// Get a record by key
    Get {
        /// Table name
        table: String,

        /// Key value
        key: String,
    },

    /// Update fields of a record
    Update {
        /// Table name
        table: String,

        /// Key value
        key: String,

        /// Field assignment as name=value
        #[arg(short, long = "set")]
        values: Vec<String>,
    },

    /// Delete a record by key
    Delete {
        /// Table name
        table: String,

        /// Key value
        key: String,
    },

    /// Print records matching all predicates
    Query {
        /// Table name
        table: String,

        /// Predicate such as "age>=21"
        #[arg(short, long = "where")]
        predicates: Vec<String>,
    },

    /// Delete records matching all predicates
    DeleteWhere {
        /// Table name
        table: String,

        /// Predicate such as "age>=21"
        #[arg(short, long = "where")]
        predicates: Vec<String>,
    },

    /// Print the row count of a table
    Count {
        /// Table name
        table: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tabula=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> tabula::Result<()> {
    let config = Config::builder().data_dir(&args.data_dir).build();
    let db = Database::open(config)?;

    match args.command {
        Commands::Tables => {
            let mut names = db.get_table_names();
            names.sort();
            for name in names {
                println!("{}", name);
            }
        }
        Commands::Create { table, fields, key } => {
            let fields = fields
                .iter()
                .map(|def| parse_field(def))
                .collect::<tabula::Result<Vec<_>>>()?;
            db.create_table(&table, fields, &key)?;
            println!("created {}", table);
        }
        Commands::Drop { table } => {
            db.delete_table(&table)?;
            println!("dropped {}", table);
        }
        Commands::Insert { table, values } => {
            let location = db.insert(&table, parse_assignments(&values)?)?;
            println!("inserted at row {}", location.row);
        }
        Commands::Get { table, key } => {
            let record = db.get(&table, key)?;
            println!("{}", serde_json::to_string(&record)?);
        }
        Commands::Update { table, key, values } => {
            db.update(&table, key, parse_assignments(&values)?)?;
            println!("updated");
        }
        Commands::Delete { table, key } => {
            db.delete(&table, key)?;
            println!("deleted");
        }
        Commands::Query { table, predicates } => {
            for record in db.query(&table, &parse_predicates(&predicates)?)? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        Commands::DeleteWhere { table, predicates } => {
            let deleted = db.delete_where(&table, &parse_predicates(&predicates)?)?;
            println!("deleted {}", deleted);
        }
        Commands::Count { table } => {
            println!("{}", db.count(&table)?);
        }
    }

    db.close()
}

/// Parse `name:type`
fn parse_field(def: &str) -> tabula::Result<Field> {
    let (name, tag) = def
        .split_once(':')
        .ok_or_else(|| TabulaError::InvalidSchema(format!("expected name:type, got '{}'", def)))?;
    Ok(Field::new(name.trim(), tag.parse()?))
}

/// Parse `name=value` pairs; values are coerced against the schema later
fn parse_assignments(pairs: &[String]) -> tabula::Result<Record> {
    pairs
        .iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| TabulaError::UnknownColumn(pair.clone()))?;
            Ok((name.trim().to_string(), Value::from(value)))
        })
        .collect()
}

fn parse_predicates(exprs: &[String]) -> tabula::Result<Vec<Predicate>> {
    exprs.iter().map(|e| Predicate::parse(e)).collect()
}
