use clap::{Parser as ClapParser, Subcommand};
use rolls_engine::cli::{self, CheckOptions, CliError, RunOptions};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "rolls")]
#[command(about = "Rolls - A small SQL-like query language for JSON documents")]
#[command(version)]
struct Cli {
    /// Log parsing and evaluation to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a query against a JSON data set
    Run {
        /// The query to execute
        query: String,

        /// JSON data set file (reads from stdin if not provided)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Path that identifies documents for KEYS
        #[arg(short, long)]
        key_path: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate a query and print it normalized
    Check {
        /// The query to validate
        query: String,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'rolls docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            query,
            data,
            key_path,
            pretty,
        } => run_query(query, data, key_path, pretty),
        Commands::Check { query } => cli::execute_check(&CheckOptions { query }).map(|normalized| {
            println!("{}", normalized);
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_query(
    query: String,
    data: Option<PathBuf>,
    key_path: Option<String>,
    pretty: bool,
) -> Result<(), CliError> {
    let data = match data {
        Some(path) => Some(fs::read_to_string(path)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer).filter(|buffer| !buffer.trim().is_empty())
        }
        None => None,
    };

    let options = RunOptions {
        query,
        data,
        key_path,
    };

    let output = cli::execute_run(&options)?;
    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }?;
    println!("{}", json);
    Ok(())
}
