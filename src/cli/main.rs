//! CLI binary entry point for xml2sql

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use xml2sql::cli::commands::analyze::{AnalyzeArgs, handle_analyze};
#[cfg(feature = "cli")]
use xml2sql::cli::commands::ddl::{DdlArgs, handle_ddl};
#[cfg(feature = "cli")]
use xml2sql::cli::commands::export::{ExportArgs, handle_export};
#[cfg(feature = "cli")]
use xml2sql::cli::commands::init::{InitArgs, handle_init};
#[cfg(feature = "cli")]
use xml2sql::cli::error::CliError;
#[cfg(feature = "cli")]
use xml2sql::cli::flags::{MappingFlags, NamespaceFlags};
#[cfg(feature = "cli")]
use xml2sql::database::{Destination, ExportConfig};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "xml2sql")]
#[command(about = "Derive a relational schema from XML documents and load them into SQL")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding .xml2sql.toml (default: current directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Print the schema tree of a document with its default selection
    Analyze {
        /// XML document
        input: PathBuf,
        #[command(flatten)]
        namespaces: NamespaceFlags,
        /// Save the default selection as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print DROP/CREATE TABLE statements for a document
    Ddl {
        /// XML document
        input: PathBuf,
        /// Selection file (from `analyze -o`)
        #[arg(short, long)]
        selection: Option<PathBuf>,
        #[command(flatten)]
        mapping: MappingFlags,
        /// Write the script to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create the schema and load one or more documents
    Export {
        /// XML documents; the first one defines the schema
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Destination: '-', file:///<path>, duckdb:///<path> or sqlite:///<path>
        #[arg(short, long)]
        to: Option<String>,
        /// Selection file (from `analyze -o`)
        #[arg(short, long)]
        selection: Option<PathBuf>,
        #[command(flatten)]
        mapping: MappingFlags,
        /// Only insert rows into an existing schema, continuing its keys
        #[arg(long)]
        data_only: bool,
    },
    /// Write a sample .xml2sql.toml into the config directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<(), CliError> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => std::env::current_dir()
            .map_err(|e| CliError::ConfigError(format!("No working directory: {}", e)))?,
    };
    let load_config =
        || ExportConfig::load(&config_dir).map_err(|e| CliError::ConfigError(e.to_string()));

    match cli.command {
        Commands::Analyze {
            input,
            namespaces,
            output,
            json,
        } => {
            let config = load_config()?;
            handle_analyze(&AnalyzeArgs {
                input,
                ignore_ns: namespaces.resolve(config.mapping.ignore_ns),
                output,
                json,
            })
        }
        Commands::Ddl {
            input,
            selection,
            mapping,
            output,
        } => {
            let options = mapping.resolve(load_config()?.mapping);
            handle_ddl(&DdlArgs {
                input,
                selection,
                ignore_ns: options.ignore_ns,
                full_name: options.full_name,
                output,
            })
        }
        Commands::Export {
            inputs,
            to,
            selection,
            mapping,
            data_only,
        } => {
            let config = load_config()?;
            let destination = match to {
                Some(to) => to.parse::<Destination>()?,
                None => config.destination().clone(),
            };
            let options = mapping.resolve(config.mapping);
            let summary = handle_export(&ExportArgs {
                inputs,
                destination: destination.clone(),
                selection,
                ignore_ns: options.ignore_ns,
                full_name: options.full_name,
                data_only,
            })?;

            if !destination.is_script() {
                eprintln!(
                    "Exported {} document(s) to {}: {} DDL, {} INSERT statements",
                    summary.documents,
                    destination,
                    summary.ddl_statements,
                    summary.insert_statements
                );
            }
            Ok(())
        }
        Commands::Init { force } => {
            let path = handle_init(&InitArgs {
                dir: config_dir.clone(),
                force,
            })?;
            eprintln!("Configuration written to {}", path.display());
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
