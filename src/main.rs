use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

use dac2sql::{extract_dacpac, ExtractOptions};

#[derive(Parser)]
#[command(name = "dac2sql")]
#[command(author, version, about = "Split a SQL Server dacpac into per-object script files")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a .dacpac into a folder of .sql scripts
    Extract {
        /// Path to the .dacpac file
        #[arg(short, long)]
        dacpac: PathBuf,

        /// Directory the database folder is created in
        #[arg(short, long)]
        output: PathBuf,

        /// Name of the database folder (defaults to the dacpac file name)
        #[arg(long)]
        database_name: Option<String>,

        /// Write script files in parallel
        #[arg(long)]
        parallel: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            dacpac,
            output,
            database_name,
            parallel,
            verbose,
        } => {
            setup_logging(verbose, cli.log_format);

            let options = ExtractOptions {
                dacpac_path: dacpac,
                output_dir: output,
                database_name,
                parallel_writes: parallel,
            };

            let summary = extract_dacpac(options)?;
            println!(
                "Extracted {} files to {}",
                summary.files.len(),
                summary.output_root.display()
            );
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, format: LogFormat) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}
