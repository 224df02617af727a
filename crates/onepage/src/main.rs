//! onepage CLI - build a single-page site and pack it into one HTML file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use onepage_pack::PackError;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "onepage")]
#[command(about = "Build a single-page site and pack it into one timestamped HTML file")]
#[command(version)]
pub struct Cli {
    /// Defaults to `pack`
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to onepage.toml config file
    #[arg(short, long, default_value = "onepage.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project and pack the entry file into a timestamped artifact
    Pack {
        /// Remove the entry file and default template assets after packing
        #[arg(long)]
        inline: bool,

        /// Project root (defaults to config or the config file's directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// List packed artifacts, newest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Preview packed artifacts in a browser
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4173")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Write a default onepage.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let command = cli.command.unwrap_or(Commands::Pack {
        inline: false,
        root: None,
    });

    let result = match command {
        Commands::Pack { inline, root } => commands::pack::run(&cli.config, inline, root).await,
        Commands::List { json } => commands::list::run(&cli.config, json),
        Commands::Serve { port, no_open } => {
            commands::serve::run(&cli.config, port, !no_open).await
        }
        Commands::Init { yes } => commands::init::run(&cli.config, yes),
    };

    if let Err(err) = result {
        if let Some(code) = report_pack_error(&err) {
            std::process::exit(code);
        }
        return Err(err);
    }

    Ok(())
}

/// Log a pipeline error and return the exit status it maps to.
///
/// Returns `None` for errors that did not come from the pipeline.
fn report_pack_error(err: &anyhow::Error) -> Option<i32> {
    let pack_err = err.downcast_ref::<PackError>()?;
    match pack_err {
        // The build already streamed its own output.
        PackError::BuildFailure { .. } => tracing::debug!("{}", pack_err),
        _ => tracing::error!("{}", pack_err),
    }
    Some(pack_err.exit_code())
}
