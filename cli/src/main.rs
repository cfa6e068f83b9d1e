//! EDE CLI - Watch development-environment ports
//!
//! A command-line front end for the port watch engine: run the watcher,
//! inspect the current port state and tunnel descriptors, and manage the
//! configuration file.

mod commands;
mod notifier;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ede_core::SamplerKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ede")]
#[command(author, version, about = "Watch development-environment ports")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ~/.ede/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Ports to watch, e.g. 3000,8080-8090
    #[arg(long, global = true)]
    ports: Option<String>,

    /// URI template with a {port} placeholder
    #[arg(long, global = true)]
    uri: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long, global = true)]
    interval_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch ports until Ctrl-C, printing a notification per opened port
    Watch {
        /// How to sample ports
        #[arg(long)]
        sampler: Option<SamplerKind>,
    },

    /// Sample once and show the state of every watched port
    #[command(alias = "ls")]
    List {
        /// How to sample ports
        #[arg(long)]
        sampler: Option<SamplerKind>,
    },

    /// Probe a single port
    Probe {
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        /// Host to connect to
        #[arg(long)]
        host: Option<String>,

        /// Connect timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Show the tunnel descriptor of every watched port
    Tunnels,

    /// Show the auto-forward action for a port
    Attributes { port: u16 },

    /// Resolve an ede:// remote authority
    ResolveAuthority { authority: String },

    /// Show the effective configuration
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = commands::Overrides {
        config_path: cli.config,
        ports: cli.ports,
        uri: cli.uri,
        interval_ms: cli.interval_ms,
    };

    match cli.command {
        Commands::Watch { sampler } => {
            commands::watch::run(&overrides, sampler, cli.json).await?;
        }
        Commands::List { sampler } => {
            commands::list::run(&overrides, sampler, cli.json).await?;
        }
        Commands::Probe {
            port,
            host,
            timeout_ms,
        } => {
            commands::probe::run(&overrides, port, host, timeout_ms, cli.json).await?;
        }
        Commands::Tunnels => {
            commands::tunnels::run(&overrides, cli.json).await?;
        }
        Commands::Attributes { port } => {
            commands::attributes::run(&overrides, port, cli.json).await?;
        }
        Commands::ResolveAuthority { authority } => {
            commands::authority::run(&authority, cli.json)?;
        }
        Commands::Config { init } => {
            if init {
                commands::config::init(&overrides).await?;
            } else {
                commands::config::show(&overrides, cli.json).await?;
            }
        }
    }

    Ok(())
}
