mod cli;
mod confstore;
mod fetch;
mod fsops;
mod install;
mod layout;
mod runner;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use layout::Layout;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli)?;

    let layout = Layout::from_env();

    match cli.command {
        Commands::Version => {
            println!("xbox-extra v{}", env!("CARGO_PKG_VERSION"));
        }

        Commands::Install => {
            if let Err(e) = install::install(&layout).await {
                tracing::error!("Install failed: {:#}", e);
                std::process::exit(1);
            }
        }

        Commands::Uninstall => {
            install::uninstall(&layout)?;
        }

        Commands::Status => {
            install::status(&layout);
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "info"
    } else if cli.verbose == 1 {
        "debug"
    } else {
        "trace"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}
