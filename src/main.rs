//! Salt Courier CLI application
//!
//! Command-line client for salt-api. Translates salt-style commands,
//! submits them, polls for completion and renders the results.

use std::io;
use std::process;

use tracing::{info, Level};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{fmt, EnvFilter};

use salt_courier::cli::{handle_out_list, handle_run, load_config, Cli};
use salt_courier::errors::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // set once the config is loaded
    let mut debug = false;
    let result = run(cli, &mut debug).await;

    if let Err(e) = result {
        if debug {
            eprintln!("Error ({}): {:?}", e.category(), e);
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli, debug: &mut bool) -> Result<()> {
    if cli.out_list {
        handle_out_list(&mut io::stdout())?;
        return Ok(());
    }

    let config = load_config(&cli).await?;
    *debug = config.debug;
    init_logging(cli.log_level(), &config.logging.level);

    info!("Salt Courier v{} starting", env!("CARGO_PKG_VERSION"));
    handle_run(cli, config).await
}

/// Initialize logging: `-L` first, then the config file, then warn
fn init_logging(cli_level: Option<Level>, config_level: &str) {
    let level = cli_level
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| config_level.to_lowercase());

    let filter = match format!("salt_courier={}", level).parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into()),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
