//! Command handlers for Salt Courier CLI
//!
//! This module implements the handlers that coordinate between CLI
//! arguments, the configuration file and the job coordinator.

use std::io::{self, Write};

use tracing::{debug, info, warn};

use crate::app::{translate, Coordinator, CoordinatorConfig, SaltClient};
use crate::auth::resolve_credentials;
use crate::cli::Cli;
use crate::config::AppConfig;
use crate::errors::{ConfigError, Result};
use crate::output::{OutputKind, OutputPolicy, Palette};

/// Print the known output kinds
pub fn handle_out_list<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Known output kinds:")?;
    for kind in OutputKind::ALL {
        writeln!(out, "  {:<10} {}", kind.as_str(), kind.description())?;
    }
    Ok(())
}

/// Load the configuration named on the command line, or the default one
///
/// When no configuration file exists an example is printed to stderr
/// before the error is returned.
pub async fn load_config(cli: &Cli) -> Result<AppConfig> {
    match AppConfig::load(cli.config.clone()).await {
        Ok(config) => Ok(config),
        Err(e @ ConfigError::NotFound { .. }) => {
            eprintln!("{}", e);
            eprintln!();
            eprintln!("Create it with content like:");
            eprintln!();
            eprintln!("{}", AppConfig::example_content());
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run settings from the command line, falling back to the config file
pub fn coordinator_config(cli: &Cli, config: &AppConfig) -> CoordinatorConfig {
    CoordinatorConfig::default()
        .with_poll_budget(cli.timeout.unwrap_or(config.timeout))
        .with_output(OutputPolicy::new(cli.output.or(config.output)))
        .with_status(atty::is(atty::Stream::Stderr))
        .with_color(Palette::detect().is_colored())
}

/// Handle a salt command: translate, log in, submit, poll and render
pub async fn handle_run(cli: Cli, config: AppConfig) -> Result<()> {
    if let Some(path) = &cli.output_file {
        warn!(
            "--output-file is not implemented yet, writing to stdout instead of {}",
            path.display()
        );
    }

    // Translate before anything touches the network
    let payload = if cli.has_command() {
        Some(translate(&cli.command)?)
    } else {
        info!("No command given, showing login response only");
        None
    };
    if let Some(payload) = &payload {
        debug!("Call payload: {:?}", payload);
    }

    let profile = config.profile(&cli.profile)?;
    let credentials = resolve_credentials(&cli.profile, profile)?;
    let client = SaltClient::new(&profile.url, &config.client.to_runtime_config())?;
    info!("Using profile {} at {}", cli.profile, profile.url);

    let coordinator = Coordinator::new(coordinator_config(&cli, &config));
    let report = coordinator
        .run(client, &credentials, payload.as_ref(), io::stdout())
        .await?;

    info!(
        "Job run complete: {} lookups, {} events rendered as {}",
        report.poll.iterations, report.dispatch.rendered, report.dispatch.final_output
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("salt_courier").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_out_list_names_every_kind() {
        let mut buf = Vec::new();
        handle_out_list(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for kind in OutputKind::ALL {
            assert!(text.contains(kind.as_str()));
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = AppConfig {
            timeout: 10,
            output: Some(OutputKind::Yaml),
            ..AppConfig::default()
        };

        let from_config = coordinator_config(&cli(&[]), &config);
        assert_eq!(from_config.poll_budget, 10);
        assert_eq!(from_config.output.forced, Some(OutputKind::Yaml));

        let from_cli = coordinator_config(&cli(&["-t", "3", "-o", "profile"]), &config);
        assert_eq!(from_cli.poll_budget, 3);
        assert_eq!(from_cli.output.forced, Some(OutputKind::Profile));
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let cli = cli(&["-c", path.to_str().unwrap()]);
        let err = load_config(&cli).await.unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[tokio::test]
    async fn test_bad_command_fails_before_network() {
        let config = AppConfig::parse("[netapi]\nurl = \"http://127.0.0.1:9\"\n").unwrap();
        let err = handle_run(cli(&["salt", "-X", "*", "test.ping"]), config)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "command");
    }
}
