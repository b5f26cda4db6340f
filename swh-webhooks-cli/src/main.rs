//! Software Heritage webhooks management
//!
//! Command line interface over a Svix server: event types, endpoints, events
//! and deployment checks.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use swh_webhooks_core::Webhooks;
use swh_webhooks_core::config::{CONFIG_FILENAME_ENV, ConfigError, ConfigLoader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commands::{deploy, endpoint, event, event_type, sent_events};

/// Software Heritage Webhooks management built on top of the open-source
/// framework Svix.
#[derive(Parser, Debug)]
#[command(name = "swh-webhooks")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    svix: SvixOptions,

    #[command(subcommand)]
    command: Command,
}

/// How to reach the Svix server.
#[derive(clap::Args, Debug, Clone, Default)]
struct SvixOptions {
    /// Configuration file
    #[arg(short = 'C', long, env = CONFIG_FILENAME_ENV, global = true)]
    config_file: Option<PathBuf>,

    /// URL of the Svix server to use if not provided in configuration file
    #[arg(short = 'u', long, env = "SVIX_URL", global = true)]
    svix_url: Option<String>,

    /// Bearer token required to communicate with Svix REST API, used if not
    /// provided in configuration file
    #[arg(short = 't', long, env = "SVIX_TOKEN", global = true, hide_env_values = true)]
    svix_token: Option<String>,
}

impl SvixOptions {
    fn connect(&self) -> Result<Webhooks, ConfigError> {
        let loader = ConfigLoader::new(self.config_file.as_ref())
            .with_svix_server_url(self.svix_url.clone())
            .with_svix_auth_token(self.svix_token.clone());
        Webhooks::from_loader(&loader)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage webhook event types
    #[command(subcommand)]
    EventType(event_type::EventTypeCommand),

    /// Manage webhook endpoints
    #[command(subcommand)]
    Endpoint(endpoint::EndpointCommand),

    /// Send and validate events
    #[command(subcommand)]
    Event(event::EventCommand),

    /// Inspect events sent to endpoints
    #[command(subcommand)]
    SentEvents(sent_events::SentEventsCommand),

    /// Check the Svix server deployment
    #[command(subcommand)]
    Deploy(deploy::DeployCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    let mut stdout = std::io::stdout().lock();
    match commands::run(args, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr, stdout is kept for command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,swh_webhooks=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "swh-webhooks",
            "event-type",
            "list",
            "-u",
            "http://svix:8071",
            "-t",
            "token",
        ])
        .unwrap();
        assert_eq!(args.svix.svix_url.as_deref(), Some("http://svix:8071"));
        assert_eq!(args.svix.svix_token.as_deref(), Some("token"));
        assert!(matches!(
            args.command,
            Command::EventType(event_type::EventTypeCommand::List)
        ));
    }

    #[test]
    fn test_endpoint_list_options() {
        let args = Args::try_parse_from([
            "swh-webhooks",
            "-C",
            "/etc/swh/webhooks.yml",
            "endpoint",
            "list",
            "origin.visit",
            "--channel",
            "foo",
            "--ascending-order",
            "--limit",
            "5",
        ])
        .unwrap();
        assert_eq!(
            args.svix.config_file,
            Some(PathBuf::from("/etc/swh/webhooks.yml"))
        );
        let Command::Endpoint(endpoint::EndpointCommand::List(list)) = args.command else {
            unreachable!("parsed another command");
        };
        assert_eq!(list.event_type_name, "origin.visit");
        assert_eq!(list.channel.as_deref(), Some("foo"));
        assert!(list.ascending_order);
        assert_eq!(list.limit, Some(5));
    }

    #[test]
    fn test_missing_arguments_are_rejected() {
        assert!(Args::try_parse_from(["swh-webhooks", "event-type", "add", "origin.visit"]).is_err());
        assert!(Args::try_parse_from(["swh-webhooks", "endpoint", "create", "origin.visit"]).is_err());
        assert!(Args::try_parse_from(["swh-webhooks", "deploy", "check"]).is_err());
    }
}
