use std::io::Write;

use clap::{Args as ClapArgs, Subcommand};
use swh_webhooks_core::Endpoint;

use crate::SvixOptions;

/// An endpoint as designated on the command line.
#[derive(ClapArgs, Debug, Clone)]
pub struct EndpointArgs {
    /// Name of the event type the endpoint receives
    pub event_type_name: String,
    /// URL of the endpoint
    pub url: String,
    /// Channel the endpoint listens to
    #[arg(short, long)]
    pub channel: Option<String>,
}

impl EndpointArgs {
    pub fn endpoint(&self) -> Endpoint {
        let endpoint = Endpoint::new(&self.url, &self.event_type_name);
        match &self.channel {
            Some(channel) => endpoint.with_channel(channel),
            None => endpoint,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    /// Name of the event type
    pub event_type_name: String,
    /// Only list endpoints listening to this channel, endpoints listening to
    /// no channel are always listed
    #[arg(short, long)]
    pub channel: Option<String>,
    /// List endpoints in the order they were created
    #[arg(short, long)]
    pub ascending_order: bool,
    /// Maximum number of endpoints to list
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum EndpointCommand {
    /// Create an endpoint receiving the events of an event type
    Create(EndpointArgs),

    /// List the endpoints receiving an event type, one URL per line
    List(ListArgs),

    /// Get the secret an endpoint uses to verify webhook signatures
    GetSecret(EndpointArgs),

    /// Delete an endpoint
    Delete(EndpointArgs),
}

impl EndpointCommand {
    pub async fn run(self, svix: &SvixOptions, out: &mut dyn Write) -> anyhow::Result<()> {
        let webhooks = svix.connect()?;
        match self {
            EndpointCommand::Create(args) => {
                webhooks.endpoint_create(&args.endpoint()).await?;
            }
            EndpointCommand::List(args) => {
                let endpoints = webhooks
                    .endpoints_list(
                        &args.event_type_name,
                        args.channel.as_deref(),
                        args.ascending_order,
                        args.limit,
                    )
                    .await?;
                for endpoint in endpoints {
                    writeln!(out, "{}", endpoint.url)?;
                }
            }
            EndpointCommand::GetSecret(args) => {
                let secret = webhooks.endpoint_get_secret(&args.endpoint()).await?;
                writeln!(out, "{secret}")?;
            }
            EndpointCommand::Delete(args) => {
                webhooks.endpoint_delete(&args.endpoint()).await?;
            }
        }
        Ok(())
    }
}
