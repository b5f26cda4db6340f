use std::io::Write;

use clap::{Args as ClapArgs, Subcommand};
use time::OffsetDateTime;

use super::endpoint::EndpointArgs;
use super::parse_datetime;
use crate::SvixOptions;

#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,
    /// Only list events sent before that date
    #[arg(short, long, value_parser = parse_datetime)]
    pub before: Option<OffsetDateTime>,
    /// Only list events sent after that date
    #[arg(short, long, value_parser = parse_datetime)]
    pub after: Option<OffsetDateTime>,
}

#[derive(Subcommand, Debug)]
pub enum SentEventsCommand {
    /// List recent events sent to an endpoint, one JSON document per line
    List(ListArgs),
}

impl SentEventsCommand {
    pub async fn run(self, svix: &SvixOptions, out: &mut dyn Write) -> anyhow::Result<()> {
        let webhooks = svix.connect()?;
        match self {
            SentEventsCommand::List(args) => {
                let sent_events = webhooks
                    .sent_events_list(&args.endpoint.endpoint(), args.before, args.after)
                    .await?;
                for sent_event in sent_events {
                    serde_json::to_writer(&mut *out, &sent_event)?;
                    writeln!(out)?;
                }
            }
        }
        Ok(())
    }
}
