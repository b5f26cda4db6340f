use std::io::Write;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Subcommand;
use swh_webhooks_sdk::events::find_event_type;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use super::read_json;
use crate::SvixOptions;

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// Send an event to the endpoints of its event type
    Send {
        /// Name of the event type
        event_type_name: String,
        /// JSON payload file, `-` to read standard input
        payload_file: PathBuf,
        /// Only send the event to endpoints listening to this channel, and
        /// to those listening to no channel
        #[arg(short, long)]
        channel: Option<String>,
    },

    /// Validate a payload against a built-in event type, without server
    Validate {
        /// Name of a built-in event type
        event_type_name: String,
        /// JSON payload file, `-` to read standard input
        payload_file: PathBuf,
    },
}

impl EventCommand {
    pub async fn run(self, svix: &SvixOptions, out: &mut dyn Write) -> anyhow::Result<()> {
        match self {
            EventCommand::Send {
                event_type_name,
                payload_file,
                channel,
            } => {
                let webhooks = svix.connect()?;
                let payload = read_json(&payload_file, "PAYLOAD_FILE")?;
                let (msg_id, timestamp) = webhooks
                    .event_send(&event_type_name, &payload, channel.as_deref())
                    .await?;
                let timestamp = timestamp.format(&Rfc3339)?;
                info!(%msg_id, %timestamp, "Event queued for delivery");
            }
            EventCommand::Validate {
                event_type_name,
                payload_file,
            } => {
                let event_type = find_event_type(&event_type_name)
                    .ok_or_else(|| anyhow!("Event type {event_type_name} is not built in"))?;
                let payload = read_json(&payload_file, "PAYLOAD_FILE")?;
                event_type.validate_payload(&payload)?;
                writeln!(out, "Payload is a valid {event_type_name} event")?;
            }
        }
        Ok(())
    }
}
