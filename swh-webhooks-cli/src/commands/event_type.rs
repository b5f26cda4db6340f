use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use swh_webhooks_sdk::EventType;

use super::read_json;
use crate::SvixOptions;

#[derive(Subcommand, Debug)]
pub enum EventTypeCommand {
    /// Create or update a webhook event type
    Add {
        /// Event type name, in the form <group>.<event>
        name: String,
        /// Description of the event type
        description: String,
        /// JSON schema file of the event payload
        schema_file: PathBuf,
    },

    /// Get an active event type
    Get {
        name: String,
        /// Only print the JSON schema
        #[arg(short, long)]
        dump_schema: bool,
    },

    /// List active event types
    List,

    /// Archive an event type
    Delete { name: String },

    /// Create or update the event types sent by Software Heritage
    RegisterDefaults,
}

impl EventTypeCommand {
    pub async fn run(self, svix: &SvixOptions, out: &mut dyn Write) -> anyhow::Result<()> {
        let webhooks = svix.connect()?;
        match self {
            EventTypeCommand::Add {
                name,
                description,
                schema_file,
            } => {
                let schema = read_json(&schema_file, "SCHEMA_FILE")?;
                webhooks
                    .event_type_create(&EventType::new(name, description, schema))
                    .await?;
            }
            EventTypeCommand::Get { name, dump_schema } => {
                let event_type = webhooks.event_type_get(&name).await?;
                if dump_schema {
                    writeln!(out, "{}", event_type.schema)?;
                } else {
                    writeln!(out, "{}\n", event_type.description)?;
                    let schema = serde_json::to_string_pretty(&event_type.schema)
                        .context("failed to format schema")?;
                    writeln!(out, "{schema}")?;
                }
            }
            EventTypeCommand::List => {
                for event_type in webhooks.event_types_list().await? {
                    writeln!(out, "{}: {}", event_type.name, event_type.description)?;
                }
            }
            EventTypeCommand::Delete { name } => {
                webhooks.event_type_delete(&name).await?;
            }
            EventTypeCommand::RegisterDefaults => {
                for name in webhooks.event_types_register_defaults().await? {
                    writeln!(out, "{name}")?;
                }
            }
        }
        Ok(())
    }
}
