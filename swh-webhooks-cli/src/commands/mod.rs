pub mod deploy;
pub mod endpoint;
pub mod event;
pub mod event_type;
pub mod sent_events;

use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::{Args, Command};

/// Run a parsed command line, writing its output to `out`.
pub async fn run(args: Args, out: &mut dyn Write) -> anyhow::Result<()> {
    match args.command {
        Command::EventType(command) => command.run(&args.svix, out).await,
        Command::Endpoint(command) => command.run(&args.svix, out).await,
        Command::Event(command) => command.run(&args.svix, out).await,
        Command::SentEvents(command) => command.run(&args.svix, out).await,
        Command::Deploy(command) => command.run(out),
    }
}

/// Read a JSON document from a file, or from stdin if `path` is `-`.
pub fn read_json(path: &Path, argument: &str) -> anyhow::Result<Value> {
    let content = if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read standard input")?;
        content
    } else {
        std::fs::read_to_string(path).with_context(|| {
            format!("Invalid value for '{argument}': '{}'", path.display())
        })?
    };
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid value for '{argument}': not a JSON document"))
}

/// Parse a date given on the command line, as RFC 3339 or `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_datetime(value: &str) -> Result<OffsetDateTime, String> {
    if let Ok(datetime) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(datetime);
    }
    time::Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| format!("{value:?} is neither an RFC 3339 date-time nor a YYYY-MM-DD date"))
}
