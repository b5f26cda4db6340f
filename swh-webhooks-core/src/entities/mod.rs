//! Domain objects layered over the Svix wire objects.

mod endpoint;
mod sent_event;

pub use endpoint::Endpoint;
pub use sent_event::SentEvent;

use uuid::Uuid;

/// UUIDv5 (DNS namespace) of `name`, as a hyphenated string.
///
/// Used for every identifier this project derives: application uids,
/// endpoint uids and channel names.
pub fn gen_uuid(name: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes()).to_string()
}

/// Name and uid of the Svix application gathering the endpoints of an
/// event type.
pub fn app_name_and_uid(event_type_name: &str) -> (String, String) {
    (event_type_name.to_owned(), gen_uuid(event_type_name))
}
