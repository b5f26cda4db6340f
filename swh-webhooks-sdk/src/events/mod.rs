//! Event types published by Software Heritage.

pub mod origin_visit;

use crate::event_type::EventType;

/// All event-type descriptors shipped with this crate, in registration order.
pub fn default_event_types() -> Vec<EventType> {
    vec![origin_visit::event_type()]
}

/// Look up a shipped descriptor by name.
pub fn find_event_type(name: &str) -> Option<EventType> {
    default_event_types().into_iter().find(|et| et.name == name)
}
