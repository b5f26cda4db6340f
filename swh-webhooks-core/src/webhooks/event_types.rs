use swh_webhooks_sdk::client::collect_pages;
use swh_webhooks_sdk::objects::{ApplicationIn, EventTypeIn, EventTypeListOptions, EventTypeUpdate};
use swh_webhooks_sdk::{EventType, default_event_types};
use tracing::{debug, info};

use super::{EVENT_TYPE_EXISTS, Webhooks, WebhooksError, or_not_found};
use crate::entities::app_name_and_uid;

impl Webhooks {
    /// Create or update an event type.
    ///
    /// The Svix application gathering the endpoints of the event type is
    /// created along with it. An archived event type is restored.
    pub async fn event_type_create(&self, event_type: &EventType) -> Result<(), WebhooksError> {
        event_type.check()?;

        let (app_name, app_uid) = app_name_and_uid(&event_type.name);
        self.client
            .application_get_or_create(&ApplicationIn {
                name: app_name,
                uid: Some(app_uid),
            })
            .await?;

        match self.client.event_type_create(&EventTypeIn::from(event_type)).await {
            Ok(_) => info!(event_type = %event_type.name, "Event type created"),
            Err(e) if e.svix_code() == Some(EVENT_TYPE_EXISTS) => {
                self.client
                    .event_type_update(&event_type.name, &EventTypeUpdate::from(event_type))
                    .await?;
                info!(event_type = %event_type.name, "Event type updated");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Get an active event type by its name.
    pub async fn event_type_get(&self, name: &str) -> Result<EventType, WebhooksError> {
        let event_type = self
            .client
            .event_type_get(name)
            .await
            .map_err(|e| or_not_found(e, || WebhooksError::EventTypeNotFound(name.to_owned())))?;
        if event_type.archived {
            return Err(WebhooksError::EventTypeArchived(name.to_owned()));
        }
        Ok(event_type.into_event_type())
    }

    /// List all registered and active event types.
    pub async fn event_types_list(&self) -> Result<Vec<EventType>, WebhooksError> {
        let event_types = collect_pages(|iterator| {
            self.client.event_type_list(EventTypeListOptions {
                iterator,
                with_content: true,
                ..Default::default()
            })
        })
        .await?;
        debug!(count = event_types.len(), "Listed event types");

        Ok(event_types
            .into_iter()
            .filter(|et| !et.archived)
            .map(|et| et.into_event_type())
            .collect())
    }

    /// Archive an event type.
    ///
    /// It is no longer listed and no event of that type can be sent anymore.
    /// Creating it again restores it.
    pub async fn event_type_delete(&self, name: &str) -> Result<(), WebhooksError> {
        self.client
            .event_type_delete(name)
            .await
            .map_err(|e| or_not_found(e, || WebhooksError::EventTypeNotFound(name.to_owned())))?;
        info!(event_type = %name, "Event type archived");
        Ok(())
    }

    /// Create or update the event types Software Heritage sends.
    pub async fn event_types_register_defaults(&self) -> Result<Vec<String>, WebhooksError> {
        let mut names = Vec::new();
        for event_type in default_event_types() {
            self.event_type_create(&event_type).await?;
            names.push(event_type.name);
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{event_type_json, mount_event_type, svix_error, webhooks_for};
    use super::*;
    use serde_json::json;
    use swh_webhooks_sdk::events::origin_visit;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_app(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/app/"))
            .and(body_partial_json(json!({
                "name": "origin.visit",
                "uid": crate::entities::gen_uuid("origin.visit")
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "app_1",
                "name": "origin.visit",
                "uid": crate::entities::gen_uuid("origin.visit")
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_event_type_create() {
        let server = MockServer::start().await;
        mount_app(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/event-type/"))
            .and(body_partial_json(json!({
                "name": "origin.visit",
                "schemas": {"1": origin_visit::schema()}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(event_type_json("origin.visit", false)))
            .expect(1)
            .mount(&server)
            .await;

        webhooks_for(&server)
            .event_type_create(&origin_visit::event_type())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_event_type_create_updates_existing() {
        let server = MockServer::start().await;
        mount_app(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/event-type/"))
            .respond_with(svix_error(409, "event_type_exists"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/event-type/origin.visit/"))
            .and(body_partial_json(json!({"archived": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_type_json("origin.visit", false)))
            .expect(1)
            .mount(&server)
            .await;

        webhooks_for(&server)
            .event_type_create(&origin_visit::event_type())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_event_type_create_rejects_bad_name_without_request() {
        let server = MockServer::start().await;
        let event_type = EventType::new("origin", "", origin_visit::schema());

        let err = webhooks_for(&server)
            .event_type_create(&event_type)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Event type name must be in the form '<group>.<event>'"
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_type_create_rejects_bad_schema() {
        let server = MockServer::start().await;
        let event_type = EventType::new("origin.visit", "", json!({"type": "obj"}));

        let err = webhooks_for(&server)
            .event_type_create(&event_type)
            .await
            .unwrap_err();
        assert!(matches!(err, WebhooksError::EventType(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_type_get() {
        let server = MockServer::start().await;
        mount_event_type(&server, "origin.visit").await;

        let event_type = webhooks_for(&server)
            .event_type_get("origin.visit")
            .await
            .unwrap();
        assert_eq!(
            event_type,
            EventType::new("origin.visit", "test event type", origin_visit::schema())
        );
    }

    #[tokio::test]
    async fn test_event_type_get_archived() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/event-type/origin.visit/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_type_json("origin.visit", true)))
            .mount(&server)
            .await;

        let err = webhooks_for(&server)
            .event_type_get("origin.visit")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Event type origin.visit is archived");
    }

    #[tokio::test]
    async fn test_event_type_get_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/event-type/origin.create/"))
            .respond_with(svix_error(404, "not_found"))
            .mount(&server)
            .await;

        let err = webhooks_for(&server)
            .event_type_get("origin.create")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Event type origin.create does not exist");
    }

    #[tokio::test]
    async fn test_event_types_list_skips_archived() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/event-type/"))
            .and(query_param("with_content", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    event_type_json("origin.visit", false),
                    event_type_json("origin.create", true),
                ],
                "iterator": null,
                "done": true
            })))
            .mount(&server)
            .await;

        let names: Vec<_> = webhooks_for(&server)
            .event_types_list()
            .await
            .unwrap()
            .into_iter()
            .map(|et| et.name)
            .collect();
        assert_eq!(names, ["origin.visit"]);
    }

    #[tokio::test]
    async fn test_event_type_delete_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/event-type/origin.create/"))
            .respond_with(svix_error(404, "not_found"))
            .mount(&server)
            .await;

        let err = webhooks_for(&server)
            .event_type_delete("origin.create")
            .await
            .unwrap_err();
        assert!(matches!(err, WebhooksError::EventTypeNotFound(name) if name == "origin.create"));
    }
}
