//! Event-type registry operations.

use reqwest::Method;

use super::{ClientError, SvixClient, parse_empty, parse_response, segment};
use crate::objects::{EventTypeIn, EventTypeListOptions, EventTypeOut, EventTypeUpdate, ListResponse};

impl SvixClient {
    /// `POST /api/v1/event-type/` – register a new event type.
    ///
    /// Fails with code `event_type_exists` if the name is taken, archived
    /// event types included.
    pub async fn event_type_create(
        &self,
        event_type: &EventTypeIn,
    ) -> Result<EventTypeOut, ClientError> {
        let resp = self
            .request(Method::POST, "/api/v1/event-type/")?
            .json(event_type)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `PUT /api/v1/event-type/{name}/` – update an event type.
    pub async fn event_type_update(
        &self,
        name: &str,
        update: &EventTypeUpdate,
    ) -> Result<EventTypeOut, ClientError> {
        let resp = self
            .request(Method::PUT, &format!("/api/v1/event-type/{}/", segment(name)))?
            .json(update)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/event-type/{name}/` – get an event type, archived or not.
    pub async fn event_type_get(&self, name: &str) -> Result<EventTypeOut, ClientError> {
        let resp = self
            .request(Method::GET, &format!("/api/v1/event-type/{}/", segment(name)))?
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/event-type/` – list one page of event types.
    pub async fn event_type_list(
        &self,
        options: EventTypeListOptions,
    ) -> Result<ListResponse<EventTypeOut>, ClientError> {
        let resp = self
            .request(Method::GET, "/api/v1/event-type/")?
            .query(&options)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `DELETE /api/v1/event-type/{name}/` – archive an event type.
    pub async fn event_type_delete(&self, name: &str) -> Result<(), ClientError> {
        let resp = self
            .request(Method::DELETE, &format!("/api/v1/event-type/{}/", segment(name)))?
            .send()
            .await?;

        parse_empty(resp).await
    }
}
