//! Message sending and delivery attempt listing.

use reqwest::Method;

use super::{ClientError, SvixClient, parse_response, segment};
use crate::objects::{
    EndpointMessageOut, ListResponse, MessageAttemptListOptions, MessageAttemptOut, MessageIn,
    MessageOut,
};

impl SvixClient {
    /// `POST /api/v1/app/{app}/msg/` – send a message to the endpoints of an
    /// application.
    pub async fn message_create(
        &self,
        app_id: &str,
        message: &MessageIn,
    ) -> Result<MessageOut, ClientError> {
        let resp = self
            .request(Method::POST, &format!("/api/v1/app/{}/msg/", segment(app_id)))?
            .json(message)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/app/{app}/endpoint/{endpoint}/msg/` – list the messages
    /// that were attempted to an endpoint, with their payload.
    pub async fn attempted_messages_list(
        &self,
        app_id: &str,
        endpoint_id: &str,
        options: MessageAttemptListOptions,
    ) -> Result<ListResponse<EndpointMessageOut>, ClientError> {
        let resp = self
            .request(
                Method::GET,
                &format!(
                    "/api/v1/app/{}/endpoint/{}/msg/",
                    segment(app_id),
                    segment(endpoint_id)
                ),
            )?
            .query(&options)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/app/{app}/attempt/endpoint/{endpoint}/` – list the
    /// delivery attempts made to an endpoint.
    pub async fn attempts_list_by_endpoint(
        &self,
        app_id: &str,
        endpoint_id: &str,
        options: MessageAttemptListOptions,
    ) -> Result<ListResponse<MessageAttemptOut>, ClientError> {
        let resp = self
            .request(
                Method::GET,
                &format!(
                    "/api/v1/app/{}/attempt/endpoint/{}/",
                    segment(app_id),
                    segment(endpoint_id)
                ),
            )?
            .query(&options)
            .send()
            .await?;

        parse_response(resp).await
    }
}
