use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use swh_webhooks_sdk::client::collect_pages;
use swh_webhooks_sdk::objects::{EndpointMessageOut, MessageAttemptListOptions, MessageIn};
use swh_webhooks_sdk::signature::WebhookSecret;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::{SWH_EVENT_HEADER, Webhooks, WebhooksError};
use crate::entities::{Endpoint, SentEvent, app_name_and_uid, gen_uuid};

impl Webhooks {
    /// Send an event to the endpoints of its event type.
    ///
    /// The payload is validated against the event-type schema first. Only
    /// endpoints listening to `channel`, or to no channel at all, receive
    /// it. Returns the message id and timestamp assigned by Svix.
    pub async fn event_send(
        &self,
        event_type_name: &str,
        payload: &Value,
        channel: Option<&str>,
    ) -> Result<(String, OffsetDateTime), WebhooksError> {
        let event_type = self.event_type_get(event_type_name).await?;
        event_type.validate_payload(payload)?;

        let (_, app_uid) = app_name_and_uid(event_type_name);
        let message = self
            .client
            .message_create(
                &app_uid,
                &MessageIn {
                    event_type: event_type_name.to_owned(),
                    payload: payload.clone(),
                    channels: channel.map(|name| vec![gen_uuid(name)]),
                    payload_retention_period: self.config.event_retention_period,
                },
            )
            .await?;
        info!(
            event_type = %event_type_name,
            channel = ?channel,
            msg_id = %message.id,
            "Event sent"
        );
        Ok((message.id, message.timestamp))
    }

    /// List the recent delivery attempts to an endpoint.
    ///
    /// The request each attempt made is rebuilt from the message payload,
    /// signature headers included, as the endpoint received it.
    pub async fn sent_events_list(
        &self,
        endpoint: &Endpoint,
        before: Option<OffsetDateTime>,
        after: Option<OffsetDateTime>,
    ) -> Result<Vec<SentEvent>, WebhooksError> {
        let secret = WebhookSecret::new(&self.endpoint_get_secret(endpoint).await?)?;

        let (_, app_uid) = app_name_and_uid(&endpoint.event_type_name);
        let endpoint_uid = endpoint.uid();
        let options = |iterator| MessageAttemptListOptions {
            iterator,
            limit: None,
            before,
            after,
        };

        let messages: HashMap<String, EndpointMessageOut> = collect_pages(|iterator| {
            self.client
                .attempted_messages_list(&app_uid, &endpoint_uid, options(iterator))
        })
        .await?
        .into_iter()
        .map(|message| (message.id.clone(), message))
        .collect();

        let attempts = collect_pages(|iterator| {
            self.client
                .attempts_list_by_endpoint(&app_uid, &endpoint_uid, options(iterator))
        })
        .await?;
        debug!(
            %endpoint,
            messages = messages.len(),
            attempts = attempts.len(),
            "Listed sent events"
        );

        Ok(attempts
            .into_iter()
            .map(|attempt| {
                let message = messages.get(&attempt.msg_id);
                let payload = message
                    .map(|m| m.payload.clone())
                    .filter(|payload| !payload.is_null())
                    .unwrap_or_else(|| Value::Object(Default::default()));
                let channel = endpoint
                    .channel
                    .clone()
                    .filter(|_| message.is_some_and(|m| m.channels.is_some()));

                let body = payload.to_string();
                let timestamp = attempt.timestamp.unix_timestamp();
                let headers = BTreeMap::from([
                    ("Content-Length".to_owned(), body.len().to_string()),
                    ("Content-Type".to_owned(), "application/json".to_owned()),
                    ("Webhook-Id".to_owned(), attempt.msg_id.clone()),
                    ("Webhook-Timestamp".to_owned(), timestamp.to_string()),
                    (
                        "Webhook-Signature".to_owned(),
                        secret.sign(&attempt.msg_id, timestamp, &body),
                    ),
                    (SWH_EVENT_HEADER.to_owned(), endpoint.event_type_name.clone()),
                ]);

                SentEvent {
                    event_type_name: endpoint.event_type_name.clone(),
                    endpoint_url: attempt.url,
                    channel,
                    headers,
                    msg_id: attempt.msg_id,
                    payload,
                    timestamp: attempt.timestamp,
                    response: attempt.response,
                    response_status_code: attempt.response_status_code,
                }
            })
            .collect())
    }
}
