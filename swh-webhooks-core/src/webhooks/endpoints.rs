use std::collections::BTreeMap;

use swh_webhooks_sdk::objects::{EndpointHeadersIn, EndpointIn, EndpointListOptions, Ordering};
use tracing::{debug, info};

use super::{CONFLICT, SWH_EVENT_HEADER, Webhooks, WebhooksError, or_not_found};
use crate::entities::{Endpoint, app_name_and_uid};

impl Webhooks {
    /// Create an endpoint receiving the events of its event type.
    ///
    /// Creating an existing endpoint succeeds without changing it.
    pub async fn endpoint_create(&self, endpoint: &Endpoint) -> Result<(), WebhooksError> {
        self.event_type_get(&endpoint.event_type_name).await?;

        let (_, app_uid) = app_name_and_uid(&endpoint.event_type_name);
        let endpoint_uid = endpoint.uid();

        // Svix channel names are limited in length and charset, the UUID is
        // sent instead and the name is kept in the metadata
        let mut metadata = endpoint.metadata.clone();
        let channel_uid = endpoint.channel_uid();
        if let (Some(uid), Some(name)) = (&channel_uid, &endpoint.channel) {
            metadata.insert(uid.clone(), name.clone());
        }

        let endpoint_in = EndpointIn {
            url: endpoint.url.clone(),
            uid: Some(endpoint_uid.clone()),
            version: 1,
            filter_types: Some(vec![endpoint.event_type_name.clone()]),
            channels: channel_uid.map(|uid| vec![uid]),
            metadata,
        };
        match self.client.endpoint_create(&app_uid, &endpoint_in).await {
            Ok(_) => info!(%endpoint, "Endpoint created"),
            Err(e) if e.svix_code() == Some(CONFLICT) => debug!(%endpoint, "Endpoint already exists"),
            Err(e) => return Err(e.into()),
        }

        self.client
            .endpoint_update_headers(
                &app_uid,
                &endpoint_uid,
                &EndpointHeadersIn {
                    headers: BTreeMap::from([(
                        SWH_EVENT_HEADER.to_owned(),
                        endpoint.event_type_name.clone(),
                    )]),
                },
            )
            .await?;
        Ok(())
    }

    /// List the endpoints receiving an event type.
    ///
    /// Endpoints listening to no channel receive every event and are always
    /// listed. Those listening to a channel are listed only when `channel`
    /// names it. A `limit` of zero means no limit.
    pub async fn endpoints_list(
        &self,
        event_type_name: &str,
        channel: Option<&str>,
        ascending_order: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Endpoint>, WebhooksError> {
        self.event_type_get(event_type_name).await?;
        let (_, app_uid) = app_name_and_uid(event_type_name);

        let order = if ascending_order {
            Ordering::Ascending
        } else {
            Ordering::Descending
        };
        let limit = limit.filter(|limit| *limit > 0);

        let mut endpoints = Vec::new();
        let mut iterator = None;
        loop {
            let page = self
                .client
                .endpoint_list(
                    &app_uid,
                    EndpointListOptions {
                        iterator: iterator.take(),
                        limit: None,
                        order,
                    },
                )
                .await?;

            for endpoint in page.data {
                let receives_event_type = endpoint
                    .filter_types
                    .as_ref()
                    .is_some_and(|types| types.iter().any(|t| t == event_type_name));
                if !receives_event_type {
                    continue;
                }

                let mut metadata = endpoint.metadata;
                let endpoint_channel = endpoint
                    .channels
                    .as_ref()
                    .and_then(|channels| channels.first())
                    .and_then(|uid| metadata.remove(uid));
                if endpoint_channel.is_some() && endpoint_channel.as_deref() != channel {
                    continue;
                }

                endpoints.push(Endpoint {
                    url: endpoint.url,
                    event_type_name: event_type_name.to_owned(),
                    channel: endpoint_channel,
                    metadata,
                });
                if limit.is_some_and(|limit| endpoints.len() >= limit) {
                    return Ok(endpoints);
                }
            }

            if page.done || page.iterator.is_none() {
                break;
            }
            iterator = page.iterator;
        }
        Ok(endpoints)
    }

    /// Get the secret an endpoint uses to verify webhook signatures.
    pub async fn endpoint_get_secret(&self, endpoint: &Endpoint) -> Result<String, WebhooksError> {
        let (_, app_uid) = app_name_and_uid(&endpoint.event_type_name);
        let secret = self
            .client
            .endpoint_get_secret(&app_uid, &endpoint.uid())
            .await
            .map_err(|e| or_not_found(e, || WebhooksError::EndpointNotFound(endpoint.clone())))?;
        Ok(secret.key)
    }

    pub async fn endpoint_delete(&self, endpoint: &Endpoint) -> Result<(), WebhooksError> {
        self.event_type_get(&endpoint.event_type_name).await?;
        let (_, app_uid) = app_name_and_uid(&endpoint.event_type_name);
        self.client
            .endpoint_delete(&app_uid, &endpoint.uid())
            .await
            .map_err(|e| or_not_found(e, || WebhooksError::EndpointNotFound(endpoint.clone())))?;
        info!(%endpoint, "Endpoint deleted");
        Ok(())
    }
}
