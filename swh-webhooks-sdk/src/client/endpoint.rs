//! Endpoint operations, scoped to an application.

use reqwest::Method;

use super::{ClientError, SvixClient, parse_empty, parse_response, segment};
use crate::objects::{
    EndpointHeadersIn, EndpointIn, EndpointListOptions, EndpointOut, EndpointSecretOut,
    ListResponse,
};

impl SvixClient {
    /// `POST /api/v1/app/{app}/endpoint/` – create an endpoint.
    ///
    /// Fails with code `conflict` if an endpoint with the same uid exists.
    pub async fn endpoint_create(
        &self,
        app_id: &str,
        endpoint: &EndpointIn,
    ) -> Result<EndpointOut, ClientError> {
        let resp = self
            .request(Method::POST, &format!("/api/v1/app/{}/endpoint/", segment(app_id)))?
            .json(endpoint)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/app/{app}/endpoint/` – list one page of endpoints.
    pub async fn endpoint_list(
        &self,
        app_id: &str,
        options: EndpointListOptions,
    ) -> Result<ListResponse<EndpointOut>, ClientError> {
        let resp = self
            .request(Method::GET, &format!("/api/v1/app/{}/endpoint/", segment(app_id)))?
            .query(&options)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `PUT /api/v1/app/{app}/endpoint/{endpoint}/headers/` – set the extra
    /// HTTP headers sent with every delivery.
    pub async fn endpoint_update_headers(
        &self,
        app_id: &str,
        endpoint_id: &str,
        headers: &EndpointHeadersIn,
    ) -> Result<(), ClientError> {
        let resp = self
            .request(
                Method::PUT,
                &format!(
                    "/api/v1/app/{}/endpoint/{}/headers/",
                    segment(app_id),
                    segment(endpoint_id)
                ),
            )?
            .json(headers)
            .send()
            .await?;

        parse_empty(resp).await
    }

    /// `GET /api/v1/app/{app}/endpoint/{endpoint}/secret/` – get the signing
    /// secret of an endpoint.
    pub async fn endpoint_get_secret(
        &self,
        app_id: &str,
        endpoint_id: &str,
    ) -> Result<EndpointSecretOut, ClientError> {
        let resp = self
            .request(
                Method::GET,
                &format!(
                    "/api/v1/app/{}/endpoint/{}/secret/",
                    segment(app_id),
                    segment(endpoint_id)
                ),
            )?
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `DELETE /api/v1/app/{app}/endpoint/{endpoint}/` – delete an endpoint.
    pub async fn endpoint_delete(&self, app_id: &str, endpoint_id: &str) -> Result<(), ClientError> {
        let resp = self
            .request(
                Method::DELETE,
                &format!(
                    "/api/v1/app/{}/endpoint/{}/",
                    segment(app_id),
                    segment(endpoint_id)
                ),
            )?
            .send()
            .await?;

        parse_empty(resp).await
    }
}
