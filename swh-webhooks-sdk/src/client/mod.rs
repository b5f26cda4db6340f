//! HTTP client for the Svix REST API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod endpoint;
mod event_type;
mod message;
mod webhook;

pub use webhook::{verify_webhook, verify_webhook_json};

use std::future::Future;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use url::Url;

use crate::config::SvixConfig;
use crate::objects::{ApplicationIn, ApplicationOut, HttpErrorOut, ListResponse};

/// Errors produced by the Svix HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Svix server returned a non-2xx status code.
    #[error("Svix server returned error '{code}' with detail '{detail}'.")]
    Svix {
        status: StatusCode,
        code: String,
        detail: String,
    },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Svix error code (`not_found`, `conflict`, ...) if the server answered.
    pub fn svix_code(&self) -> Option<&str> {
        match self {
            ClientError::Svix { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Svix { status, .. } if *status == StatusCode::NOT_FOUND)
            || self.svix_code() == Some("not_found")
    }
}

/// Typed HTTP client for the Svix REST API.
///
/// Every request carries the bearer token of the configuration. Methods map
/// one-to-one to Svix API operations; higher level logic lives in
/// `swh-webhooks-core`.
#[derive(Debug, Clone)]
pub struct SvixClient {
    http: Client,
    base_url: Url,
    auth_token: String,
}

impl SvixClient {
    /// Create a new `SvixClient`.
    ///
    /// API paths are resolved under the path of the server URL, so Svix can
    /// be served behind a prefix such as `http://host/svix/`.
    pub fn new(config: &SvixConfig) -> Self {
        let mut base_url = config.server_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: Client::new(),
            base_url,
            auth_token: config.auth_token.clone(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        tracing::debug!(%method, %url, "svix request");
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&self.auth_token)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    /// `POST /api/v1/app/?get_if_exists=true` – get or create an application.
    pub async fn application_get_or_create(
        &self,
        app: &ApplicationIn,
    ) -> Result<ApplicationOut, ClientError> {
        let resp = self
            .request(Method::POST, "/api/v1/app/")?
            .query(&[("get_if_exists", "true")])
            .json(app)
            .send()
            .await?;

        parse_response(resp).await
    }
}

/// Percent-encode a path segment.
fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

async fn parse_empty(resp: reqwest::Response) -> Result<(), ClientError> {
    check_status(resp).await.map(|_| ())
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let (code, detail) = match serde_json::from_str::<HttpErrorOut>(&body) {
        Ok(err) => {
            let detail = err.detail_text();
            (err.code, detail)
        }
        Err(_) => (String::new(), body),
    };
    tracing::debug!(%status, %code, %detail, "svix error response");
    Err(ClientError::Svix {
        status,
        code,
        detail,
    })
}

/// Drain a paginated Svix listing.
///
/// `fetch` is called with the iterator of the previous page (`None` first)
/// until the server reports the listing is done.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ClientError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListResponse<T>, ClientError>>,
{
    let mut items = Vec::new();
    let mut iterator = None;
    loop {
        let page = fetch(iterator.take()).await?;
        items.extend(page.data);
        if page.done || page.iterator.is_none() {
            break;
        }
        iterator = page.iterator;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::EventTypeListOptions;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(super) fn client_for(server: &MockServer) -> SvixClient {
        let url = Url::parse(&server.uri()).unwrap();
        SvixClient::new(&SvixConfig::new(url, "test-token"))
    }

    #[tokio::test]
    async fn test_application_get_or_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/app/"))
            .and(query_param("get_if_exists", "true"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "app_1",
                "name": "origin.visit",
                "uid": "abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = client_for(&server)
            .application_get_or_create(&ApplicationIn {
                name: "origin.visit".to_owned(),
                uid: Some("abc".to_owned()),
            })
            .await
            .unwrap();
        assert_eq!(app.id, "app_1");
    }

    #[tokio::test]
    async fn test_server_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/svix/api/v1/app/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "app_1",
                "name": "origin.visit",
                "uid": "abc"
            })))
            .expect(2)
            .mount(&server)
            .await;

        for base in [format!("{}/svix/", server.uri()), format!("{}/svix", server.uri())] {
            let url = Url::parse(&base).unwrap();
            let client = SvixClient::new(&SvixConfig::new(url, "test-token"));
            assert_eq!(client.base_url().as_str(), format!("{}/svix/", server.uri()));
            client
                .application_get_or_create(&ApplicationIn {
                    name: "origin.visit".to_owned(),
                    uid: Some("abc".to_owned()),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/app/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": "authentication_failed",
                "detail": "Invalid token"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .application_get_or_create(&ApplicationIn {
                name: "x.y".to_owned(),
                uid: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.svix_code(), Some("authentication_failed"));
        assert_eq!(
            err.to_string(),
            "Svix server returned error 'authentication_failed' with detail 'Invalid token'."
        );
    }

    #[tokio::test]
    async fn test_collect_pages_follows_iterator() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/event-type/"))
            .and(query_param("iterator", "b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"name": "c.c", "description": ""}],
                "iterator": "c",
                "done": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/event-type/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"name": "a.a", "description": ""}, {"name": "b.b", "description": ""}],
                "iterator": "b",
                "done": false
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let all = collect_pages(|iterator| {
            client.event_type_list(EventTypeListOptions {
                iterator,
                with_content: true,
                ..Default::default()
            })
        })
        .await
        .unwrap();
        let names: Vec<_> = all.into_iter().map(|et| et.name).collect();
        assert_eq!(names, ["a.a", "b.b", "c.c"]);
    }
}
