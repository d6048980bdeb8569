use backoffice_error::ApiError;
use backoffice_settings::ApiSettings;
use backoffice_types::ApiEnvelope;
use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestType {
    fn method(&self) -> Method {
        match self {
            RequestType::Get => Method::GET,
            RequestType::Post => Method::POST,
            RequestType::Put => Method::PUT,
            RequestType::Patch => Method::PATCH,
            RequestType::Delete => Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Routes {
    UploadStart,
    UploadUrls,
    UploadFinalize,
    Users,
    User(String),
    UserBan(String),
    UserUnban(String),
    QrCodes,
    QrCode(String),
    Announcements,
    Announcement(String),
    Artists,
    Artist(String),
    PointModifications,
    RewardPolicies,
    RewardPolicy(String),
    Charts,
    Version,
}

impl Routes {
    pub fn path(&self) -> String {
        match self {
            Routes::UploadStart => "upload/multipart/start".to_string(),
            Routes::UploadUrls => "upload/multipart/urls".to_string(),
            Routes::UploadFinalize => "upload/multipart/finalize".to_string(),
            Routes::Users => "admin/users".to_string(),
            Routes::User(id) => format!("admin/users/{}", id),
            Routes::UserBan(id) => format!("admin/users/{}/ban", id),
            Routes::UserUnban(id) => format!("admin/users/{}/unban", id),
            Routes::QrCodes => "admin/qr-codes".to_string(),
            Routes::QrCode(id) => format!("admin/qr-codes/{}", id),
            Routes::Announcements => "admin/announcements".to_string(),
            Routes::Announcement(id) => format!("admin/announcements/{}", id),
            Routes::Artists => "admin/artists".to_string(),
            Routes::Artist(id) => format!("admin/artists/{}", id),
            Routes::PointModifications => "admin/point-modifications".to_string(),
            Routes::RewardPolicies => "admin/anniversary-rewards".to_string(),
            Routes::RewardPolicy(id) => format!("admin/anniversary-rewards/{}", id),
            Routes::Charts => "admin/charts".to_string(),
            Routes::Version => "version".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Bytes { data: Bytes, content_type: String },
}

/// Per-request headers (merged over the client defaults) and query parameters
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_headers(headers: HeaderMap) -> Self {
        Self {
            headers,
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// Headers carrying the console's `jwt` authorization scheme.
/// Callers attach these explicitly, the client never injects credentials
pub fn auth_headers(auth_token: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("jwt {}", auth_token))
            .map_err(|e| ApiError::Error(format!("Failed to create header with error: {}", e)))?,
    );
    Ok(headers)
}

/// Create a new HTTP client that can be shared across the api client and the uploader
pub fn build_http_client(settings: &ApiSettings) -> Result<Client, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client_builder =
        Client::builder().timeout(Duration::from_secs(settings.timeout_secs));
    let client = client_builder
        .default_headers(headers)
        .build()
        .map_err(|e| ApiError::Error(format!("Failed to create client with error: {}", e)))?;
    Ok(client)
}

pub fn to_body<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Error(format!("Failed to serialize request body: {}", e)))
}

async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}

#[derive(Debug, Clone)]
pub struct BackofficeApiClient {
    client: Client,
    base_url: String,
}

impl BackofficeApiClient {
    pub fn new(settings: &ApiSettings, client: &Client) -> Self {
        Self {
            client: client.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// An empty base endpoint means `path` is already an absolute url
    fn resolve_url(&self, path: &str, base_endpoint: Option<&str>) -> String {
        let base = base_endpoint.unwrap_or(&self.base_url);
        if base.is_empty() {
            return path.to_string();
        }

        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send a single request. Non-2xx responses are returned as
    /// `ApiError::Status` with the original status and body; nothing is retried.
    pub async fn request(
        &self,
        path: &str,
        request_type: RequestType,
        body: Option<RequestBody>,
        options: Option<RequestOptions>,
        base_endpoint: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Response, ApiError> {
        let url = self.resolve_url(path, base_endpoint);
        let options = options.unwrap_or_default();

        let mut builder = self
            .client
            .request(request_type.method(), &url)
            .headers(options.headers);

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }

        builder = match body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Bytes { data, content_type }) => {
                builder.header(CONTENT_TYPE, content_type).body(data)
            }
            None => builder,
        };

        debug!(method = ?request_type, url = %url, "Sending request");

        let response = cancellable(cancel, async {
            builder.send().await.map_err(|e| {
                error!(url = %url, "Failed to send request: {}", e);
                ApiError::Transport(e.to_string())
            })
        })
        .await
        .inspect_err(|e| {
            if e.is_cancelled() {
                warn!(url = %url, "Request cancelled before a response arrived");
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let read = cancellable(cancel, async {
                response
                    .text()
                    .await
                    .map_err(|e| ApiError::Transport(e.to_string()))
            })
            .await;

            let body = match read {
                Ok(body) => body,
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    warn!(url = %url, "Failed to read error response body: {}", e);
                    String::new()
                }
            };
            warn!(url = %url, status = status.as_u16(), "Request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Read a response body and unwrap the `{ "data": ... }` envelope
    pub async fn decode<T: DeserializeOwned>(
        response: Response,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        let bytes = cancellable(cancel, async {
            response
                .bytes()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))
        })
        .await?;

        let envelope = serde_json::from_slice::<ApiEnvelope<T>>(&bytes).map_err(|e| {
            error!("Failed to parse response: {}", e);
            ApiError::Decode(e.to_string())
        })?;

        Ok(envelope.data)
    }

    /// Authenticated JSON call against the api host
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        route: Routes,
        request_type: RequestType,
        body: Option<Value>,
        query: Vec<(String, String)>,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        let options = RequestOptions::with_headers(auth_headers(auth_token)?).with_query(query);

        let response = self
            .request(
                &route.path(),
                request_type,
                body.map(RequestBody::Json),
                Some(options),
                None,
                cancel,
            )
            .await?;

        Self::decode(response, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_types::Page;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    async fn setup_server() -> (ServerGuard, String) {
        let server = Server::new_async().await;
        let server_url = server.url();
        (server, server_url)
    }

    fn setup_client(base_url: &str) -> BackofficeApiClient {
        let settings = ApiSettings {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        };
        let client = build_http_client(&settings).unwrap();
        BackofficeApiClient::new(&settings, &client)
    }

    #[test]
    fn test_resolve_url() {
        let client = setup_client("http://localhost:8080/api/");
        assert_eq!(
            client.resolve_url("/admin/users", None),
            "http://localhost:8080/api/admin/users"
        );
        assert_eq!(
            client.resolve_url("https://s3.local/bucket/key?sig=1", Some("")),
            "https://s3.local/bucket/key?sig=1"
        );
        assert_eq!(
            client.resolve_url("files", Some("https://cdn.local")),
            "https://cdn.local/files"
        );
    }

    #[tokio::test]
    async fn test_absolute_url_with_empty_base_endpoint() {
        let (mut server, server_url) = setup_server().await;
        // base url points nowhere so a hit proves the absolute url was used
        let client = setup_client("http://127.0.0.1:9/api");

        let mock = server
            .mock("PUT", "/bucket/img/a.png")
            .match_query(Matcher::UrlEncoded(
                "X-Amz-Signature".to_string(),
                "abc".to_string(),
            ))
            .match_header("content-type", "image/png")
            .match_body("raw-bytes")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let url = format!("{}/bucket/img/a.png?X-Amz-Signature=abc", server_url);
        let response = client
            .request(
                &url,
                RequestType::Put,
                Some(RequestBody::Bytes {
                    data: Bytes::from_static(b"raw-bytes"),
                    content_type: "image/png".to_string(),
                }),
                None,
                Some(""),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_carries_status() {
        let (mut server, server_url) = setup_server().await;
        let client = setup_client(&format!("{}/api", server_url));

        let _mock = server
            .mock("GET", "/api/admin/users/u404")
            .with_status(404)
            .with_body(r#"{"message": "user not found"}"#)
            .create_async()
            .await;

        let err = client
            .request(
                &Routes::User("u404".to_string()).path(),
                RequestType::Get,
                None,
                None,
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        match err {
            ApiError::Status { body, .. } => assert!(body.contains("user not found")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_success_without_body() {
        let (mut server, server_url) = setup_server().await;
        let client = setup_client(&format!("{}/api", server_url));

        let _mock = server
            .mock("DELETE", "/api/admin/qr-codes/q1")
            .with_status(503)
            .create_async()
            .await;

        let err = client
            .request(
                &Routes::QrCode("q1".to_string()).path(),
                RequestType::Delete,
                None,
                None,
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 503);
                assert!(body.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_json_unwraps_envelope() {
        let (mut server, server_url) = setup_server().await;
        let client = setup_client(&format!("{}/api", server_url));

        let mock = server
            .mock("GET", "/api/admin/users")
            .match_header("authorization", "jwt T1")
            .match_header("accept", "application/json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".to_string(), "2".to_string()),
                Matcher::UrlEncoded("pageSize".to_string(), "10".to_string()),
            ]))
            .with_status(200)
            .with_body(
                json!({"data": {"items": [{"id": "u1"}, {"id": "u2"}], "total": 12}}).to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let page: Page<Value> = client
            .request_json(
                Routes::Users,
                RequestType::Get,
                None,
                vec![
                    ("page".to_string(), "2".to_string()),
                    ("pageSize".to_string(), "10".to_string()),
                ],
                "T1",
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_option_headers_merge_over_defaults() {
        let (mut server, server_url) = setup_server().await;
        let client = setup_client(&format!("{}/api", server_url));

        let mock = server
            .mock("GET", "/api/version")
            .match_header("accept", "text/plain")
            .match_header("x-console-page", "dashboard")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));
        headers.insert("x-console-page", HeaderValue::from_static("dashboard"));

        client
            .request(
                "version",
                RequestType::Get,
                None,
                Some(RequestOptions::with_headers(headers)),
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_envelope() {
        let (mut server, server_url) = setup_server().await;
        let client = setup_client(&format!("{}/api", server_url));

        let _mock = server
            .mock("GET", "/api/admin/artists/a1")
            .with_status(200)
            .with_body(r#"{"artist": {"id": "a1"}}"#)
            .create_async()
            .await;

        let result: Result<Value, ApiError> = client
            .request_json(
                Routes::Artist("a1".to_string()),
                RequestType::Get,
                None,
                Vec::new(),
                "T1",
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_cancelled_request_is_not_sent() {
        let (mut server, server_url) = setup_server().await;
        let client = setup_client(&format!("{}/api", server_url));

        let mock = server
            .mock("GET", "/api/admin/users")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .request("admin/users", RequestType::Get, None, None, None, &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = setup_client("http://127.0.0.1:9/api");

        let err = client
            .request(
                "admin/users",
                RequestType::Get,
                None,
                None,
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
    }
}
