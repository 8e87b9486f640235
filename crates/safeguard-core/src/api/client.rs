//! API client for communicating with the SAFE.Guard REST API.
//!
//! Every request passes through two interceptors:
//!
//! - outgoing: the bearer token is read from the session store right before
//!   sending and attached as `Authorization: Bearer <token>` when present
//! - incoming: a 401 clears the stored token and dispatches
//!   `GateEvent::SessionExpired` before the error reaches the caller. The
//!   login call is the exception.
//!
//! There are no automatic retries; each failure is reported once.

use std::time::Duration;

use reqwest::{header, Client, Method, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{Credentials, SessionStore};
use crate::config::Config;
use crate::gate::{GateEvent, NavigationGate};

use super::ApiError;

/// Login endpoint, relative to the base URL
pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// API client for SAFE.Guard.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    gate: NavigationGate,
}

impl ApiClient {
    /// Create a client for the configured server. The session store is the
    /// one owned by `gate`.
    pub fn new(config: &Config, gate: NavigationGate) -> Result<Self, ApiError> {
        Self::with_base_url(
            config.base_url(),
            Duration::from_secs(config.request_timeout_secs),
            gate,
        )
    }

    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        gate: NavigationGate,
    ) -> Result<Self, ApiError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: gate.session().clone(),
            gate,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn gate(&self) -> &NavigationGate {
        &self.gate
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Outgoing interceptor: fresh token from the store on every call
    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.token()? {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("Stored token is not a valid header".into()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Incoming interceptor. Returns the response if successful.
    async fn check_response(&self, response: Response) -> Result<Response, ApiError> {
        let result = Self::error_for_status(response).await;
        if let Err(ApiError::SessionExpired { .. }) = &result {
            warn!(url = %self.base_url, "Server rejected credentials, ending session");
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to clear stored token after 401");
            }
            self.gate.dispatch(GateEvent::SessionExpired);
        }
        result
    }

    async fn error_for_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    async fn dispatch_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        debug!(%method, url = %url, "Sending request");

        let mut request = self
            .client
            .request(method, &url)
            .headers(self.auth_headers()?);
        if let Some(body) = body {
            // .json() sets Content-Type: application/json
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let response = self.dispatch_request(method, path, body).await?;
        self.check_response(response).await
    }

    async fn read_json(response: Response) -> Result<Value, ApiError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON: {}", e)))
    }

    /// Untyped request. An empty success body comes back as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let response = self.send(method, path, body).await?;
        Self::read_json(response).await
    }

    pub async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        let value = Self::read_json(response).await?;
        serde_json::from_value(value).map_err(|e| {
            ApiError::InvalidResponse(format!("Unexpected response from {}: {}", path, e))
        })
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        let value = Self::read_json(response).await?;
        serde_json::from_value(value).map_err(|e| {
            ApiError::InvalidResponse(format!("Unexpected response from {}: {}", path, e))
        })
    }

    /// PUT, ignoring whatever the server sends back
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(Method::PUT, path, Some(body)).await?;
        Ok(())
    }

    /// POST, ignoring whatever the server sends back
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    pub async fn delete_path(&self, path: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Exchange credentials for a bearer token. Does not store it.
    ///
    /// A 401 here means wrong credentials, not an expired session, so the
    /// current session is left alone.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let response = self
            .dispatch_request(Method::POST, LOGIN_PATH, Some(credentials))
            .await?;
        let value = Self::read_json(Self::error_for_status(response).await?).await?;
        let response: LoginResponse = serde_json::from_value(value).map_err(|e| {
            ApiError::InvalidResponse(format!("Unexpected response from {}: {}", LOGIN_PATH, e))
        })?;
        response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("Login response has no token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;
    use crate::gate::AuthState;
    use crate::store::MemoryStore;

    fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
        let store = match token {
            Some(t) => MemoryStore::with_entries([("token", t)]),
            None => MemoryStore::new(),
        };
        let gate = NavigationGate::new(SessionStore::new(Arc::new(store)));
        ApiClient::with_base_url(&server.uri(), Duration::from_secs(5), gate).unwrap()
    }

    #[tokio::test]
    async fn test_attaches_stored_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/alertas"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Some("abc"));
        let value = api.get_value("/alertas").await.unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_token_read_fresh_each_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sensor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let api = client_for(&server, Some("first"));
        api.get_value("/sensor").await.unwrap();
        api.gate().session().save_token("second").unwrap();
        api.get_value("/sensor").await.unwrap();

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let auth: Vec<String> = requests
            .iter()
            .map(|r| r.headers.get("authorization").unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(auth, vec!["Bearer first", "Bearer second"]);
    }

    #[tokio::test]
    async fn test_no_token_no_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/estacoes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let api = client_for(&server, None);
        api.get_value("/estacoes").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_json_body_has_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/alertas"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"mensagem": "Chuva forte", "nivelRisco": "Alto"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Some("abc"));
        api.post_unit("/alertas", &json!({"mensagem": "Chuva forte", "nivelRisco": "Alto"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_401_clears_session_and_expires_gate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/leitura"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Some("stale"));
        api.gate().dispatch(GateEvent::TokenAccepted);
        let epoch = api.gate().epoch();

        let err = api.get_value("/leitura").await.unwrap_err();
        assert!(err.is_session_expired());
        assert!(!api.gate().session().has_token());
        assert_eq!(api.gate().state(), AuthState::Unauthenticated);
        assert_eq!(api.gate().epoch(), epoch + 1);
    }

    #[tokio::test]
    async fn test_other_errors_keep_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/sensor/4"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "Sensor em uso"})),
            )
            .mount(&server)
            .await;

        let api = client_for(&server, Some("abc"));
        api.gate().dispatch(GateEvent::TokenAccepted);

        match api.delete_path("/sensor/4").await {
            Err(ApiError::Http { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Sensor em uso");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(api.gate().session().has_token());
        assert_eq!(api.gate().state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/alertas/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = client_for(&server, Some("abc"));
        let value = api.request(Method::DELETE, "/alertas/1", None).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"username": "admin", "password": "admin"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
            .mount(&server)
            .await;

        let api = client_for(&server, None);
        let token = api.login(&Credentials::new("admin", "admin")).await.unwrap();
        assert_eq!(token, "abc");
        // Storing is the auth flow's job
        assert!(!api.gate().session().has_token());
    }

    #[tokio::test]
    async fn test_login_without_token_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": ""})))
            .mount(&server)
            .await;

        let api = client_for(&server, None);
        let err = api.login(&Credentials::new("admin", "admin")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_login_token_kept_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": " abc= "})))
            .mount(&server)
            .await;

        let api = client_for(&server, None);
        let token = api.login(&Credentials::new("admin", "admin")).await.unwrap();
        assert_eq!(token, " abc= ");
    }

    #[tokio::test]
    async fn test_login_whitespace_token_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "  \t"})))
            .mount(&server)
            .await;

        let api = client_for(&server, None);
        let err = api.login(&Credentials::new("admin", "admin")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_login_rejection_keeps_current_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Senha incorreta"})))
            .mount(&server)
            .await;

        let api = client_for(&server, Some("abc"));
        api.gate().dispatch(GateEvent::TokenAccepted);
        let epoch = api.gate().epoch();

        let err = api.login(&Credentials::new("admin", "wrong")).await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired { message: Some(ref m) } if m == "Senha incorreta"));
        assert_eq!(api.gate().state(), AuthState::Authenticated);
        assert_eq!(api.gate().epoch(), epoch);
        assert_eq!(api.gate().session().token().unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_no_retry_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/riscos"))
            .and(header_exists("accept"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Some("abc"));
        let err = api.get_value("/riscos").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
