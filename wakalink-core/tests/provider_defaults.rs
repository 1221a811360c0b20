use std::borrow::Cow;

use async_trait::async_trait;
use serde_json::{Map, Value};
use wakalink_core::{
    AccessToken, AuthError, BearerAuthorization, ClientCredentials, HttpRequest, HttpResponse,
    HttpTransport, IdentityProviderError, OAuthProvider, ResourceOwner, ReqwestTransport,
    TransportError,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct JsonProvider {
    credentials: ClientCredentials,
    transport: Box<dyn HttpTransport>,
    base_url: String,
}

impl JsonProvider {
    fn new(base_url: String) -> Self {
        Self {
            credentials: ClientCredentials::new("client", "secret", "http://localhost/callback"),
            transport: Box::new(ReqwestTransport::new()),
            base_url,
        }
    }
}

struct Owner(Value);

impl ResourceOwner for Owner {
    fn id(&self) -> Option<String> {
        self.0.get("sub").and_then(Value::as_str).map(str::to_string)
    }

    fn to_attributes(&self) -> Cow<'_, Map<String, Value>> {
        match self.0.as_object() {
            Some(map) => Cow::Borrowed(map),
            None => Cow::Owned(Map::new()),
        }
    }
}

impl BearerAuthorization for JsonProvider {}

#[async_trait]
impl OAuthProvider for JsonProvider {
    type ResourceOwner = Owner;

    fn provider_id(&self) -> &str {
        "json"
    }

    fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    fn base_authorization_url(&self) -> String {
        format!("{}/authorize?tenant=common", self.base_url)
    }

    fn base_access_token_url(&self) -> String {
        format!("{}/token", self.base_url)
    }

    fn resource_owner_details_url(&self, _token: &AccessToken) -> String {
        format!("{}/me", self.base_url)
    }

    fn default_scopes(&self) -> Vec<String> {
        vec!["openid".to_string(), "profile".to_string()]
    }

    fn scope_separator(&self) -> &str {
        " "
    }

    fn resource_owner_id_key(&self) -> Option<&str> {
        Some("user_id")
    }

    fn authorization_headers(&self, token: &AccessToken) -> Vec<(String, String)> {
        self.bearer_headers(token)
    }

    fn check_response(&self, response: &HttpResponse, data: &Value) -> Result<(), AuthError> {
        if response.status.is_client_error() || response.status.is_server_error() {
            return Err(IdentityProviderError::new(
                response.reason_phrase(),
                response.status.as_u16(),
                data.clone(),
            )
            .into());
        }
        Ok(())
    }

    fn create_resource_owner(&self, response: Value, _token: &AccessToken) -> Owner {
        Owner(response)
    }
}

struct FailingTransport;

#[async_trait]
impl HttpTransport for FailingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Other("connection refused".to_string()))
    }
}

#[test]
fn test_authorization_url_appends_to_existing_query() {
    let provider = JsonProvider::new("https://id.example.com".to_string());

    let url = provider.authorization_url("xyz", &[], Some("challenge"));

    let parsed = url::Url::parse(&url).unwrap();
    assert_eq!(parsed.path(), "/authorize");
    let query: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    assert!(query.contains(&("tenant".into(), "common".into())));
    assert!(query.contains(&("client_id".into(), "client".into())));
    assert!(query.contains(&("redirect_uri".into(), "http://localhost/callback".into())));
    assert!(query.contains(&("state".into(), "xyz".into())));
    assert!(query.contains(&("response_type".into(), "code".into())));
    assert!(query.contains(&("scope".into(), "openid profile".into())));
    assert!(query.contains(&("code_challenge".into(), "challenge".into())));
    assert!(query.contains(&("code_challenge_method".into(), "S256".into())));
}

#[tokio::test]
async fn test_json_token_exchange_and_resource_owner() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("Accept", "application/json"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=test_code"))
        .and(body_string_contains("client_secret=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "json_token",
            "expires_in": 60,
            "user_id": 99,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("Authorization", "Bearer json_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"sub": "user-99"})),
        )
        .mount(&server)
        .await;

    let provider = JsonProvider::new(server.uri());

    let token = provider
        .get_access_token("authorization_code", &[("code", "test_code")])
        .await
        .expect("Failed to exchange code");

    assert_eq!(token.token(), "json_token");
    assert_eq!(token.resource_owner_id(), Some("99"));
    assert_eq!(token.values()["token_type"], "Bearer");

    let owner = provider.get_resource_owner(&token).await.unwrap();
    assert_eq!(owner.id(), Some("user-99".to_string()));

    let identity = owner.to_identity(provider.provider_id()).unwrap();
    assert_eq!(identity.provider_id, "json");
    assert_eq!(identity.external_id, "user-99");
    assert_eq!(identity.attributes["sub"], "user-99");
}

#[tokio::test]
async fn test_form_content_type_is_decoded_by_default_parser() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "access_token=form_token&user_id=5",
                "application/x-www-form-urlencoded",
            ),
        )
        .mount(&server)
        .await;

    let provider = JsonProvider::new(server.uri());
    let token = provider
        .get_access_token("authorization_code", &[("code", "c")])
        .await
        .unwrap();

    assert_eq!(token.token(), "form_token");
    assert_eq!(token.resource_owner_id(), Some("5"));
}

#[tokio::test]
async fn test_non_object_token_body_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[\"not\", \"a\", \"map\"]"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let provider = JsonProvider::new(server.uri());

    let err = provider
        .get_access_token("authorization_code", &[("code", "c")])
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UnexpectedResponseFormat(_)));

    let err = provider
        .get_resource_owner(&AccessToken::new("t"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AuthError::UnexpectedResponseFormat(_)));
}

#[tokio::test]
async fn test_error_status_reaches_check_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let provider = JsonProvider::new(server.uri());
    let err = provider
        .get_access_token("authorization_code", &[("code", "c")])
        .await
        .unwrap_err();

    match err {
        AuthError::IdentityProvider(err) => {
            assert_eq!(err.status, 400);
            assert_eq!(err.message, "Bad Request");
            assert_eq!(err.body["error"], "invalid_grant");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_grant_fails_before_any_request() {
    let mut provider = JsonProvider::new("http://127.0.0.1:9".to_string());
    provider.transport = Box::new(FailingTransport);

    let err = provider
        .get_access_token("client_credentials", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidGrant(name) if name == "client_credentials"));

    let err = provider
        .get_access_token("authorization_code", &[("code", "c")])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Transport(TransportError::Other(msg)) if msg == "connection refused"
    ));
}
