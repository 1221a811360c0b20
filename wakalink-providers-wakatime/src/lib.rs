//! WakaTime OAuth2 provider.
//!
//! WakaTime's token endpoint answers with an `application/x-www-form-urlencoded`
//! body whatever `Content-Type` it declares, so token responses are always
//! decoded as a form. Profiles are fetched from `/users/current` with a bearer
//! token and wrapped in [`WakaTimeUser`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use wakalink_core::document::{parse_form_document, value_by_key};
use wakalink_core::{
    AccessToken, AuthError, BearerAuthorization, ClientCredentials, HttpResponse, HttpTransport,
    IdentityProviderError, OAuthProvider, ReqwestTransport,
};

mod user;

pub use user::WakaTimeUser;

const BASE_URL: &str = "https://wakatime.com";
const API_BASE_URL: &str = "https://wakatime.com/api/v1";

pub struct WakaTimeProvider {
    credentials: ClientCredentials,
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_base_url: String,
}

impl WakaTimeProvider {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self::from_credentials(ClientCredentials::new(
            client_id,
            client_secret,
            redirect_uri,
        ))
    }

    pub fn from_credentials(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            transport: Arc::new(ReqwestTransport::new()),
            base_url: BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    /// Reads `WAKATIME_CLIENT_ID`, `WAKATIME_CLIENT_SECRET` and `WAKATIME_REDIRECT_URI`.
    pub fn from_env() -> Result<Self, AuthError> {
        ClientCredentials::from_env("WAKATIME").map(Self::from_credentials)
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_test_urls(mut self, base_url: String, api_base_url: String) -> Self {
        self.base_url = base_url;
        self.api_base_url = api_base_url;
        self
    }

    /// The authorization endpoint.
    pub fn authorize_url(&self) -> String {
        format!("{}/oauth/authorize", self.base_url)
    }

    /// The token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }

    /// The current user endpoint. The token is attached as a header, not in the URL.
    pub fn resource_owner_url(&self, _token: &AccessToken) -> String {
        format!("{}/users/current", self.api_base_url)
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, AuthError> {
        self.get_access_token("authorization_code", &[("code", code)])
            .await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        self.get_access_token("refresh_token", &[("refresh_token", refresh_token)])
            .await
    }
}

impl BearerAuthorization for WakaTimeProvider {}

#[async_trait]
impl OAuthProvider for WakaTimeProvider {
    type ResourceOwner = WakaTimeUser;

    fn provider_id(&self) -> &str {
        "wakatime"
    }

    fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    fn base_authorization_url(&self) -> String {
        self.authorize_url()
    }

    fn base_access_token_url(&self) -> String {
        self.token_url()
    }

    fn resource_owner_details_url(&self, token: &AccessToken) -> String {
        self.resource_owner_url(token)
    }

    // The `email` scope must be requested explicitly to receive `data.email`.
    fn default_scopes(&self) -> Vec<String> {
        Vec::new()
    }

    // The token body carries `uid`, but it is not surfaced as the resource owner id.
    fn resource_owner_id_key(&self) -> Option<&str> {
        None
    }

    fn authorization_headers(&self, token: &AccessToken) -> Vec<(String, String)> {
        self.bearer_headers(token)
    }

    fn parse_token_response(&self, response: &HttpResponse) -> Result<Value, AuthError> {
        Ok(Value::Object(parse_form_document(&response.body)))
    }

    fn check_response(&self, response: &HttpResponse, data: &Value) -> Result<(), AuthError> {
        if data.get("error").map_or(true, Value::is_null) {
            return Ok(());
        }

        let message = value_by_key(data, "error.message")
            .and_then(Value::as_str)
            .unwrap_or_else(|| response.reason_phrase());

        Err(IdentityProviderError::new(message, response.status.as_u16(), data.clone()).into())
    }

    fn create_resource_owner(&self, response: Value, _token: &AccessToken) -> WakaTimeUser {
        WakaTimeUser::new(response)
    }
}
