//! # Wakalink Core
//!
//! `wakalink-core` provides the foundational traits and types for the wakalink OAuth2 client.
//! It defines the provider abstraction and the generic Authorization Code exchange that concrete
//! providers specialise.
//!
//! ## Key Components
//!
//! - **[`OAuthProvider`]**: A trait for implementing OAuth2 providers. Its provided methods build
//!   authorization URLs, exchange grants for tokens and fetch the resource owner.
//! - **[`AccessToken`]**: The token returned by a successful exchange.
//! - **[`ResourceOwner`]**: A read-only view over the authenticated user's profile.
//! - **[`HttpTransport`]**: The injectable HTTP capability used by providers.
//! - **[`AuthError`]**: A comprehensive error type for authentication-related issues.

#![warn(missing_docs)]

use std::borrow::Cow;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::{Map, Value};
use url::form_urlencoded;

/// Client credential configuration.
pub mod config;
/// Untyped document helpers (nested lookup, form decoding).
pub mod document;
/// Error types.
pub mod error;
/// OAuth2 grant types.
pub mod grant;
/// PKCE (Proof Key for Code Exchange) utilities.
pub mod pkce;
/// Identity and token types.
pub mod state;
/// HTTP transport abstraction.
pub mod transport;

pub use config::ClientCredentials;
pub use error::{AuthError, IdentityProviderError, TransportError};
pub use grant::Grant;
pub use pkce::Pkce;
pub use state::{AccessToken, Identity};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

pub use reqwest::{Method, StatusCode};

use document::{encode_form, parse_form_document, scalar_string};

/// Capability for providers that authenticate API requests with a bearer token.
pub trait BearerAuthorization {
    /// Headers carrying `token` as `Authorization: Bearer <token>`.
    fn bearer_headers(&self, token: &AccessToken) -> Vec<(String, String)> {
        vec![(
            AUTHORIZATION.to_string(),
            format!("Bearer {}", token.token()),
        )]
    }
}

/// The authenticated end-user, as returned by a provider.
pub trait ResourceOwner: Send + Sync {
    /// The user's identifier within the provider.
    fn id(&self) -> Option<String>;

    /// The user's username, if the provider exposes one.
    fn username(&self) -> Option<String> {
        None
    }

    /// The user's email address, if the provider exposes one.
    fn email(&self) -> Option<String> {
        None
    }

    /// The user's profile attributes.
    fn to_attributes(&self) -> Cow<'_, Map<String, Value>>;

    /// Maps the resource owner to a unified [`Identity`].
    ///
    /// Returns `None` when the owner has no id. Only scalar attributes are kept.
    fn to_identity(&self, provider_id: &str) -> Option<Identity> {
        let external_id = self.id()?;
        let attributes = self
            .to_attributes()
            .iter()
            .filter_map(|(key, value)| scalar_string(value).map(|value| (key.clone(), value)))
            .collect();

        Some(Identity {
            provider_id: provider_id.to_string(),
            external_id,
            email: self.email(),
            username: self.username(),
            attributes,
        })
    }
}

/// Trait for an OAuth2-compatible provider.
///
/// Implementors supply endpoints and response handling; the provided methods
/// drive the Authorization Code protocol.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// The resource owner type created from profile responses.
    type ResourceOwner: ResourceOwner;

    /// Get the provider identifier.
    fn provider_id(&self) -> &str;

    /// The client credentials used for token requests.
    fn credentials(&self) -> &ClientCredentials;

    /// The transport used for all requests.
    fn transport(&self) -> &dyn HttpTransport;

    /// The authorization endpoint, without query parameters.
    fn base_authorization_url(&self) -> String;

    /// The token endpoint.
    fn base_access_token_url(&self) -> String;

    /// The endpoint returning the resource owner's profile.
    fn resource_owner_details_url(&self, token: &AccessToken) -> String;

    /// Scopes requested when the caller names none.
    fn default_scopes(&self) -> Vec<String>;

    /// Separator used to join scopes.
    fn scope_separator(&self) -> &str {
        ","
    }

    /// Token response field holding the resource owner id, if any.
    fn resource_owner_id_key(&self) -> Option<&str> {
        None
    }

    /// Headers authenticating requests made with `token`.
    fn authorization_headers(&self, _token: &AccessToken) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Fails when `data` describes an error reported by the provider.
    fn check_response(&self, response: &HttpResponse, data: &Value) -> Result<(), AuthError>;

    /// Wraps a profile document into the provider's resource owner.
    fn create_resource_owner(&self, response: Value, token: &AccessToken) -> Self::ResourceOwner;

    /// Decodes a response body. JSON unless the response declares a form body.
    fn parse_response(&self, response: &HttpResponse) -> Result<Value, AuthError> {
        let is_form = response.content_type().is_some_and(|content_type| {
            content_type.contains("application/x-www-form-urlencoded")
        });
        if is_form {
            return Ok(Value::Object(parse_form_document(&response.body)));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            AuthError::UnexpectedResponseFormat(format!(
                "failed to parse response body ({}): {}",
                response.status, e
            ))
        })
    }

    /// Decodes a token endpoint response.
    fn parse_token_response(&self, response: &HttpResponse) -> Result<Value, AuthError> {
        self.parse_response(response)
    }

    /// Helper to get the authorization URL.
    fn authorization_url(
        &self,
        state: &str,
        scopes: &[&str],
        code_challenge: Option<&str>,
    ) -> String {
        let scope = if scopes.is_empty() {
            self.default_scopes().join(self.scope_separator())
        } else {
            scopes.join(self.scope_separator())
        };

        let credentials = self.credentials();
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("client_id", &credentials.client_id)
            .append_pair("redirect_uri", &credentials.redirect_uri)
            .append_pair("state", state)
            .append_pair("response_type", "code");
        if !scope.is_empty() {
            query.append_pair("scope", &scope);
        }
        if let Some(challenge) = code_challenge {
            query
                .append_pair("code_challenge", challenge)
                .append_pair("code_challenge_method", Pkce::METHOD);
        }

        let base = self.base_authorization_url();
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}", base, separator, query.finish())
    }

    /// Exchange a grant for an access token.
    ///
    /// `grant` is a grant type name such as `authorization_code`; `options`
    /// carries grant parameters such as `code`.
    async fn get_access_token(
        &self,
        grant: &str,
        options: &[(&str, &str)],
    ) -> Result<AccessToken, AuthError> {
        let grant: Grant = grant.parse()?;
        let credentials = self.credentials();
        let params = grant.prepare_parameters(
            &[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("redirect_uri", credentials.redirect_uri.as_str()),
            ],
            options,
        )?;

        let url = self.base_access_token_url();
        let body = encode_form(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let request = HttpRequest::post_form(url.as_str(), body)
            .header(ACCEPT.as_str(), "application/json");

        tracing::debug!(provider = self.provider_id(), %grant, %url, "requesting access token");
        let response = self.transport().send(request).await?;
        tracing::debug!(
            provider = self.provider_id(),
            status = %response.status,
            "token endpoint responded"
        );

        let parsed = self.parse_token_response(&response)?;
        if let Err(err) = self.check_response(&response, &parsed) {
            tracing::warn!(
                provider = self.provider_id(),
                status = %response.status,
                error = %err,
                "token request rejected"
            );
            return Err(err);
        }

        let Value::Object(fields) = parsed else {
            return Err(AuthError::UnexpectedResponseFormat(
                "token response is not a key/value document".to_string(),
            ));
        };
        AccessToken::from_response(&fields, self.resource_owner_id_key())
    }

    /// Fetch the raw resource owner document for `token`.
    async fn fetch_resource_owner_details(&self, token: &AccessToken) -> Result<Value, AuthError> {
        let url = self.resource_owner_details_url(token);
        let request = HttpRequest::get(url.as_str())
            .header(ACCEPT.as_str(), "application/json")
            .headers(self.authorization_headers(token));

        tracing::debug!(provider = self.provider_id(), %url, "requesting resource owner");
        let response = self.transport().send(request).await?;

        let parsed = self.parse_response(&response)?;
        if let Err(err) = self.check_response(&response, &parsed) {
            tracing::warn!(
                provider = self.provider_id(),
                status = %response.status,
                error = %err,
                "resource owner request rejected"
            );
            return Err(err);
        }

        if !parsed.is_object() {
            return Err(AuthError::UnexpectedResponseFormat(
                "resource owner response is not a JSON object".to_string(),
            ));
        }
        Ok(parsed)
    }

    /// Fetch the resource owner for `token`.
    async fn get_resource_owner(
        &self,
        token: &AccessToken,
    ) -> Result<Self::ResourceOwner, AuthError> {
        let details = self.fetch_resource_owner_details(token).await?;
        Ok(self.create_resource_owner(details, token))
    }
}
