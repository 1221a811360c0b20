//! # Wakalink Flow
//!
//! `wakalink-flow` orchestrates the OAuth2 Authorization Code flow on top of an
//! [`OAuthProvider`]: it generates the CSRF state, builds the redirect URL, and
//! turns the returned code into an [`Identity`] and an [`AccessToken`].
//!
//! ## Key Components
//!
//! - **[`OAuth2Flow`]**: Orchestrates the standard OAuth2 Authorization Code flow.

#![warn(missing_docs)]

use wakalink_core::{AccessToken, AuthError, Identity, OAuthProvider, ResourceOwner};

/// Orchestrates the standard OAuth2 Authorization Code flow.
pub struct OAuth2Flow<P: OAuthProvider> {
    provider: P,
    scopes: Vec<String>,
}

impl<P: OAuthProvider> OAuth2Flow<P> {
    /// Create a new `OAuth2Flow` with the given provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            scopes: Vec::new(),
        }
    }

    /// Set the scopes requested when the caller names none.
    pub fn with_scopes(mut self, scopes: Vec<impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(|s| s.into()).collect();
        self
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generates the redirect URL and CSRF state.
    pub fn initiate_login(
        &self,
        scopes: &[&str],
        pkce_challenge: Option<&str>,
    ) -> (String, String) {
        let state = uuid::Uuid::new_v4().to_string();

        let configured: Vec<&str> = self.scopes.iter().map(|s| s.as_str()).collect();
        let effective_scopes = if scopes.is_empty() {
            configured.as_slice()
        } else {
            scopes
        };

        let url = self
            .provider
            .authorization_url(&state, effective_scopes, pkce_challenge);
        tracing::debug!(provider = self.provider.provider_id(), "initiated login");
        (url, state)
    }

    /// Completes the flow by exchanging the code and fetching the resource owner.
    pub async fn finalize_login(
        &self,
        code: &str,
        received_state: &str,
        expected_state: &str,
        pkce_verifier: Option<&str>,
    ) -> Result<(Identity, AccessToken), AuthError> {
        if received_state != expected_state {
            tracing::warn!(
                provider = self.provider.provider_id(),
                "rejected callback with mismatched state"
            );
            return Err(AuthError::CsrfMismatch);
        }

        let mut options = vec![("code", code)];
        if let Some(verifier) = pkce_verifier {
            options.push(("code_verifier", verifier));
        }

        let token = self
            .provider
            .get_access_token("authorization_code", &options)
            .await?;
        let owner = self.provider.get_resource_owner(&token).await?;

        let identity = owner
            .to_identity(self.provider.provider_id())
            .ok_or_else(|| {
                AuthError::UnexpectedResponseFormat("resource owner has no id".to_string())
            })?;

        tracing::debug!(
            provider = self.provider.provider_id(),
            external_id = %identity.external_id,
            "finalized login"
        );
        Ok((identity, token))
    }

    /// Fetch the full resource owner for a token.
    pub async fn resource_owner(&self, token: &AccessToken) -> Result<P::ResourceOwner, AuthError> {
        self.provider.get_resource_owner(token).await
    }

    /// Refresh an access token using a refresh token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        self.provider
            .get_access_token("refresh_token", &[("refresh_token", refresh_token)])
            .await
    }
}
