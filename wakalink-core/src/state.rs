use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::scalar_string;
use crate::error::AuthError;

/// A unified identity structure returned by all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// The provider identifier (e.g., "wakatime")
    pub provider_id: String,
    /// The unique ID of the user within the provider's system
    pub external_id: String,
    /// The user's email address, if available and authorized
    pub email: Option<String>,
    /// The user's username or display name, if available
    pub username: Option<String>,
    /// Additional provider-specific attributes
    pub attributes: HashMap<String, String>,
}

/// An access token issued by an authorization server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    values: Map<String, Value>,
}

const ACCESS_TOKEN: &str = "access_token";
const REFRESH_TOKEN: &str = "refresh_token";
const EXPIRES_IN: &str = "expires_in";

impl AccessToken {
    /// Creates a token carrying only the access token value.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires: None,
            resource_owner_id: None,
            values: Map::new(),
        }
    }

    /// Builds a token from a decoded token response.
    ///
    /// `expires_in` is applied relative to now. When `resource_owner_id_key` is
    /// `None`, no resource owner id is recorded even if the response has one.
    pub fn from_response(
        response: &Map<String, Value>,
        resource_owner_id_key: Option<&str>,
    ) -> Result<Self, AuthError> {
        let access_token = response
            .get(ACCESS_TOKEN)
            .and_then(scalar_string)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AuthError::UnexpectedResponseFormat(
                    "required field not present: access_token".to_string(),
                )
            })?;

        let refresh_token = response.get(REFRESH_TOKEN).and_then(scalar_string);

        let expires = response
            .get(EXPIRES_IN)
            .and_then(expires_in_seconds)
            .and_then(Duration::try_seconds)
            .and_then(|offset| Utc::now().checked_add_signed(offset));

        let resource_owner_id = resource_owner_id_key
            .and_then(|key| response.get(key))
            .and_then(scalar_string);

        let values = response
            .iter()
            .filter(|(key, _)| {
                !matches!(key.as_str(), ACCESS_TOKEN | REFRESH_TOKEN | EXPIRES_IN)
                    && Some(key.as_str()) != resource_owner_id_key
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            access_token,
            refresh_token,
            expires,
            resource_owner_id,
            values,
        })
    }

    /// The access token value.
    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// The refresh token, if one was issued.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// When the access token expires, if known.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Whether the token is known to have expired.
    pub fn has_expired(&self) -> bool {
        self.expires.is_some_and(|expires| expires <= Utc::now())
    }

    /// The resource owner id reported with the token, if the provider maps one.
    pub fn resource_owner_id(&self) -> Option<&str> {
        self.resource_owner_id.as_deref()
    }

    /// Any other fields of the token response (e.g. `token_type`, `scope`).
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

fn expires_in_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
