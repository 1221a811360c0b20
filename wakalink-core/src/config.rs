use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Client credentials registered with an authorization server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    /// The client identifier.
    pub client_id: String,
    /// The client secret.
    pub client_secret: String,
    /// The redirect URI registered for the client.
    pub redirect_uri: String,
}

impl ClientCredentials {
    /// Creates a new set of credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Reads `{PREFIX}_CLIENT_ID`, `{PREFIX}_CLIENT_SECRET` and
    /// `{PREFIX}_REDIRECT_URI` from the environment.
    pub fn from_env(prefix: &str) -> Result<Self, AuthError> {
        let var = |name: &str| {
            let key = format!("{prefix}_{name}");
            std::env::var(&key).map_err(|_| AuthError::Config(format!("{key} must be set")))
        };

        Ok(Self {
            client_id: var("CLIENT_ID")?,
            client_secret: var("CLIENT_SECRET")?,
            redirect_uri: var("REDIRECT_URI")?,
        })
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}
