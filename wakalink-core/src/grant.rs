use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AuthError;

/// OAuth2 grant types understood by the token exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grant {
    /// Authorization Code grant (RFC 6749 Section 4.1).
    AuthorizationCode,
    /// Refresh Token grant (RFC 6749 Section 6).
    RefreshToken,
}

impl Grant {
    /// The `grant_type` value sent to the token endpoint.
    pub fn name(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode => "authorization_code",
            Grant::RefreshToken => "refresh_token",
        }
    }

    /// Parameters the caller must supply for this grant.
    pub fn required_parameters(&self) -> &'static [&'static str] {
        match self {
            Grant::AuthorizationCode => &["code"],
            Grant::RefreshToken => &["refresh_token"],
        }
    }

    /// Builds the token request parameters.
    ///
    /// `grant_type` is added after `defaults`, and `options` override both.
    /// A required parameter counts as supplied even when its value is empty.
    pub fn prepare_parameters(
        &self,
        defaults: &[(&str, &str)],
        options: &[(&str, &str)],
    ) -> Result<BTreeMap<String, String>, AuthError> {
        for &required in self.required_parameters() {
            let supplied = options.iter().any(|(key, _)| *key == required);
            if !supplied {
                return Err(AuthError::MissingParameter(required));
            }
        }

        let mut params: BTreeMap<String, String> = defaults
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.insert("grant_type".to_string(), self.name().to_string());
        params.extend(options.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Ok(params)
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Grant {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Grant::AuthorizationCode),
            "refresh_token" => Ok(Grant::RefreshToken),
            other => Err(AuthError::InvalidGrant(other.to_string())),
        }
    }
}
