//! Wakalink is a small OAuth2 Authorization Code client for Rust.
//!
//! This crate serves as a facade, re-exporting functionality from the other `wakalink-*` crates
//! based on enabled features.

pub use wakalink_core as core;

pub use wakalink_core::{AccessToken, AuthError, Identity, OAuthProvider, ResourceOwner};

#[cfg(feature = "flow")]
pub use wakalink_flow as flow;

#[cfg(feature = "flow")]
pub use wakalink_flow::OAuth2Flow;

/// Authentication providers.
pub mod providers {
    #[cfg(feature = "wakatime")]
    pub use wakalink_providers_wakatime as wakatime;
}
