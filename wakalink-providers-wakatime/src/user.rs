use std::borrow::Cow;

use serde_json::{Map, Value};
use wakalink_core::document::{scalar_string, value_by_key};
use wakalink_core::ResourceOwner;

/// A WakaTime user, as returned by `GET /users/current`.
///
/// The profile lives under `data`; every accessor tolerates a missing or
/// malformed document and returns `None` instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct WakaTimeUser {
    response: Value,
}

impl WakaTimeUser {
    pub fn new(response: Value) -> Self {
        Self { response }
    }

    /// `data.id`
    pub fn id(&self) -> Option<String> {
        self.field("data.id")
    }

    /// `data.username`
    pub fn username(&self) -> Option<String> {
        self.field("data.username")
    }

    /// `data.email`, only present when the `email` scope was granted.
    pub fn email(&self) -> Option<String> {
        self.field("data.email")
    }

    /// The `data` object, or an empty map when it is missing.
    pub fn to_attributes(&self) -> Cow<'_, Map<String, Value>> {
        match value_by_key(&self.response, "data").and_then(Value::as_object) {
            Some(data) => Cow::Borrowed(data),
            None => Cow::Owned(Map::new()),
        }
    }

    /// The full response document.
    pub fn raw(&self) -> &Value {
        &self.response
    }

    fn field(&self, key: &str) -> Option<String> {
        value_by_key(&self.response, key).and_then(scalar_string)
    }
}

impl ResourceOwner for WakaTimeUser {
    fn id(&self) -> Option<String> {
        WakaTimeUser::id(self)
    }

    fn username(&self) -> Option<String> {
        WakaTimeUser::username(self)
    }

    fn email(&self) -> Option<String> {
        WakaTimeUser::email(self)
    }

    fn to_attributes(&self) -> Cow<'_, Map<String, Value>> {
        WakaTimeUser::to_attributes(self)
    }
}
