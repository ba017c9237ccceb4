//! Construction-time overrides.
//!
//! Whatever gathers request data from its surroundings (a server adapter, a
//! test, a JSON fixture) hands it over as a [`RequestOverrides`] bag. Every
//! present key wins over the value derived from the URL or the defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::request::fields::{FieldMap, UploadedFile};

/// Values that override the URL and defaults when building a request.
///
/// Keys use the names `method`, `scheme`, `user`, `pass`, `host`, `port`,
/// `path`, `basePath`, `scriptPath`, `search`, `headers`, `post`, `files`,
/// `payload` and `params` when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestOverrides {
    pub method: Option<String>,
    pub scheme: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub base_path: Option<String>,
    pub script_path: Option<String>,
    pub search: Option<FieldMap>,
    pub headers: Option<BTreeMap<String, String>>,
    pub post: Option<FieldMap>,
    pub files: Option<BTreeMap<String, UploadedFile>>,
    #[serde(deserialize_with = "payload_from_text")]
    pub payload: Option<Vec<u8>>,
    pub params: Option<BTreeMap<String, String>>,
}

impl RequestOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn script_path(mut self, script_path: impl Into<String>) -> Self {
        self.script_path = Some(script_path.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

// Bodies in fixtures are text; raw bytes are set programmatically.
fn payload_from_text<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let text: Option<String> = Option::deserialize(deserializer)?;
    Ok(text.map(String::into_bytes))
}
