//! Query/form field values and uploaded file descriptors.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// A query or form field: a single value, or a list for `name[]` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    /// The value if this is a single field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Single(value) => Some(value),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(values) => Some(values),
            FieldValue::Single(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::List(values)
    }
}

/// Named fields, ordered by name.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Parse an `application/x-www-form-urlencoded` string.
///
/// Keys ending in `[]` accumulate into a list under the bare name; any other
/// repeated key keeps its last value.
pub fn parse_form(input: &[u8]) -> FieldMap {
    let mut fields = FieldMap::new();
    for (key, value) in form_urlencoded::parse(input) {
        match key.strip_suffix("[]") {
            Some(name) => match fields.get_mut(name) {
                Some(FieldValue::List(values)) => values.push(value.into_owned()),
                _ => {
                    fields.insert(name.to_string(), FieldValue::List(vec![value.into_owned()]));
                }
            },
            None => {
                fields.insert(key.to_string(), FieldValue::Single(value.into_owned()));
            }
        }
    }
    fields
}

/// Encode fields as a form-urlencoded string; lists are written as `name[]`.
pub fn encode_form(fields: &FieldMap) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        match value {
            FieldValue::Single(v) => {
                serializer.append_pair(name, v);
            }
            FieldValue::List(values) => {
                let key = format!("{}[]", name);
                for v in values {
                    serializer.append_pair(&key, v);
                }
            }
        }
    }
    serializer.finish()
}

/// An uploaded file, already stored by whoever decoded the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// File name as sent by the client.
    pub file_name: String,

    /// Content type as sent by the client.
    #[serde(default)]
    pub content_type: Option<String>,

    /// Where the upload was stored.
    pub temp_path: PathBuf,

    /// Size in bytes.
    #[serde(default)]
    pub size: u64,

    /// Upload failure reported by the decoder, if any.
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadedFile {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
