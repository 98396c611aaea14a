//! Core data types for the extraction pipeline.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Fixed output column order. Defines both the sheet header row and the
/// exported CSV header.
pub const HEADER: [&str; 8] = [
    "fileName",
    "fullName",
    "jobTitle",
    "companyName",
    "primaryEmail",
    "contactPhone",
    "websiteURL",
    "physicalAddress",
];

/// The seven fields the model is asked to produce (everything but `fileName`).
pub const CONTACT_FIELDS: [&str; 7] = [
    "fullName",
    "jobTitle",
    "companyName",
    "primaryEmail",
    "contactPhone",
    "websiteURL",
    "physicalAddress",
];

/// One image discovered by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    /// Opaque handle: an absolute path or a remote file id
    pub id: String,

    /// Human-readable name, used as `fileName` in the output row
    pub name: String,
}

impl ImageItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One extracted business card, in fixed column order.
///
/// Every field is a string; anything the model left out is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(rename = "fileName", default, deserialize_with = "lenient_string")]
    pub file_name: String,

    #[serde(rename = "fullName", default, deserialize_with = "lenient_string")]
    pub full_name: String,

    #[serde(rename = "jobTitle", default, deserialize_with = "lenient_string")]
    pub job_title: String,

    #[serde(rename = "companyName", default, deserialize_with = "lenient_string")]
    pub company_name: String,

    #[serde(rename = "primaryEmail", default, deserialize_with = "lenient_string")]
    pub primary_email: String,

    /// Every phone number on the card, comma-separated
    #[serde(rename = "contactPhone", default, deserialize_with = "lenient_string")]
    pub contact_phone: String,

    #[serde(rename = "websiteURL", default, deserialize_with = "lenient_string")]
    pub website_url: String,

    #[serde(rename = "physicalAddress", default, deserialize_with = "lenient_string")]
    pub physical_address: String,
}

impl ExtractionRecord {
    /// Parse a model response body, stamping `file_name` onto the result.
    ///
    /// Only a JSON object is accepted. Any parse failure yields no record.
    pub fn from_model_json(raw: &str, file_name: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw.trim())?;
        if !value.is_object() {
            return Err(de::Error::custom("expected a JSON object"));
        }
        let mut record: ExtractionRecord = serde_json::from_value(value)?;
        record.file_name = file_name.to_string();
        Ok(record)
    }

    /// The record as a row in [`HEADER`] order.
    pub fn to_row(&self) -> [String; 8] {
        [
            self.file_name.clone(),
            self.full_name.clone(),
            self.job_title.clone(),
            self.company_name.clone(),
            self.primary_email.clone(),
            self.contact_phone.clone(),
            self.website_url.clone(),
            self.physical_address.clone(),
        ]
    }
}

/// Accept strings, map `null` to "", join arrays (phone lists) with ", ",
/// and stringify other scalars. Nested objects are rejected.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Null => {}
                    Value::String(s) if s.trim().is_empty() => {}
                    Value::String(s) => parts.push(s),
                    Value::Number(n) => parts.push(n.to_string()),
                    Value::Bool(b) => parts.push(b.to_string()),
                    _ => return Err(de::Error::custom("expected a list of strings")),
                }
            }
            Ok(parts.join(", "))
        }
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Object(_) => Err(de::Error::custom("expected a string, found an object")),
    }
}

/// Run-local counters threaded back to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Number of items the source listed
    pub total: usize,

    /// Items extracted and written to the sink
    pub processed: usize,

    /// Items that failed without stopping the run
    pub errors: usize,
}

impl RunStats {
    /// Items that reached a per-item outcome.
    pub fn attempted(&self) -> usize {
        self.processed + self.errors
    }
}
