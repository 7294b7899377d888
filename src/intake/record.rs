//! Inquiry record handed to the inquiry sink on final submit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every field gathered by the intake form, merged across stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryRecord {
    pub fields: Map<String, Value>,
    pub submitted_at: DateTime<Utc>,
}

impl InquiryRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            submitted_at: Utc::now(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Text value of a field, if present and a string
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}
