//! Typed scalar field cells and the narrow capability seams the sync
//! engines work through.
//!
//! The engines never see a whole profile or employee record; they read and
//! write single named fields through `BasicFieldSource`/`BasicFieldSink`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scalar attribute value as the sync engines see it.
///
/// Equality is by value. An absent field is `None` at the trait surface,
/// and absent is distinct from an empty `Text` cell: a blank saved over a
/// missing value counts as a change and is logged as one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Flag(bool),
    Integer(i64),
    Json(serde_json::Value),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Audit-row rendering: text verbatim, dates ISO-8601, everything else
    /// in its canonical JSON form.
    pub fn stringify(&self) -> String {
        match self {
            FieldValue::Text(value) => value.clone(),
            FieldValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            FieldValue::Flag(value) => value.to_string(),
            FieldValue::Integer(value) => value.to_string(),
            FieldValue::Json(value) => value.to_string(),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Accepts ISO-8601 text as well, so values round-tripped through a
    /// JSON snapshot still land in date fields.
    pub fn into_date(self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(value) => Some(value),
            FieldValue::Text(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok(),
            _ => None,
        }
    }
}

/// Read access to named scalar fields, keyed by the owning side's
/// attribute names. `None` means the field is absent or unknown.
pub trait BasicFieldSource {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Write access to named scalar fields. A sink can always read back its
/// current values, which is what the diffing engines rely on.
pub trait BasicFieldSink: BasicFieldSource {
    /// Returns false when the name is not a writable field on this record.
    fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> bool;
}

/// Render an optional cell for an audit row.
pub fn stringify_opt(value: &Option<FieldValue>) -> Option<String> {
    value.as_ref().map(FieldValue::stringify)
}
