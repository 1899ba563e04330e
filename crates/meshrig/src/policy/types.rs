//! Wire types of the policy/telemetry API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute bag sent with check and report calls.
pub type Attributes = Map<String, Value>;

/// One received telemetry report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub attributes: Attributes,
    pub received_at: DateTime<Utc>,
}

impl Report {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            received_at: Utc::now(),
        }
    }

    /// String value of attribute `name`, if present.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// `POST /check` request body.
#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub code: i32,
}

/// `POST /check` response body.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub status: CheckStatus,
    pub valid_duration: String,
    pub valid_use_count: u32,
}

impl CheckResponse {
    pub fn with_code(code: i32) -> Self {
        Self {
            status: CheckStatus { code },
            valid_duration: "60s".to_string(),
            valid_use_count: 10_000,
        }
    }
}

/// `POST /report` request body: one attribute set or a batch.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub attributes: ReportAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReportAttributes {
    Batch(Vec<Attributes>),
    Single(Attributes),
}

impl ReportAttributes {
    pub fn into_vec(self) -> Vec<Attributes> {
        match self {
            ReportAttributes::Batch(batch) => batch,
            ReportAttributes::Single(single) => vec![single],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportCount {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_request_batch_and_single() {
        let batch: ReportRequest =
            serde_json::from_str(r#"{"attributes": [{"a": 1}, {"b": 2}]}"#).unwrap();
        assert_eq!(batch.attributes.into_vec().len(), 2);

        let single: ReportRequest = serde_json::from_str(r#"{"attributes": {"a": 1}}"#).unwrap();
        assert_eq!(single.attributes.into_vec().len(), 1);
    }

    #[test]
    fn test_report_request_rejects_scalars() {
        assert!(serde_json::from_str::<ReportRequest>(r#"{"attributes": 3}"#).is_err());
        assert!(serde_json::from_str::<ReportRequest>(r#"{"attributes": [1]}"#).is_err());
        assert!(serde_json::from_str::<ReportRequest>(r#"{}"#).is_err());
    }

    #[test]
    fn test_report_display_is_json() {
        let mut attributes = Attributes::new();
        attributes.insert("destination.service".into(), "hello".into());
        let report = Report::new(attributes);

        let printed: Value = serde_json::from_str(&report.to_string()).unwrap();
        assert_eq!(printed["attributes"]["destination.service"], "hello");
        assert!(printed["received_at"].is_string());
        assert_eq!(report.attribute_str("destination.service"), Some("hello"));
    }

    #[test]
    fn test_check_response_shape() {
        let value = serde_json::to_value(CheckResponse::with_code(7)).unwrap();
        assert_eq!(value["status"]["code"], 7);
        assert_eq!(value["valid_duration"], "60s");
        assert_eq!(value["valid_use_count"], 10_000);
    }
}
