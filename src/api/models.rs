use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request body for `RedshiftData.ExecuteStatement`
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ExecuteStatementInput {
    pub database: String,
    pub sql: String,

    /// Serverless target. Exactly one of this and `cluster_identifier` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_identifier: Option<String>,
}

/// Response body for `RedshiftData.ExecuteStatement`
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ExecuteStatementOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workgroup_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_identifier: Option<String>,
}

/// Request body for `RedshiftData.DescribeStatement`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeStatementInput {
    pub id: String,
}

/// Response body for `RedshiftData.DescribeStatement`
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeStatementOutput {
    pub id: String,
    pub status: StatementStatus,
    /// Diagnostic text, populated when the statement aborted or failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_result_set: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_rows: Option<i64>,
    /// Elapsed time in nanoseconds as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
}

impl DescribeStatementOutput {
    pub fn new(id: impl Into<String>, status: StatementStatus) -> Self {
        Self {
            id: id.into(),
            status,
            error: None,
            has_result_set: None,
            result_rows: None,
            duration: None,
            query_string: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Execution status of a submitted statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementStatus {
    Submitted,
    Picked,
    Started,
    Finished,
    Aborted,
    Failed,
    /// Any status string this client does not know about. Treated as still running.
    #[serde(other)]
    Unknown,
}

impl StatementStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StatementStatus::Finished | StatementStatus::Aborted | StatementStatus::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementStatus::Submitted => "SUBMITTED",
            StatementStatus::Picked => "PICKED",
            StatementStatus::Started => "STARTED",
            StatementStatus::Finished => "FINISHED",
            StatementStatus::Aborted => "ABORTED",
            StatementStatus::Failed => "FAILED",
            StatementStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for `RedshiftData.GetStatementResult`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GetStatementResultInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// One page of a statement's result set.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct GetStatementResultOutput {
    #[serde(default)]
    pub column_metadata: Vec<ColumnMetadata>,
    #[serde(default)]
    pub records: Vec<Vec<Field>>,
    /// Present when more pages remain.
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub total_num_rows: Option<i64>,
}

/// Column description. Unlike the envelope, members are camelCase on the wire.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl ColumnMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// A single result cell: a union where exactly one member is present.
///
/// `Unknown` keeps the member name of anything this client cannot interpret.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Blob(Vec<u8>),
    Boolean(bool),
    Double(f64),
    Long(i64),
    String(String),
    IsNull(bool),
    Unknown(String),
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let members = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let Some((tag, value)) = members.into_iter().next() else {
            return Ok(Field::Unknown(String::new()));
        };

        let field = match tag.as_str() {
            "blobValue" => {
                let encoded: String = serde_json::from_value(value).map_err(de::Error::custom)?;
                Field::Blob(STANDARD.decode(encoded).map_err(de::Error::custom)?)
            }
            "booleanValue" => {
                Field::Boolean(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            "doubleValue" => Field::Double(serde_json::from_value(value).map_err(de::Error::custom)?),
            "longValue" => Field::Long(serde_json::from_value(value).map_err(de::Error::custom)?),
            "stringValue" => {
                Field::String(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            "isNull" => Field::IsNull(serde_json::from_value(value).map_err(de::Error::custom)?),
            _ => Field::Unknown(tag),
        };
        Ok(field)
    }
}

/// Errors raised at the Data API boundary.
#[derive(Error, Debug)]
pub enum DataApiError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(String),
}
