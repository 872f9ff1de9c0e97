use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

use crate::api::models::{DataApiError, ExecuteStatementInput, StatementStatus};
use crate::decode::DecodeMode;

/// Compute target statements run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Redshift Serverless workgroup name
    Workgroup(String),
    /// Provisioned cluster identifier
    Cluster(String),
}

impl ExecutionContext {
    /// Fills the target member of a submission request.
    pub(crate) fn apply(&self, input: &mut ExecuteStatementInput) {
        match self {
            ExecutionContext::Workgroup(name) => input.workgroup_name = Some(name.clone()),
            ExecutionContext::Cluster(id) => input.cluster_identifier = Some(id.clone()),
        }
    }
}

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub context: ExecutionContext,
    pub default_database: String,
    /// Sleep between two status polls.
    pub poll_interval: Duration,
    /// Give up after this many status polls. `None` polls until a terminal state.
    pub max_polls: Option<usize>,
    /// Give up once this much time has passed since the first poll. The last
    /// sleep is shortened so the final poll lands on the deadline.
    pub poll_timeout: Option<Duration>,
    pub decode_mode: DecodeMode,
}

impl ClientConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(context: ExecutionContext, default_database: impl Into<String>) -> Self {
        Self {
            context,
            default_database: default_database.into(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_polls: None,
            poll_timeout: None,
            decode_mode: DecodeMode::default(),
        }
    }

    /// Shorthand for a serverless workgroup target.
    pub fn workgroup(name: impl Into<String>, default_database: impl Into<String>) -> Self {
        Self::new(ExecutionContext::Workgroup(name.into()), default_database)
    }

    /// Builds a config from `REDSHIFT_WORKGROUP` (or `REDSHIFT_CLUSTER_IDENTIFIER`),
    /// `REDSHIFT_DATABASE` and the optional `REDSHIFT_POLL_INTERVAL_MS`.
    pub fn from_env() -> Result<Self> {
        let context = match (
            std::env::var("REDSHIFT_WORKGROUP"),
            std::env::var("REDSHIFT_CLUSTER_IDENTIFIER"),
        ) {
            (Ok(workgroup), _) => ExecutionContext::Workgroup(workgroup),
            (Err(_), Ok(cluster)) => ExecutionContext::Cluster(cluster),
            _ => {
                return Err(RedshiftDataError::Config(
                    "set REDSHIFT_WORKGROUP or REDSHIFT_CLUSTER_IDENTIFIER".to_string(),
                ))
            }
        };
        let database = std::env::var("REDSHIFT_DATABASE")
            .map_err(|_| RedshiftDataError::Config("set REDSHIFT_DATABASE".to_string()))?;

        let mut config = Self::new(context, database);
        if let Ok(raw) = std::env::var("REDSHIFT_POLL_INTERVAL_MS") {
            let millis: u64 = raw.parse().map_err(|e| {
                RedshiftDataError::Config(format!("REDSHIFT_POLL_INTERVAL_MS={}: {}", raw, e))
            })?;
            config.poll_interval = Duration::from_millis(millis);
        }
        Ok(config)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: usize) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = Some(poll_timeout);
        self
    }

    pub fn with_decode_mode(mut self, decode_mode: DecodeMode) -> Self {
        self.decode_mode = decode_mode;
        self
    }
}

/// A decoded result cell.
///
/// Serializes to the matching JSON type; bytes become a base64 string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bytes(Vec<u8>),
    Bool(bool),
    Double(f64),
    Long(i64),
    String(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Bytes(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::Long(v) => serializer.serialize_i64(*v),
            Value::String(v) => serializer.serialize_str(v),
        }
    }
}

/// One result row: column name to value, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column. A repeated column name keeps its first position and
    /// takes the new value, so serialized rows never carry duplicate keys.
    pub(crate) fn push(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub type Result<T> = std::result::Result<T, RedshiftDataError>;

/// Errors surfaced by the statement lifecycle, one variant per failing stage.
#[derive(Error, Debug)]
pub enum RedshiftDataError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("generate unload query: {0}")]
    Validation(String),

    #[error("execute statement: {0}")]
    Submission(#[source] DataApiError),

    #[error("watch statement {statement_id}: {source}")]
    PollTransport {
        statement_id: String,
        #[source]
        source: DataApiError,
    },

    #[error("watch statement {statement_id}: {status}: {message}")]
    TerminalFailure {
        statement_id: String,
        status: StatementStatus,
        message: String,
    },

    #[error("watch statement {statement_id}: still running after {polls} polls over {elapsed:?}")]
    PollLimitExceeded {
        statement_id: String,
        polls: usize,
        elapsed: Duration,
    },

    #[error("fetch result of statement {statement_id}: {source}")]
    Fetch {
        statement_id: String,
        #[source]
        source: DataApiError,
    },

    #[error("encode result: {0}")]
    Encoding(String),

    #[error("statement cancelled{}", .statement_id.as_ref().map(|id| format!(" ({})", id)).unwrap_or_default())]
    Cancelled { statement_id: Option<String> },
}

impl RedshiftDataError {
    /// Name of the lifecycle stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            RedshiftDataError::Config(_) => "config",
            RedshiftDataError::Validation(_) => "build",
            RedshiftDataError::Submission(_) => "execute",
            RedshiftDataError::PollTransport { .. }
            | RedshiftDataError::TerminalFailure { .. }
            | RedshiftDataError::PollLimitExceeded { .. } => "watch",
            RedshiftDataError::Fetch { .. } => "fetch",
            RedshiftDataError::Encoding(_) => "encode",
            RedshiftDataError::Cancelled { statement_id: None } => "execute",
            RedshiftDataError::Cancelled { statement_id: Some(_) } => "watch",
        }
    }
}
