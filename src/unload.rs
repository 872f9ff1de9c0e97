//! UNLOAD statement builder.
//!
//! Renders a query and an [`UnloadOption`] into a Redshift `UNLOAD` command
//! that exports the query result to S3.
//!
//! The builder is a plain text template. Neither the query, the destination
//! path nor the role is escaped, so callers must not interpolate untrusted
//! input into them.

use crate::models::{RedshiftDataError, Result};

/// Options of an `UNLOAD` export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnloadOption {
    /// Destination prefix, e.g. `s3://bucket/prefix/`. Required.
    pub s3_path: String,
    /// Rendered verbatim after `IAM_ROLE`; either `default` or a quoted role ARN.
    pub iam_role: String,
    /// Output format, e.g. `CSV` or `PARQUET`.
    pub format: String,
    /// Partition columns. Carried for callers; not rendered into the statement.
    pub partition_by: Vec<String>,
    pub header: bool,
    pub delimiter: String,
    pub allow_overwrite: bool,
    /// When false the statement carries `PARALLEL OFF`; when true nothing is emitted.
    pub parallel: bool,
    pub max_file_size: String,
    pub extension: String,
}

impl UnloadOption {
    /// Defaults: header row, overwrite allowed, a single writer, 1GB CSV files.
    pub fn new(s3_path: impl Into<String>) -> Self {
        Self {
            s3_path: s3_path.into(),
            iam_role: "default".to_string(),
            format: "CSV".to_string(),
            partition_by: Vec::new(),
            header: true,
            delimiter: ",".to_string(),
            allow_overwrite: true,
            parallel: false,
            max_file_size: "1GB".to_string(),
            extension: "csv".to_string(),
        }
    }

    pub fn iam_role(mut self, role: impl Into<String>) -> Self {
        self.iam_role = role.into();
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn partition_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn max_file_size(mut self, size: impl Into<String>) -> Self {
        self.max_file_size = size.into();
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Renders the `UNLOAD` statement for `query`.
///
/// Clauses appear in a fixed order: header, overwrite, parallel, delimiter,
/// format, max file size, extension.
pub fn build_unload_statement(query: &str, option: &UnloadOption) -> Result<String> {
    if option.s3_path.is_empty() {
        return Err(RedshiftDataError::Validation(
            "S3 path is required".to_string(),
        ));
    }

    let mut sql = format!(
        "UNLOAD ($$ {} $$)\nTO '{}'\nIAM_ROLE {}",
        query, option.s3_path, option.iam_role
    );

    if option.header {
        sql.push_str("\nHEADER");
    }

    if option.allow_overwrite {
        sql.push_str("\nALLOWOVERWRITE");
    }

    if !option.parallel {
        sql.push_str("\nPARALLEL OFF");
    }

    sql.push_str(&format!("\nDELIMITER '{}'", option.delimiter));
    sql.push_str(&format!("\nFORMAT AS {}", option.format));
    sql.push_str(&format!("\nMAXFILESIZE {}", option.max_file_size));
    sql.push_str(&format!("\nEXTENSION '{}'", option.extension));

    Ok(sql)
}
