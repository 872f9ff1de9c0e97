use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::data_api::DataApi;
use crate::api::models::{
    DataApiError, DescribeStatementInput, ExecuteStatementInput, GetStatementResultInput, StatementStatus,
};
use crate::decode::{column_names, map_records};
use crate::models::{ClientConfig, RedshiftDataError, Result, Row};
use crate::unload::{build_unload_statement, UnloadOption};

/// Higher-level service layer built on top of a [`DataApi`] implementation.
/// Provides the submit / watch / fetch lifecycle and the UNLOAD round trip.
#[derive(Debug, Clone)]
pub struct RedshiftDataService<A> {
    api: A,
    config: ClientConfig,
}

impl<A: DataApi> RedshiftDataService<A> {
    pub fn new(api: A, config: ClientConfig) -> Self {
        Self { api, config }
    }

    /// Returns a reference to the low-level API client (if you need direct calls).
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submits `sql` against `database` and returns the statement id.
    pub async fn execute_statement(&self, database: &str, sql: &str) -> Result<String> {
        let mut input = ExecuteStatementInput {
            database: database.to_string(),
            sql: sql.to_string(),
            ..Default::default()
        };
        self.config.context.apply(&mut input);

        let output = self
            .api
            .execute_statement(&input)
            .await
            .map_err(RedshiftDataError::Submission)?;

        let statement_id = output.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            RedshiftDataError::Submission(DataApiError::Json(
                "no statement id in execute response".to_string(),
            ))
        })?;

        debug!("Submitted statement {} to database {}", statement_id, database);
        Ok(statement_id)
    }

    /// Polls a statement until it reaches a terminal state.
    ///
    /// Returns `Ok(())` only for FINISHED. ABORTED and FAILED return the
    /// service diagnostic without polling again. Any other status sleeps for
    /// the configured poll interval and polls again, until `cancel` fires or
    /// one of the optional poll bounds is hit.
    pub async fn watch_statement(
        &self,
        statement_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let started = Instant::now();
        let mut polls = 0usize;
        let input = DescribeStatementInput {
            id: statement_id.to_string(),
        };

        loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(statement_id)),
                polled = self.api.describe_statement(&input) => polled,
            };
            let output = polled.map_err(|source| RedshiftDataError::PollTransport {
                statement_id: statement_id.to_string(),
                source,
            })?;
            polls += 1;

            debug!(
                "Statement {} is {} after {} polls",
                statement_id, output.status, polls
            );

            match output.status {
                StatementStatus::Finished => return Ok(()),
                status if status.is_terminal() => {
                    let message = match output.error {
                        Some(message) if !message.is_empty() => message,
                        _ => {
                            warn!("Statement {} is {} without a diagnostic", statement_id, status);
                            format!("statement {} without diagnostic", status.as_str().to_lowercase())
                        }
                    };
                    return Err(RedshiftDataError::TerminalFailure {
                        statement_id: statement_id.to_string(),
                        status,
                        message,
                    });
                }
                _ => {}
            }

            let elapsed = started.elapsed();
            let polls_exhausted = self.config.max_polls.is_some_and(|max| polls >= max);
            let timed_out = self
                .config
                .poll_timeout
                .is_some_and(|timeout| elapsed >= timeout);
            if polls_exhausted || timed_out {
                return Err(RedshiftDataError::PollLimitExceeded {
                    statement_id: statement_id.to_string(),
                    polls,
                    elapsed,
                });
            }

            // Never sleep past the poll deadline.
            let pause = match self.config.poll_timeout {
                Some(timeout) => self.config.poll_interval.min(timeout.saturating_sub(elapsed)),
                None => self.config.poll_interval,
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(statement_id)),
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// Fetches every result page of a finished statement and maps it to rows.
    pub async fn fetch_result(&self, statement_id: &str) -> Result<Vec<Row>> {
        let mut columns: Option<Vec<String>> = None;
        let mut records = Vec::new();
        let mut next_token = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .api
                .get_statement_result(&GetStatementResultInput {
                    id: statement_id.to_string(),
                    next_token: next_token.take(),
                })
                .await
                .map_err(|source| RedshiftDataError::Fetch {
                    statement_id: statement_id.to_string(),
                    source,
                })?;
            pages += 1;

            if columns.is_none() || !page.column_metadata.is_empty() {
                columns = Some(column_names(&page.column_metadata));
            }
            records.extend(page.records);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        debug!(
            "Fetched {} records in {} pages for statement {}",
            records.len(),
            pages,
            statement_id
        );

        map_records(
            columns.as_deref().unwrap_or_default(),
            records,
            self.config.decode_mode,
        )
    }

    /// Runs `query` on the default database, waits for it and returns its rows.
    pub async fn execute_with_result(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Row>> {
        let statement_id = self.submit(&self.config.default_database, query, cancel).await?;
        self.watch_statement(&statement_id, cancel).await?;
        self.fetch_result(&statement_id).await
    }

    /// Same as [`execute_with_result`](Self::execute_with_result), encoded as a
    /// JSON array with one object per row.
    pub async fn execute_with_result_json(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let rows = self.execute_with_result(query, cancel).await?;
        serde_json::to_vec(&rows).map_err(|e| RedshiftDataError::Encoding(e.to_string()))
    }

    /// Wraps `query` in an UNLOAD, runs it on the default database and waits
    /// for the export to finish. Returns the statement id.
    pub async fn execute_unload_and_wait(
        &self,
        query: &str,
        option: &UnloadOption,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let unload = build_unload_statement(query, option)?;
        let statement_id = self
            .submit(&self.config.default_database, &unload, cancel)
            .await?;
        self.watch_statement(&statement_id, cancel).await?;
        Ok(statement_id)
    }

    async fn submit(&self, database: &str, sql: &str, cancel: &CancellationToken) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(RedshiftDataError::Cancelled { statement_id: None });
        }
        self.execute_statement(database, sql).await
    }

    fn cancelled(&self, statement_id: &str) -> RedshiftDataError {
        debug!("Stopped watching statement {}: cancelled", statement_id);
        RedshiftDataError::Cancelled {
            statement_id: Some(statement_id.to_string()),
        }
    }
}
