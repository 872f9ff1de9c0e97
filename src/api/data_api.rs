use crate::api::models::{
    DataApiError, DescribeStatementInput, DescribeStatementOutput, ExecuteStatementInput,
    ExecuteStatementOutput, GetStatementResultInput, GetStatementResultOutput,
};

/// The three Redshift Data API operations the statement lifecycle depends on.
pub trait DataApi {
    /// RedshiftData.ExecuteStatement
    /// Submit a statement for asynchronous execution.
    async fn execute_statement(
        &self,
        input: &ExecuteStatementInput,
    ) -> Result<ExecuteStatementOutput, DataApiError>;

    /// RedshiftData.DescribeStatement
    /// Poll the statement's status and diagnostic.
    async fn describe_statement(
        &self,
        input: &DescribeStatementInput,
    ) -> Result<DescribeStatementOutput, DataApiError>;

    /// RedshiftData.GetStatementResult
    /// Fetch one page of results for a finished statement.
    async fn get_statement_result(
        &self,
        input: &GetStatementResultInput,
    ) -> Result<GetStatementResultOutput, DataApiError>;
}
