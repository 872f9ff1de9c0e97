use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::data_api::DataApi;
use crate::api::models::{
    DataApiError, DescribeStatementInput, DescribeStatementOutput, ExecuteStatementInput,
    ExecuteStatementOutput, GetStatementResultInput, GetStatementResultOutput,
};

const TARGET_PREFIX: &str = "RedshiftData";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Low-level Redshift Data API client that posts JSON-protocol requests to an endpoint.
///
/// Requests are not signed. Point the client at something that accepts them
/// as-is (a signing gateway, a local emulator) and inject whatever headers it
/// expects with [`DataApiClient::with_header`].
#[derive(Debug, Clone)]
pub struct DataApiClient {
    endpoint: String,
    headers: Vec<(String, String)>,
    http_client: Client,
}

impl DataApiClient {
    /// Creates a new client for the given endpoint.
    ///
    /// Example `endpoint`: `https://redshift-data.us-east-1.amazonaws.com`
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            headers: Vec::new(),
            http_client: Client::new(),
        }
    }

    /// Reads the endpoint from `REDSHIFT_DATA_ENDPOINT`.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self::new(&std::env::var("REDSHIFT_DATA_ENDPOINT")?))
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn target(operation: &str) -> String {
        format!("{}.{}", TARGET_PREFIX, operation)
    }

    /// POST one operation and decode its JSON response.
    async fn call<I, O>(&self, operation: &str, input: &I) -> Result<O, DataApiError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let url = format!("{}/", self.endpoint);
        let body = serde_json::to_vec(input).map_err(|e| DataApiError::Json(e.to_string()))?;

        let mut request = self
            .http_client
            .post(&url)
            .header("X-Amz-Target", Self::target(operation))
            .header("Content-Type", CONTENT_TYPE);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!("Calling {} at {}", Self::target(operation), url);
        let resp = request.body(body).send().await?;

        self.handle_response(operation, resp).await
    }

    /// Helper to turn a Data API response into the expected output or an error.
    async fn handle_response<O>(
        &self,
        operation: &str,
        resp: reqwest::Response,
    ) -> Result<O, DataApiError>
    where
        O: DeserializeOwned,
    {
        let status = resp.status();
        let text_body = resp.text().await?;

        debug!("{} responded with HTTP {}", operation, status);

        if !status.is_success() {
            return Err(DataApiError::Api {
                status: status.as_u16(),
                body: text_body,
            });
        }

        serde_json::from_str(&text_body).map_err(|e| {
            DataApiError::Json(format!(
                "Failed to parse {} response: {} - body: {}",
                operation, e, text_body
            ))
        })
    }
}

impl DataApi for DataApiClient {
    async fn execute_statement(
        &self,
        input: &ExecuteStatementInput,
    ) -> Result<ExecuteStatementOutput, DataApiError> {
        self.call("ExecuteStatement", input).await
    }

    async fn describe_statement(
        &self,
        input: &DescribeStatementInput,
    ) -> Result<DescribeStatementOutput, DataApiError> {
        self.call("DescribeStatement", input).await
    }

    async fn get_statement_result(
        &self,
        input: &GetStatementResultInput,
    ) -> Result<GetStatementResultOutput, DataApiError> {
        self.call("GetStatementResult", input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = DataApiClient::new("https://redshift-data.us-east-1.amazonaws.com/");
        assert_eq!(
            client.endpoint(),
            "https://redshift-data.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_target_header() {
        assert_eq!(
            DataApiClient::target("DescribeStatement"),
            "RedshiftData.DescribeStatement"
        );
    }

    #[test]
    fn test_with_header_accumulates() {
        let client = DataApiClient::new("http://localhost:4566")
            .with_header("Authorization", "Bearer abc")
            .with_header("X-Trace", "1");
        assert_eq!(client.headers.len(), 2);
        assert_eq!(client.headers[0].0, "Authorization");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        let client = DataApiClient::new("http://127.0.0.1:1");
        let err = client
            .describe_statement(&DescribeStatementInput {
                id: "abc".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataApiError::Reqwest(_)));
    }
}
