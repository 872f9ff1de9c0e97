//! Redshift Data API client.
//!
//! Submits SQL statements through the Redshift Data API, waits for them to
//! reach a terminal state and turns the columnar result into rows keyed by
//! column name. It can also wrap a query in an `UNLOAD` export to S3 and wait
//! for the export to finish.
//!
//! ```no_run
//! use redshift_data_client::{ClientConfig, DataApiClient, RedshiftDataService, UnloadOption};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedshiftDataService::new(
//!     DataApiClient::new("http://localhost:4566"),
//!     ClientConfig::workgroup("redshift-unload", "dev"),
//! );
//! let cancel = CancellationToken::new();
//!
//! let rows = service
//!     .execute_with_result("SELECT id, temperature FROM weather", &cancel)
//!     .await?;
//! println!("{} rows", rows.len());
//!
//! let statement_id = service
//!     .execute_unload_and_wait(
//!         "SELECT * FROM weather",
//!         &UnloadOption::new("s3://bucket/weather/"),
//!         &cancel,
//!     )
//!     .await?;
//! println!("unloaded by {}", statement_id);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod api_client;
pub mod decode;
pub mod logging;
pub mod models;
pub mod service;
pub mod unload;

pub use api::models::{DataApiError, Field, StatementStatus};
pub use api::DataApi;
pub use api_client::DataApiClient;
pub use decode::DecodeMode;
pub use models::{ClientConfig, ExecutionContext, RedshiftDataError, Result, Row, Value};
pub use service::RedshiftDataService;
pub use unload::{build_unload_statement, UnloadOption};
