//! Exports a query result to S3 with UNLOAD and waits for it to finish.
//!
//! ```bash
//! REDSHIFT_DATA_ENDPOINT=http://localhost:4566 \
//! REDSHIFT_WORKGROUP=redshift-unload REDSHIFT_DATABASE=dev \
//! UNLOAD_S3_PATH=s3://redshift-unload-verification/unloadwrapper/ \
//! cargo run --example unload_query
//! ```

use redshift_data_client::logging::init_logging_from_env;
use redshift_data_client::{ClientConfig, DataApiClient, RedshiftDataService, UnloadOption};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let service = RedshiftDataService::new(DataApiClient::from_env()?, ClientConfig::from_env()?);

    let table = std::env::var("WEATHER_TABLE").unwrap_or_else(|_| "dev.public.weather".into());
    let query = format!("SELECT id, temperature, humidity FROM {}", table);
    println!("query: {}", query);

    let option = UnloadOption::new(std::env::var("UNLOAD_S3_PATH")?);
    let statement_id = service
        .execute_unload_and_wait(&query, &option, &CancellationToken::new())
        .await?;

    println!("statement id: {}", statement_id);
    Ok(())
}
