//! Runs a query through the Data API and prints the decoded rows.
//!
//! ```bash
//! REDSHIFT_DATA_ENDPOINT=http://localhost:4566 \
//! REDSHIFT_WORKGROUP=redshift-unload REDSHIFT_DATABASE=dev \
//! cargo run --example exec_query
//! ```

use redshift_data_client::logging::init_logging_from_env;
use redshift_data_client::{ClientConfig, DataApiClient, RedshiftDataService};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
struct Weather {
    id: i64,
    temperature: f64,
    humidity: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let service = RedshiftDataService::new(DataApiClient::from_env()?, ClientConfig::from_env()?);

    let table = std::env::var("WEATHER_TABLE").unwrap_or_else(|_| "dev.public.weather".into());
    let query = format!("SELECT id, temperature, humidity FROM {}", table);
    println!("query: {}", query);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let json = service.execute_with_result_json(&query, &cancel).await?;
    let weathers: Vec<Weather> = serde_json::from_slice(&json)?;

    for weather in weathers {
        println!(
            "ID: {}, Temperature: {:.2}, Humidity: {:.2}",
            weather.id, weather.temperature, weather.humidity
        );
    }
    Ok(())
}
