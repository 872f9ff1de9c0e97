pub mod data_api_client;

pub use data_api_client::DataApiClient;
