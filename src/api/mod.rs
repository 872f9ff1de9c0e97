pub mod data_api;
pub mod models;

pub use data_api::DataApi;
