mod client;
mod error;
mod models;

pub use client::ElasticsearchIndex;
pub use error::EsError;
