pub mod config;
pub mod error;
pub mod geo;
pub mod optimizer;
pub mod problem;
pub mod provider;
pub mod records;
pub mod store;
