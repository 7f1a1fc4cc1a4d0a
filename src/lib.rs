pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod output;
pub mod query;
pub mod rows;
