pub mod analyzers;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod parser;
pub mod services;
pub mod summary;
