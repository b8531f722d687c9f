pub mod aggregate;
pub mod bucket;
pub mod cli;
pub mod error;
pub mod export;
pub mod output;
pub mod series;
pub mod summary;
pub mod types;
pub mod utils;
