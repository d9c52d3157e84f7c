pub mod clean;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod write;

pub use error::ScrapeError;
