pub mod canonical;
pub mod config;
pub mod dedup;
pub mod error;
pub mod types;

pub use config::Config;
pub use dedup::{dedup_records, normalize_title, DedupKeys};
pub use error::{Result, TechpressError};
pub use types::*;
