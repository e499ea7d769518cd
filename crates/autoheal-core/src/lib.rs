pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod parser;
pub mod registry;

pub use error::{AutohealError, Result};
