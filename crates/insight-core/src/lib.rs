pub mod config;
pub mod error;
pub mod types;

pub use config::{ClipboardBackend, InsightConfig};
pub use error::{CoreError, Result};
pub use types::*;
