pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::local_storage::LocalStorage;
pub use adapters::sqlite::SqliteStore;
pub use config::AppConfig;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use core::{DocumentRegistry, WorkflowSettings};
pub use utils::error::{DocTrackError, Result};
