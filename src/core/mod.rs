pub mod audit;
pub mod cases;
pub mod custody;
pub mod directory;
pub mod documents;
pub mod registry;
pub mod relationships;
pub mod remarks;
pub mod reports;
pub mod requests;
pub mod sequence;
pub mod splitting;
pub mod workflow;

pub use crate::domain::ports::{Clock, ConfigProvider, Storage};
pub use crate::utils::error::Result;
pub use registry::{DocumentRegistry, WorkflowSettings};
