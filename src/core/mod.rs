//! Core types - pure abstractions shared across the codebase.

mod category;
mod changes;
mod state;

pub use category::{AssetKind, BundleCategory};
pub use changes::{ChangeSink, LogChanges, WrittenFiles};
pub use state::{is_shutdown, setup_shutdown_handler};
