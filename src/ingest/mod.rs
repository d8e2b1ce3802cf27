//! Order export ingestion.
//!
//! Turns JSON order exports into validated domain orders.

pub mod loader;
pub mod record;

pub use loader::{collect_orders, load_files, LoadedInput};
pub use record::{parse_orders, IngestError};
