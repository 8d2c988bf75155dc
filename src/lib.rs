pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod format;
pub mod frame;
pub mod loader;
pub mod report;
pub mod schema;
pub mod source;
pub mod table;
pub mod time;

pub use engine::{apply, FilteredResult};
pub use error::{DashboardError, Result};
pub use filter::FilterSpec;
pub use loader::{load, load_cached, LoadOptions};
pub use table::{Table, TransactionRecord};
