//! Data module - table loading and record filtering

mod filter;
mod loader;
mod table;

pub use filter::filter_by_value;
pub use loader::{DataLoader, LoaderError};
pub use table::{Row, Table};
