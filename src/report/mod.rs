//! Terminal reports for the dashboard views and filter options.

pub mod format;

pub use format::*;
