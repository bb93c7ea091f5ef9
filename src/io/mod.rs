//! Output files: dashboard JSON and record CSV exports.

pub mod export;

pub use export::*;
