//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the admission `Record` and its derived values (`stay_days`, `month_key`)
//! - the insurance representation (`Insurance`)
//! - filter configuration (`DateRange`, `Constraints`)

pub mod types;

pub use types::*;
