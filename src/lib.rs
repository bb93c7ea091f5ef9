//! `health-insights` library crate.
//!
//! The binary (`hdash`) is a thin wrapper around this library so that:
//!
//! - the filter and aggregation core is testable without spawning processes
//! - a different front-end (web view, notebook) can reuse the same results

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod filter;
pub mod io;
pub mod math;
pub mod report;
