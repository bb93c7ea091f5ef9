//! Numeric helpers: least-squares trend lines and histogram binning.

pub mod histogram;
pub mod ols;

pub use histogram::*;
pub use ols::*;
