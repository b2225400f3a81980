//! Miscellaneous utilities.

pub mod log;
pub mod spawn;
