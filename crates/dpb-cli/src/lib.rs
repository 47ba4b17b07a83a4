//! Library half of the `dataproduct-builder` command line.

pub mod listing;
pub mod logging;
