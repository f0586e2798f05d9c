//! Expose webconv's internal API for integration tests. It is not meant to be
//! a stable library interface.
pub mod cli;
pub mod config;
pub mod error;
pub mod mirror;
pub mod run;
#[cfg(feature = "serve")]
pub mod serve;
pub mod utils;
