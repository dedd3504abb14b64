//! `sg-domain`: configuration and error types shared by every schedgen crate.

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result};
