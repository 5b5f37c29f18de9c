//! Core types: configuration and errors.

pub mod config;
pub mod error;

pub use config::ShotTreeConfig;
pub use error::{Result, ShotTreeError};
