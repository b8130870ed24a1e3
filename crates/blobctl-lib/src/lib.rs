//! blobctl - core library
//!
//! This library provides the settings record, its env-file persistence, and
//! the error taxonomy shared by the blobctl crates.

pub mod env_file;
pub mod error;
pub mod settings;

pub use error::{Error, Result};
pub use settings::{LogLevel, Settings, SECRET_PLACEHOLDER};
