//! Configuration module for VaultCopy
//!
//! Provides configuration management including CLI arguments,
//! endpoint parsing, and runtime settings.

mod settings;

pub use settings::*;
