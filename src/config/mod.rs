//! Configuration Module
//!
//! Transport configuration and settings file loading.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{Timeout, TimeoutValue, TransportConfig, TransportSettings};
