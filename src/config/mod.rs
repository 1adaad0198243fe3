//! Configuration management module
//!
//! Responsible for loading the relay credentials and ambient settings from environment variables.

pub mod settings;

pub use settings::Settings;
