//! Configuration loaded from `.keystash.toml`.

pub mod settings;

pub use settings::Settings;
