pub mod backend;
pub mod config;
pub mod errors;
pub mod keychain;

#[cfg(feature = "keyring-store")]
pub mod cli;
