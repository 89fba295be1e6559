//! Generic-password credential store.
//!
//! This module provides:
//! - `Accessibility`, `AuthRequirement` and `AccessControl` (`access`)
//! - `PasswordItem`, `GenericPasswordItem` and `Identity` (`item`)
//! - Attribute dictionaries and their builders (`query`)
//! - Status codes and their error mapping (`status`)
//! - `CredentialStore` with the upsert protocol (`store`)
//! - `ScopedKeychain`, a handle bound to one service (`scoped`)

pub mod access;
pub mod item;
pub mod locks;
pub mod query;
pub mod scoped;
pub mod status;
pub mod store;

// Re-export the most commonly used items.
pub use access::{AccessControl, Accessibility, AuthRequirement, DeviceCapabilities};
pub use item::{GenericPasswordItem, Identity, PasswordItem};
pub use locks::WriteSerialization;
pub use query::{AttrKey, AttrValue, Attributes, ItemClass, MatchLimit};
pub use scoped::ScopedKeychain;
pub use status::Status;
pub use store::CredentialStore;

/// Result of a keychain operation.
pub type Result<T> = std::result::Result<T, crate::errors::KeychainError>;
