//! Item store backends.
//!
//! The credential store never touches protected storage directly.  It
//! speaks a three-call attribute-dictionary protocol to an [`ItemStore`]:
//!
//! - [`MemoryItemStore`]: in-process store for tests and embedding
//! - [`KeyringItemStore`]: the OS keyring (feature `keyring-store`)

pub mod memory;

#[cfg(feature = "keyring-store")]
pub mod keyring;

pub use memory::{Interaction, MemoryItemStore, Operation};

#[cfg(feature = "keyring-store")]
pub use self::keyring::KeyringItemStore;

use zeroize::Zeroizing;

use crate::keychain::{Attributes, DeviceCapabilities, Status};

/// Result payload of a successful `copy_matching`.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    /// Raw item data, returned when the query sets the return-data flag.
    Data(Zeroizing<Vec<u8>>),
    /// Attribute dictionary, returned when no data was requested.
    Attributes(Attributes),
}

/// A platform protected-item repository.
///
/// Implementations report every outcome as a [`Status`]; mapping to
/// [`KeychainError`](crate::errors::KeychainError) happens in the
/// credential store.
pub trait ItemStore: Send + Sync {
    /// Insert a new record.  Must report [`Status::DUPLICATE_ITEM`] if the
    /// identity already exists.
    fn add(&self, attributes: &Attributes) -> Status;

    /// Look up records matching `query`.  A miss is
    /// [`Status::ITEM_NOT_FOUND`] with no value.
    fn copy_matching(&self, query: &Attributes) -> (Status, Option<ItemValue>);

    /// Delete every record matching `query`.
    fn delete(&self, query: &Attributes) -> Status;

    /// What access-control requirements this device can enforce.
    fn capabilities(&self) -> DeviceCapabilities;
}

impl<S: ItemStore + ?Sized> ItemStore for std::sync::Arc<S> {
    fn add(&self, attributes: &Attributes) -> Status {
        (**self).add(attributes)
    }

    fn copy_matching(&self, query: &Attributes) -> (Status, Option<ItemValue>) {
        (**self).copy_matching(query)
    }

    fn delete(&self, query: &Attributes) -> Status {
        (**self).delete(query)
    }

    fn capabilities(&self) -> DeviceCapabilities {
        (**self).capabilities()
    }
}
