//! OS keyring backend.
//!
//! Maps the item store protocol onto the operating system's credential
//! store through the `keyring` crate:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: kernel keyutils
//!
//! The access group, when present, becomes the entry's target.  The OS
//! keyring has no accessibility classes, so items carrying an access
//! control are refused with [`Status::PARAM`] instead of being stored with
//! weaker protection.

use ::keyring::{Entry, Error as KeyringError};
use tracing::debug;
use zeroize::Zeroizing;

use super::{ItemStore, ItemValue};
use crate::keychain::{
    AttrKey, AttrValue, Attributes, DeviceCapabilities, ItemClass, MatchLimit, Status,
};

/// [`ItemStore`] backed by the platform keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringItemStore;

impl KeyringItemStore {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the single entry a dictionary names.
    ///
    /// The keyring cannot enumerate, so account and service are required.
    fn entry(attrs: &Attributes) -> Result<Entry, Status> {
        if attrs.class() != Some(ItemClass::GenericPassword) {
            return Err(Status::PARAM);
        }
        let (Some(account), Some(service)) = (
            attrs.string(AttrKey::Account),
            attrs.string(AttrKey::Service),
        ) else {
            return Err(Status::PARAM);
        };

        let entry = match attrs.string(AttrKey::AccessGroup) {
            Some(group) => Entry::new_with_target(group, service, account),
            None => Entry::new(service, account),
        };
        entry.map_err(|e| status_of(&e))
    }
}

/// Translate a keyring error into the status an item store would report.
fn status_of(err: &KeyringError) -> Status {
    let status = match err {
        KeyringError::NoEntry => Status::ITEM_NOT_FOUND,
        KeyringError::NoStorageAccess(_) => Status::NOT_AVAILABLE,
        KeyringError::BadEncoding(_) => Status::DECODE,
        KeyringError::TooLong(..) | KeyringError::Invalid(..) => Status::PARAM,
        KeyringError::Ambiguous(_) => Status::DUPLICATE_ITEM,
        _ => Status::IO,
    };
    if status != Status::ITEM_NOT_FOUND {
        debug!(error = %err, status = status.0, "keyring call failed");
    }
    status
}

impl ItemStore for KeyringItemStore {
    fn add(&self, attributes: &Attributes) -> Status {
        if attributes.access_control().is_some() {
            return Status::PARAM;
        }
        let entry = match Self::entry(attributes) {
            Ok(entry) => entry,
            Err(status) => return status,
        };

        match entry.get_secret() {
            Ok(mut existing) => {
                zeroize::Zeroize::zeroize(&mut existing);
                return Status::DUPLICATE_ITEM;
            }
            Err(KeyringError::NoEntry) => {}
            Err(e) => return status_of(&e),
        }

        match entry.set_secret(attributes.data().unwrap_or_default()) {
            Ok(()) => Status::SUCCESS,
            Err(e) => status_of(&e),
        }
    }

    fn copy_matching(&self, query: &Attributes) -> (Status, Option<ItemValue>) {
        let return_data = query.flag(AttrKey::ReturnData);
        if return_data && query.match_limit() == Some(MatchLimit::All) {
            return (Status::PARAM, None);
        }
        let entry = match Self::entry(query) {
            Ok(entry) => entry,
            Err(status) => return (status, None),
        };

        let secret = match entry.get_secret() {
            Ok(secret) => Zeroizing::new(secret),
            Err(e) => return (status_of(&e), None),
        };

        if return_data {
            return (Status::SUCCESS, Some(ItemValue::Data(secret)));
        }

        let mut attrs = Attributes::new();
        for key in [AttrKey::Account, AttrKey::Service, AttrKey::AccessGroup] {
            if let Some(value) = query.string(key) {
                attrs.insert(key, AttrValue::String(value.to_string()));
            }
        }
        attrs.insert(AttrKey::Class, AttrValue::Class(ItemClass::GenericPassword));
        (Status::SUCCESS, Some(ItemValue::Attributes(attrs)))
    }

    fn delete(&self, query: &Attributes) -> Status {
        let entry = match Self::entry(query) {
            Ok(entry) => entry,
            Err(status) => return status,
        };

        match entry.delete_credential() {
            Ok(()) => Status::SUCCESS,
            Err(e) => status_of(&e),
        }
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keychain::query::{add_attributes, copy_query, delete_query};
    use crate::keychain::{AccessControl, Accessibility, AuthRequirement, GenericPasswordItem};

    #[test]
    fn keyring_errors_map_to_statuses() {
        assert_eq!(status_of(&KeyringError::NoEntry), Status::ITEM_NOT_FOUND);
        assert_eq!(status_of(&KeyringError::BadEncoding(vec![0xff])), Status::DECODE);
        assert_eq!(
            status_of(&KeyringError::TooLong("service".into(), 255)),
            Status::PARAM
        );
        assert_eq!(
            status_of(&KeyringError::Invalid("user".into(), "empty".into())),
            Status::PARAM
        );
    }

    #[test]
    fn access_controlled_items_are_refused() {
        let control = AccessControl::new(
            Accessibility::WhenUnlocked,
            AuthRequirement::NONE,
            DeviceCapabilities::default(),
        )
        .unwrap();
        let item = GenericPasswordItem::from_string("v", "alice", "keystash-test")
            .with_access_control(control);
        assert_eq!(KeyringItemStore::new().add(&add_attributes(&item)), Status::PARAM);
    }

    #[test]
    fn queries_without_identity_are_refused() {
        let mut query = Attributes::new();
        query.insert(AttrKey::Class, AttrValue::Class(ItemClass::GenericPassword));
        assert_eq!(KeyringItemStore::new().delete(&query), Status::PARAM);
    }

    #[test]
    #[ignore] // Requires access to the OS keyring
    fn keyring_roundtrip() {
        let store = KeyringItemStore::new();
        let item = GenericPasswordItem::from_string("test-secret", "test-user", "keystash-test");

        assert_eq!(store.add(&add_attributes(&item)), Status::SUCCESS);
        let (status, value) = store.copy_matching(&copy_query("test-user", "keystash-test", None));
        assert_eq!(status, Status::SUCCESS);
        assert_eq!(
            value,
            Some(ItemValue::Data(Zeroizing::new(b"test-secret".to_vec())))
        );
        assert_eq!(
            store.delete(&delete_query("test-user", "keystash-test", None)),
            Status::SUCCESS
        );
    }
}
