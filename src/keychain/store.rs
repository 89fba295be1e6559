//! The credential store: add / copy / delete primitives over an
//! [`ItemStore`], and the set / get / delete operations built on them.

use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use super::access::{AccessControl, Accessibility, AuthRequirement};
use super::item::{GenericPasswordItem, Identity, PasswordItem};
use super::locks::{IdentityLocks, WriteSerialization};
use super::query::{self, AttrKey, Attributes};
use super::scoped::ScopedKeychain;
use super::status::Status;
use super::Result;
use crate::backend::{ItemStore, ItemValue};
use crate::errors::KeychainError;

/// Generic-password credential store over an item store backend.
///
/// Every method is a synchronous call (or two) into the backend.  The store
/// keeps no payloads between calls and, unless
/// [`WriteSerialization::PerIdentity`] is selected, no state at all.
pub struct CredentialStore<S> {
    backend: S,
    locks: Option<IdentityLocks>,
}

impl<S: ItemStore> CredentialStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_write_serialization(backend, WriteSerialization::Unserialized)
    }

    pub fn with_write_serialization(backend: S, policy: WriteSerialization) -> Self {
        let locks = match policy {
            WriteSerialization::Unserialized => None,
            WriteSerialization::PerIdentity => Some(IdentityLocks::default()),
        };
        Self { backend, locks }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn write_serialization(&self) -> WriteSerialization {
        match self.locks {
            Some(_) => WriteSerialization::PerIdentity,
            None => WriteSerialization::Unserialized,
        }
    }

    /// Build an access control that this store's device can enforce.
    pub fn access_control(
        &self,
        accessibility: Accessibility,
        requirement: AuthRequirement,
    ) -> Result<AccessControl> {
        AccessControl::new(accessibility, requirement, self.backend.capabilities())
    }

    /// Handle bound to `service`.
    pub fn scoped(&self, service: &str) -> ScopedKeychain<'_, S> {
        ScopedKeychain::new(self, service, None)
    }

    /// Handle bound to `service` within `access_group`.
    pub fn scoped_with_group(&self, service: &str, access_group: &str) -> ScopedKeychain<'_, S> {
        ScopedKeychain::new(self, service, Some(access_group))
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    /// Insert a new record.
    ///
    /// Fails with [`KeychainError::DuplicateItem`] if the identity already
    /// exists; this never overwrites.
    pub fn add(&self, attributes: &Attributes) -> Result<()> {
        let status = self.backend.add(attributes);
        trace_status("add", attributes, status);
        status.check()
    }

    /// Read the payload matching `query`.
    ///
    /// Absence is `Ok(None)`, distinct from every error.  A successful
    /// status carrying something other than item data is reported as
    /// [`KeychainError::DecodeFailure`].
    pub fn copy_matching(&self, query: &Attributes) -> Result<Option<Zeroizing<Vec<u8>>>> {
        let (status, value) = self.backend.copy_matching(query);
        trace_status("copy", query, status);

        if status == Status::ITEM_NOT_FOUND {
            return Ok(None);
        }
        status.check()?;

        match value {
            Some(ItemValue::Data(bytes)) => Ok(Some(bytes)),
            Some(ItemValue::Attributes(_)) => Err(KeychainError::DecodeFailure),
            None => Err(KeychainError::UnexpectedFailure),
        }
    }

    /// Delete every record matching `query`.
    ///
    /// Deleting nothing is [`KeychainError::ItemNotFound`], not a success.
    pub fn delete_matching(&self, query: &Attributes) -> Result<()> {
        let status = self.backend.delete(query);
        trace_status("delete", query, status);
        status.check()
    }

    // ------------------------------------------------------------------
    // Convenience operations
    // ------------------------------------------------------------------

    /// Store `item`, replacing any record with the same identity.
    ///
    /// The replace is a delete followed by an add, not an atomic swap.  With
    /// [`WriteSerialization::Unserialized`], a concurrent `get` can see the
    /// item as absent between the two steps, and a concurrent `set` on the
    /// same identity can make this call fail with
    /// [`KeychainError::DuplicateItem`].  Only the add's outcome is returned.
    ///
    /// The pre-add delete uses the item's own access group.  An item without
    /// one produces an ungrouped delete, which the store matches against
    /// every group: records for the same account and service in other
    /// groups are removed as well.
    pub fn set<I: PasswordItem + ?Sized>(&self, item: &I) -> Result<()> {
        validate_identity(item.account(), item.service())?;
        let attributes = query::add_attributes(item);

        self.serialized(&item.identity(), || {
            let delete = query::delete_query(item.account(), item.service(), item.access_group());
            // Outcome intentionally discarded: ItemNotFound is the normal
            // case for a first write, and the add below decides the result.
            match self.delete_matching(&delete) {
                Ok(()) => debug!(
                    account = item.account(),
                    service = item.service(),
                    "replacing existing item"
                ),
                Err(err) => debug!(
                    account = item.account(),
                    service = item.service(),
                    %err,
                    "pre-add delete discarded"
                ),
            }
            self.add(&attributes)
        })
    }

    /// Store raw bytes under `account` / `service`.
    pub fn set_data(
        &self,
        data: &[u8],
        account: &str,
        service: &str,
        access_group: Option<&str>,
        access_control: Option<&AccessControl>,
    ) -> Result<()> {
        let mut item = GenericPasswordItem::new(data, account, service);
        item.access_group = access_group.map(str::to_string);
        item.access_control = access_control.cloned();
        self.set(&item)
    }

    /// Store the UTF-8 encoding of `value`.
    pub fn set_string(
        &self,
        value: &str,
        account: &str,
        service: &str,
        access_group: Option<&str>,
        access_control: Option<&AccessControl>,
    ) -> Result<()> {
        self.set_data(value.as_bytes(), account, service, access_group, access_control)
    }

    /// Read the payload stored under `account` / `service`.
    ///
    /// Returns a detached copy; `Ok(None)` when no such item exists.
    pub fn get(
        &self,
        account: &str,
        service: &str,
        access_group: Option<&str>,
    ) -> Result<Option<Zeroizing<Vec<u8>>>> {
        validate_identity(account, service)?;
        let query = query::copy_query(account, service, access_group);
        self.serialized(&Identity::new(account, service, access_group), || {
            self.copy_matching(&query)
        })
    }

    /// Read the payload as UTF-8.
    ///
    /// Bytes that are not valid UTF-8 fail with
    /// [`KeychainError::DecodeFailure`]; absence is still `Ok(None)`.
    pub fn get_string(
        &self,
        account: &str,
        service: &str,
        access_group: Option<&str>,
    ) -> Result<Option<Zeroizing<String>>> {
        let Some(mut bytes) = self.get(account, service, access_group)? else {
            return Ok(None);
        };

        // Move the bytes out so the String owns the only copy.
        let raw = std::mem::take(&mut *bytes);
        match String::from_utf8(raw) {
            Ok(value) => Ok(Some(Zeroizing::new(value))),
            Err(e) => {
                let mut bad_bytes = e.into_bytes();
                bad_bytes.zeroize();
                debug!(account, service, "stored payload is not valid UTF-8");
                Err(KeychainError::DecodeFailure)
            }
        }
    }

    /// Delete the item stored under `account` / `service`.
    ///
    /// A missing item is [`KeychainError::ItemNotFound`]; callers that want
    /// an idempotent delete must ignore that kind themselves.
    pub fn delete(&self, account: &str, service: &str, access_group: Option<&str>) -> Result<()> {
        validate_identity(account, service)?;
        let query = query::delete_query(account, service, access_group);
        self.serialized(&Identity::new(account, service, access_group), || {
            self.delete_matching(&query)
        })
    }

    /// Whether an item is stored under `account` / `service`.
    ///
    /// Asks the store for attributes only, so a protected payload is never
    /// unlocked and no authentication prompt is shown.
    pub fn exists(&self, account: &str, service: &str, access_group: Option<&str>) -> Result<bool> {
        validate_identity(account, service)?;
        let query = query::exists_query(account, service, access_group);
        self.serialized(&Identity::new(account, service, access_group), || {
            let (status, _) = self.backend.copy_matching(&query);
            trace_status("exists", &query, status);
            if status == Status::ITEM_NOT_FOUND {
                return Ok(false);
            }
            status.check().map(|()| true)
        })
    }

    fn serialized<R>(&self, identity: &Identity, f: impl FnOnce() -> R) -> R {
        match &self.locks {
            Some(locks) => locks.with_lock(identity, f),
            None => f(),
        }
    }
}

/// Account and service must both be non-empty.
fn validate_identity(account: &str, service: &str) -> Result<()> {
    if account.is_empty() || service.is_empty() {
        debug!(account, service, "rejecting empty account or service");
        return Err(KeychainError::BadParameters);
    }
    Ok(())
}

fn trace_status(op: &'static str, attrs: &Attributes, status: Status) {
    debug!(
        op,
        account = attrs.string(AttrKey::Account),
        service = attrs.string(AttrKey::Service),
        access_group = attrs.string(AttrKey::AccessGroup),
        status = status.0,
        "item store call"
    );
}
