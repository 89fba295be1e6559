//! Optional process-local serialization of operations on one identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::item::Identity;

/// Whether the credential store serializes operations per identity.
///
/// The upsert in [`CredentialStore::set`](super::CredentialStore::set) is a
/// delete followed by an add.  With [`PerIdentity`](Self::PerIdentity),
/// `set`, `get` and `delete` on the same account and service never
/// interleave inside this process, so readers cannot observe the gap.
/// Other processes sharing the store are not covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteSerialization {
    /// Calls go straight to the item store.
    #[default]
    #[serde(rename = "none")]
    Unserialized,
    /// One in-process lock per (account, service).
    ///
    /// The access group is left out of the key: a query without a group
    /// matches items in every group, so grouped and ungrouped calls on one
    /// account can touch the same record.
    PerIdentity,
}

/// Lock table key: account and service, without the access group.
type LockKey = (String, String);

/// Table of per-identity mutexes.  Entries are dropped once no caller
/// holds them.
#[derive(Debug, Default)]
pub(crate) struct IdentityLocks {
    table: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

impl IdentityLocks {
    /// Run `f` while holding the lock covering `identity`.
    pub(crate) fn with_lock<R>(&self, identity: &Identity, f: impl FnOnce() -> R) -> R {
        let key = (identity.account.clone(), identity.service.clone());
        let entry = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(key.clone()).or_default())
        };

        let result = {
            let _guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Two references left: the table's and ours.
        if Arc::strong_count(&entry) == 2 {
            table.remove(&key);
        }
        result
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
