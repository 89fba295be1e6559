//! A credential store handle bound to one service and access group.

use zeroize::Zeroizing;

use super::access::{AccessControl, Accessibility, AuthRequirement};
use super::store::CredentialStore;
use super::Result;
use crate::backend::ItemStore;

/// Forwards every call to [`CredentialStore`] with the bound service and
/// access group filled in.  Holds nothing else.
pub struct ScopedKeychain<'a, S> {
    store: &'a CredentialStore<S>,
    service: String,
    access_group: Option<String>,
}

impl<'a, S: ItemStore> ScopedKeychain<'a, S> {
    pub fn new(store: &'a CredentialStore<S>, service: &str, access_group: Option<&str>) -> Self {
        Self {
            store,
            service: service.to_string(),
            access_group: access_group.map(str::to_string),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn access_group(&self) -> Option<&str> {
        self.access_group.as_deref()
    }

    pub fn access_control(
        &self,
        accessibility: Accessibility,
        requirement: AuthRequirement,
    ) -> Result<AccessControl> {
        self.store.access_control(accessibility, requirement)
    }

    pub fn set_data(
        &self,
        data: &[u8],
        account: &str,
        access_control: Option<&AccessControl>,
    ) -> Result<()> {
        self.store
            .set_data(data, account, &self.service, self.access_group(), access_control)
    }

    pub fn set_string(
        &self,
        value: &str,
        account: &str,
        access_control: Option<&AccessControl>,
    ) -> Result<()> {
        self.store
            .set_string(value, account, &self.service, self.access_group(), access_control)
    }

    pub fn get(&self, account: &str) -> Result<Option<Zeroizing<Vec<u8>>>> {
        self.store.get(account, &self.service, self.access_group())
    }

    pub fn get_string(&self, account: &str) -> Result<Option<Zeroizing<String>>> {
        self.store.get_string(account, &self.service, self.access_group())
    }

    pub fn delete(&self, account: &str) -> Result<()> {
        self.store.delete(account, &self.service, self.access_group())
    }
}
