//! Generic-password items and the identity triple that addresses them.

use std::fmt;

use zeroize::Zeroizing;

use super::access::{AccessControl, Accessibility, AuthRequirement, DeviceCapabilities};
use super::Result;

/// The capability set every storable item exposes.
///
/// The query builder only talks to items through this trait, so other item
/// shapes can be stored without touching the builder.
pub trait PasswordItem {
    fn account(&self) -> &str;
    fn service(&self) -> &str;
    fn data(&self) -> &[u8];
    fn access_control(&self) -> Option<&AccessControl>;
    fn access_group(&self) -> Option<&str>;

    /// The (account, service, access group) triple of this item.
    fn identity(&self) -> Identity {
        Identity::new(self.account(), self.service(), self.access_group())
    }
}

/// (account, service, access group): uniquely addresses one stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    pub account: String,
    pub service: String,
    pub access_group: Option<String>,
}

impl Identity {
    pub fn new(account: &str, service: &str, access_group: Option<&str>) -> Self {
        Self {
            account: account.to_string(),
            service: service.to_string(),
            access_group: access_group.map(str::to_string),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.access_group {
            Some(group) => write!(f, "{}@{} [{}]", self.account, self.service, group),
            None => write!(f, "{}@{}", self.account, self.service),
        }
    }
}

/// A secret payload stored under an account and service.
///
/// The payload is wiped from memory when the item is dropped.
#[derive(Clone)]
pub struct GenericPasswordItem {
    pub account: String,
    pub service: String,
    pub data: Zeroizing<Vec<u8>>,
    pub access_control: Option<AccessControl>,
    pub access_group: Option<String>,
}

impl GenericPasswordItem {
    pub fn new(data: impl Into<Vec<u8>>, account: &str, service: &str) -> Self {
        Self {
            account: account.to_string(),
            service: service.to_string(),
            data: Zeroizing::new(data.into()),
            access_control: None,
            access_group: None,
        }
    }

    /// Item whose payload is the UTF-8 encoding of `value`.
    pub fn from_string(value: &str, account: &str, service: &str) -> Self {
        Self::new(value.as_bytes(), account, service)
    }

    pub fn with_access_control(mut self, access_control: AccessControl) -> Self {
        self.access_control = Some(access_control);
        self
    }

    pub fn with_access_group(mut self, access_group: &str) -> Self {
        self.access_group = Some(access_group.to_string());
        self
    }

    /// Build and attach an access control in place.
    ///
    /// On failure the item is left untouched.
    pub fn configure_access_control(
        &mut self,
        accessibility: Accessibility,
        requirement: AuthRequirement,
        capabilities: DeviceCapabilities,
    ) -> Result<()> {
        let control = AccessControl::new(accessibility, requirement, capabilities)?;
        self.access_control = Some(control);
        Ok(())
    }
}

impl PasswordItem for GenericPasswordItem {
    fn account(&self) -> &str {
        &self.account
    }

    fn service(&self) -> &str {
        &self.service
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn access_control(&self) -> Option<&AccessControl> {
        self.access_control.as_ref()
    }

    fn access_group(&self) -> Option<&str> {
        self.access_group.as_deref()
    }
}

impl fmt::Debug for GenericPasswordItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericPasswordItem")
            .field("account", &self.account)
            .field("service", &self.service)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("access_control", &self.access_control)
            .field("access_group", &self.access_group)
            .finish()
    }
}
