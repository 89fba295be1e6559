//! Attribute dictionaries sent to the item store, and the builders that
//! compose them.
//!
//! Every public operation funnels through one of [`add_attributes`],
//! [`copy_query`] or [`delete_query`].  The builders are free functions
//! with no shared state: each call returns a fresh [`Attributes`] map.

use std::collections::BTreeMap;
use std::fmt;

use zeroize::Zeroizing;

use super::access::AccessControl;
use super::item::{Identity, PasswordItem};

/// Keys understood by the item store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrKey {
    Class,
    Account,
    Service,
    AccessGroup,
    ValueData,
    AccessControl,
    ReturnData,
    MatchLimit,
}

impl AttrKey {
    /// The platform's native key string (`kSecClass`, `kSecAttrAccount`, ...).
    pub fn as_native(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Account => "acct",
            Self::Service => "svce",
            Self::AccessGroup => "agrp",
            Self::ValueData => "v_Data",
            Self::AccessControl => "accc",
            Self::ReturnData => "r_Data",
            Self::MatchLimit => "m_Limit",
        }
    }
}

/// Item class marker.  Only generic passwords are produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClass {
    GenericPassword,
}

impl ItemClass {
    pub fn as_native(self) -> &'static str {
        match self {
            Self::GenericPassword => "genp",
        }
    }
}

/// How many matches a copy query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLimit {
    One,
    All,
}

/// A value in an attribute dictionary.
#[derive(Clone, PartialEq)]
pub enum AttrValue {
    Class(ItemClass),
    String(String),
    Data(Zeroizing<Vec<u8>>),
    AccessControl(AccessControl),
    Bool(bool),
    MatchLimit(MatchLimit),
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => f.debug_tuple("Class").field(class).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Data(bytes) => write!(f, "Data(<{} bytes>)", bytes.len()),
            Self::AccessControl(ac) => f.debug_tuple("AccessControl").field(ac).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::MatchLimit(limit) => f.debug_tuple("MatchLimit").field(limit).finish(),
        }
    }
}

/// An attribute dictionary.  Key order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: BTreeMap<AttrKey, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: AttrKey, value: AttrValue) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: AttrKey) -> Option<&AttrValue> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: AttrKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn class(&self) -> Option<ItemClass> {
        match self.get(AttrKey::Class) {
            Some(AttrValue::Class(class)) => Some(*class),
            _ => None,
        }
    }

    /// String-valued attribute, or `None` if absent or of another type.
    pub fn string(&self, key: AttrKey) -> Option<&str> {
        match self.get(key) {
            Some(AttrValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&[u8]> {
        match self.get(AttrKey::ValueData) {
            Some(AttrValue::Data(bytes)) => Some(bytes),
            _ => None,
        }
    }

    pub fn access_control(&self) -> Option<&AccessControl> {
        match self.get(AttrKey::AccessControl) {
            Some(AttrValue::AccessControl(ac)) => Some(ac),
            _ => None,
        }
    }

    pub fn flag(&self, key: AttrKey) -> bool {
        matches!(self.get(key), Some(AttrValue::Bool(true)))
    }

    pub fn match_limit(&self) -> Option<MatchLimit> {
        match self.get(AttrKey::MatchLimit) {
            Some(AttrValue::MatchLimit(limit)) => Some(*limit),
            _ => None,
        }
    }

    /// The identity triple named by this dictionary, if account and
    /// service are both present.
    pub fn identity(&self) -> Option<Identity> {
        Some(Identity::new(
            self.string(AttrKey::Account)?,
            self.string(AttrKey::Service)?,
            self.string(AttrKey::AccessGroup),
        ))
    }
}

/// Class + account + service, plus the access group when one is given.
fn base_query(account: &str, service: &str, access_group: Option<&str>) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(AttrKey::Class, AttrValue::Class(ItemClass::GenericPassword));
    attrs.insert(AttrKey::Account, AttrValue::String(account.to_string()));
    attrs.insert(AttrKey::Service, AttrValue::String(service.to_string()));
    if let Some(group) = access_group {
        attrs.insert(AttrKey::AccessGroup, AttrValue::String(group.to_string()));
    }
    attrs
}

/// Attributes for adding `item` to the store.
pub fn add_attributes<I: PasswordItem + ?Sized>(item: &I) -> Attributes {
    let mut attrs = base_query(item.account(), item.service(), item.access_group());
    attrs.insert(
        AttrKey::ValueData,
        AttrValue::Data(Zeroizing::new(item.data().to_vec())),
    );
    if let Some(control) = item.access_control() {
        attrs.insert(AttrKey::AccessControl, AttrValue::AccessControl(control.clone()));
    }
    attrs
}

/// Query that reads back the payload of at most one item.
pub fn copy_query(account: &str, service: &str, access_group: Option<&str>) -> Attributes {
    let mut attrs = base_query(account, service, access_group);
    attrs.insert(AttrKey::ReturnData, AttrValue::Bool(true));
    attrs.insert(AttrKey::MatchLimit, AttrValue::MatchLimit(MatchLimit::One));
    attrs
}

/// Query that checks for an item without reading its payload.
pub fn exists_query(account: &str, service: &str, access_group: Option<&str>) -> Attributes {
    let mut attrs = base_query(account, service, access_group);
    attrs.insert(AttrKey::MatchLimit, AttrValue::MatchLimit(MatchLimit::One));
    attrs
}

/// Query that matches the item(s) to delete.
pub fn delete_query(account: &str, service: &str, access_group: Option<&str>) -> Attributes {
    base_query(account, service, access_group)
}
