//! In-memory item store.
//!
//! Follows the platform keychain's matching rules closely enough to test the
//! credential store against it:
//!
//! - `add` without an access group stores the item in the default group
//! - queries without an access group match items in every group
//! - items whose access control needs user interaction answer reads with the
//!   configured [`Interaction`] outcome
//!
//! Nothing is persisted and nothing is encrypted.  Do not use it to hold real
//! secrets beyond the life of the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use zeroize::Zeroizing;

use super::{ItemStore, ItemValue};
use crate::keychain::{
    AccessControl, AttrKey, AttrValue, Attributes, DeviceCapabilities, Identity, ItemClass,
    MatchLimit, Status,
};

/// Store primitive, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Copy,
    Delete,
}

/// Simulated outcome of an authentication prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    /// The user authenticates successfully.
    #[default]
    Allowed,
    /// The caller is in a context where no prompt may be shown.
    NotAllowed,
    /// The user dismisses the prompt.
    Canceled,
    /// The user fails to authenticate.
    Failed,
}

impl Interaction {
    fn status(self) -> Status {
        match self {
            Self::Allowed => Status::SUCCESS,
            Self::NotAllowed => Status::INTERACTION_NOT_ALLOWED,
            Self::Canceled => Status::USER_CANCELED,
            Self::Failed => Status::AUTH_FAILED,
        }
    }
}

struct StoredItem {
    data: Zeroizing<Vec<u8>>,
    access_control: Option<AccessControl>,
}

/// Thread-safe in-memory [`ItemStore`].
pub struct MemoryItemStore {
    items: RwLock<BTreeMap<Identity, StoredItem>>,
    default_access_group: Option<String>,
    capabilities: DeviceCapabilities,
    available: AtomicBool,
    interaction: Mutex<Interaction>,
    injected: Mutex<HashMap<Operation, Status>>,
}

impl MemoryItemStore {
    /// Empty store on a device with every capability.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            default_access_group: None,
            capabilities: DeviceCapabilities::full(),
            available: AtomicBool::new(true),
            interaction: Mutex::new(Interaction::Allowed),
            injected: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Group assigned to items added without an explicit access group.
    pub fn with_default_access_group(mut self, group: &str) -> Self {
        self.default_access_group = Some(group.to_string());
        self
    }

    /// Toggle availability.  While unavailable every call fails with
    /// [`Status::NOT_AVAILABLE`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Outcome of the next authentication prompts.
    pub fn set_interaction(&self, interaction: Interaction) {
        *self
            .interaction
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = interaction;
    }

    /// Make the next call of `operation` return `status` without touching
    /// the stored items.
    pub fn fail_next(&self, operation: Operation, status: Status) {
        self.injected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation, status);
    }

    /// Number of stored items across all groups.
    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an item with exactly this identity exists.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(identity)
    }

    /// Pre-flight checks shared by all primitives.
    fn gate(&self, operation: Operation, attrs: &Attributes) -> Option<Status> {
        if !self.available.load(Ordering::SeqCst) {
            return Some(Status::NOT_AVAILABLE);
        }
        let injected = self
            .injected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&operation);
        if injected.is_some() {
            return injected;
        }
        if attrs.class() != Some(ItemClass::GenericPassword) {
            return Some(Status::PARAM);
        }
        None
    }

    /// Does `identity` satisfy the identity part of `query`?
    fn matches(query: &Attributes, identity: &Identity) -> bool {
        let field = |key: AttrKey, value: Option<&str>| match query.get(key) {
            None => true,
            Some(AttrValue::String(wanted)) => value == Some(wanted.as_str()),
            Some(_) => false,
        };
        field(AttrKey::Account, Some(identity.account.as_str()))
            && field(AttrKey::Service, Some(identity.service.as_str()))
            && field(AttrKey::AccessGroup, identity.access_group.as_deref())
    }

    fn current_interaction(&self) -> Interaction {
        *self
            .interaction
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore for MemoryItemStore {
    fn add(&self, attributes: &Attributes) -> Status {
        if let Some(status) = self.gate(Operation::Add, attributes) {
            return status;
        }

        let (Some(account), Some(service)) = (
            attributes.string(AttrKey::Account),
            attributes.string(AttrKey::Service),
        ) else {
            return Status::PARAM;
        };
        let group = attributes
            .string(AttrKey::AccessGroup)
            .or(self.default_access_group.as_deref());
        let identity = Identity::new(account, service, group);

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items.contains_key(&identity) {
            return Status::DUPLICATE_ITEM;
        }

        let data = attributes.data().unwrap_or_default().to_vec();
        items.insert(
            identity,
            StoredItem {
                data: Zeroizing::new(data),
                access_control: attributes.access_control().cloned(),
            },
        );
        Status::SUCCESS
    }

    fn copy_matching(&self, query: &Attributes) -> (Status, Option<ItemValue>) {
        if let Some(status) = self.gate(Operation::Copy, query) {
            return (status, None);
        }

        let return_data = query.flag(AttrKey::ReturnData);
        if return_data && query.match_limit() == Some(MatchLimit::All) {
            return (Status::PARAM, None);
        }

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let Some((identity, item)) = items.iter().find(|(id, _)| Self::matches(query, id)) else {
            return (Status::ITEM_NOT_FOUND, None);
        };

        if !return_data {
            let mut attrs = Attributes::new();
            attrs.insert(AttrKey::Class, AttrValue::Class(ItemClass::GenericPassword));
            attrs.insert(AttrKey::Account, AttrValue::String(identity.account.clone()));
            attrs.insert(AttrKey::Service, AttrValue::String(identity.service.clone()));
            if let Some(group) = &identity.access_group {
                attrs.insert(AttrKey::AccessGroup, AttrValue::String(group.clone()));
            }
            return (Status::SUCCESS, Some(ItemValue::Attributes(attrs)));
        }

        let needs_prompt = item
            .access_control
            .as_ref()
            .is_some_and(|ac| ac.requirement().requires_user_interaction());
        if needs_prompt {
            let status = self.current_interaction().status();
            if !status.is_success() {
                return (status, None);
            }
        }

        (Status::SUCCESS, Some(ItemValue::Data(item.data.clone())))
    }

    fn delete(&self, query: &Attributes) -> Status {
        if let Some(status) = self.gate(Operation::Delete, query) {
            return status;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let before = items.len();
        items.retain(|id, _| !Self::matches(query, id));

        if items.len() == before {
            Status::ITEM_NOT_FOUND
        } else {
            Status::SUCCESS
        }
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }
}
