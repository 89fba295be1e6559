//! Accessibility classes, authentication requirements, and the
//! `AccessControl` descriptor built from them.
//!
//! An [`AccessControl`] can only be obtained through [`AccessControl::new`],
//! which validates the combination against the device's capabilities.
//! There is no way to observe a half-built descriptor.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use super::Result;
use crate::errors::KeychainError;

/// When a stored item may be unlocked for reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accessibility {
    WhenUnlocked,
    AfterFirstUnlock,
    Always,
    WhenPasscodeSetThisDeviceOnly,
    WhenUnlockedThisDeviceOnly,
    AfterFirstUnlockThisDeviceOnly,
    AlwaysThisDeviceOnly,
}

impl Accessibility {
    /// Every accessibility class, in declaration order.
    pub const ALL: [Accessibility; 7] = [
        Self::WhenUnlocked,
        Self::AfterFirstUnlock,
        Self::Always,
        Self::WhenPasscodeSetThisDeviceOnly,
        Self::WhenUnlockedThisDeviceOnly,
        Self::AfterFirstUnlockThisDeviceOnly,
        Self::AlwaysThisDeviceOnly,
    ];

    /// The platform's native constant for this class (`kSecAttrAccessible*`).
    pub fn as_native(self) -> &'static str {
        match self {
            Self::WhenUnlocked => "ak",
            Self::AfterFirstUnlock => "ck",
            Self::Always => "dk",
            Self::WhenPasscodeSetThisDeviceOnly => "akpu",
            Self::WhenUnlockedThisDeviceOnly => "aku",
            Self::AfterFirstUnlockThisDeviceOnly => "cku",
            Self::AlwaysThisDeviceOnly => "dku",
        }
    }

    /// Parse a native constant.  Anything outside the seven known values
    /// yields `None`.
    pub fn from_native(value: &str) -> Option<Self> {
        match value {
            "ak" => Some(Self::WhenUnlocked),
            "ck" => Some(Self::AfterFirstUnlock),
            "dk" => Some(Self::Always),
            "akpu" => Some(Self::WhenPasscodeSetThisDeviceOnly),
            "aku" => Some(Self::WhenUnlockedThisDeviceOnly),
            "cku" => Some(Self::AfterFirstUnlockThisDeviceOnly),
            "dku" => Some(Self::AlwaysThisDeviceOnly),
            _ => None,
        }
    }
}

/// Authentication constraints attached to an access control.
///
/// Bit values match `SecAccessControlCreateFlags`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AuthRequirement(u32);

impl AuthRequirement {
    pub const NONE: AuthRequirement = AuthRequirement(0);
    pub const USER_PRESENCE: AuthRequirement = AuthRequirement(1 << 0);
    pub const BIOMETRY_ANY: AuthRequirement = AuthRequirement(1 << 1);
    pub const BIOMETRY_CURRENT_SET: AuthRequirement = AuthRequirement(1 << 3);
    pub const DEVICE_PASSCODE: AuthRequirement = AuthRequirement(1 << 4);
    pub const OR: AuthRequirement = AuthRequirement(1 << 14);
    pub const AND: AuthRequirement = AuthRequirement(1 << 15);
    pub const PRIVATE_KEY_USAGE: AuthRequirement = AuthRequirement(1 << 30);
    pub const APPLICATION_PASSWORD: AuthRequirement = AuthRequirement(1 << 31);

    const CONSTRAINTS: [AuthRequirement; 5] = [
        Self::USER_PRESENCE,
        Self::BIOMETRY_ANY,
        Self::BIOMETRY_CURRENT_SET,
        Self::DEVICE_PASSCODE,
        Self::APPLICATION_PASSWORD,
    ];

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit in `other` is also set in `self`.
    pub fn contains(self, other: AuthRequirement) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of authentication constraints (combinators excluded).
    pub fn constraint_count(self) -> usize {
        Self::CONSTRAINTS
            .iter()
            .filter(|c| self.contains(**c))
            .count()
    }

    /// Whether reading an item guarded by this requirement prompts the user.
    pub fn requires_user_interaction(self) -> bool {
        self.contains(Self::USER_PRESENCE)
            || self.contains(Self::BIOMETRY_ANY)
            || self.contains(Self::BIOMETRY_CURRENT_SET)
            || self.contains(Self::DEVICE_PASSCODE)
    }

    fn needs_biometry(self) -> bool {
        self.contains(Self::BIOMETRY_ANY) || self.contains(Self::BIOMETRY_CURRENT_SET)
    }
}

impl BitOr for AuthRequirement {
    type Output = AuthRequirement;

    fn bitor(self, rhs: Self) -> Self::Output {
        AuthRequirement(self.0 | rhs.0)
    }
}

impl fmt::Debug for AuthRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(AuthRequirement, &str); 8] = [
            (AuthRequirement::USER_PRESENCE, "USER_PRESENCE"),
            (AuthRequirement::BIOMETRY_ANY, "BIOMETRY_ANY"),
            (AuthRequirement::BIOMETRY_CURRENT_SET, "BIOMETRY_CURRENT_SET"),
            (AuthRequirement::DEVICE_PASSCODE, "DEVICE_PASSCODE"),
            (AuthRequirement::OR, "OR"),
            (AuthRequirement::AND, "AND"),
            (AuthRequirement::PRIVATE_KEY_USAGE, "PRIVATE_KEY_USAGE"),
            (AuthRequirement::APPLICATION_PASSWORD, "APPLICATION_PASSWORD"),
        ];

        if self.is_empty() {
            return f.write_str("AuthRequirement(NONE)");
        }
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "AuthRequirement({})", set.join(" | "))
    }
}

/// What the device can enforce.  Reported by the item store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCapabilities {
    /// Touch ID / Face ID or an equivalent sensor is enrolled.
    pub biometry: bool,
    /// A device passcode is set.
    pub passcode_set: bool,
}

impl DeviceCapabilities {
    /// A device that supports every requirement.
    pub fn full() -> Self {
        Self {
            biometry: true,
            passcode_set: true,
        }
    }
}

/// Opaque access-control descriptor: an accessibility class plus an
/// authentication requirement that the device has agreed to enforce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    accessibility: Accessibility,
    requirement: AuthRequirement,
}

impl AccessControl {
    /// Validate `(accessibility, requirement)` against `capabilities`.
    ///
    /// Fails with [`KeychainError::FailedToCreateAccessControl`] when the
    /// device cannot honour the combination.  The check is deterministic,
    /// so callers should not retry.
    pub fn new(
        accessibility: Accessibility,
        requirement: AuthRequirement,
        capabilities: DeviceCapabilities,
    ) -> Result<Self> {
        if !Self::is_supported(accessibility, requirement, capabilities) {
            tracing::debug!(
                ?accessibility,
                ?requirement,
                ?capabilities,
                "access control combination rejected"
            );
            return Err(KeychainError::FailedToCreateAccessControl);
        }

        Ok(Self {
            accessibility,
            requirement,
        })
    }

    fn is_supported(
        accessibility: Accessibility,
        requirement: AuthRequirement,
        capabilities: DeviceCapabilities,
    ) -> bool {
        if requirement.contains(AuthRequirement::PRIVATE_KEY_USAGE) {
            return false;
        }

        let or = requirement.contains(AuthRequirement::OR);
        let and = requirement.contains(AuthRequirement::AND);
        if or && and {
            return false;
        }
        if (or || and) && requirement.constraint_count() < 2 {
            return false;
        }

        if requirement.needs_biometry() && !capabilities.biometry {
            return false;
        }
        if requirement.contains(AuthRequirement::DEVICE_PASSCODE) && !capabilities.passcode_set {
            return false;
        }
        if requirement.contains(AuthRequirement::USER_PRESENCE)
            && !(capabilities.biometry || capabilities.passcode_set)
        {
            return false;
        }

        !(accessibility == Accessibility::WhenPasscodeSetThisDeviceOnly
            && !capabilities.passcode_set)
    }

    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    pub fn requirement(&self) -> AuthRequirement {
        self.requirement
    }
}
