use thiserror::Error;

/// Every failure a keychain operation can report.
///
/// The set is closed: platform status codes are folded into one of these
/// kinds before they reach a caller (see [`crate::keychain::Status`]).
/// An absent item is not an error at the read API; `get` returns `Ok(None)`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeychainError {
    #[error("Unexpected keychain failure")]
    UnexpectedFailure,

    #[error("Failed to encode string value as UTF-8 data")]
    FailedToEncodeStringAsData,

    #[error("Failed to create access control for this policy on this device")]
    FailedToCreateAccessControl,

    #[error("User canceled the authentication prompt")]
    UserCanceled,

    #[error("Bad request sent to the keychain")]
    BadRequest,

    #[error("Keychain is not available")]
    KeychainNotAvailable,

    #[error("An item with this account, service and access group already exists")]
    DuplicateItem,

    #[error("Keychain item not found")]
    ItemNotFound,

    #[error("User interaction is not allowed right now")]
    InteractionNotAllowed,

    #[error("Keychain item data could not be decoded")]
    DecodeFailure,

    #[error("Authentication failed")]
    AuthenticationFailure,

    #[error("Invalid parameters passed to the keychain")]
    BadParameters,
}

/// Application-level errors for the CLI and configuration layer.
#[derive(Debug, Error)]
pub enum KeystashError {
    // --- Keychain errors ---
    #[error(transparent)]
    Keychain(#[from] KeychainError),

    #[error("Secret not found: {0}")]
    NotFound(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for application results.
pub type Result<T> = std::result::Result<T, KeystashError>;
