//! Platform status codes and their mapping onto [`KeychainError`].
//!
//! Item stores report outcomes as raw `OSStatus`-style integers.  This
//! module is the only place those integers are interpreted; everything
//! above it works with `Result<_, KeychainError>`.

use std::fmt;

use crate::errors::KeychainError;

/// Raw outcome code returned by an [`ItemStore`](crate::backend::ItemStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
    pub const SUCCESS: Status = Status(0);
    pub const UNIMPLEMENTED: Status = Status(-4);
    pub const IO: Status = Status(-36);
    pub const PARAM: Status = Status(-50);
    pub const USER_CANCELED: Status = Status(-128);
    pub const BAD_REQUEST: Status = Status(-909);
    pub const NOT_AVAILABLE: Status = Status(-25291);
    pub const AUTH_FAILED: Status = Status(-25293);
    pub const DUPLICATE_ITEM: Status = Status(-25299);
    pub const ITEM_NOT_FOUND: Status = Status(-25300);
    pub const INTERACTION_NOT_ALLOWED: Status = Status(-25308);
    pub const DECODE: Status = Status(-26275);

    /// Returns `true` for the success code.
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Convert the status into a `Result`, mapping every non-success code
    /// to exactly one [`KeychainError`].
    pub fn check(self) -> Result<(), KeychainError> {
        match KeychainError::from_status(self) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OSStatus {}", self.0)
    }
}

impl KeychainError {
    /// Map a status code to an error kind.
    ///
    /// Returns `None` only for [`Status::SUCCESS`].  Codes outside the
    /// known set become [`KeychainError::UnexpectedFailure`].
    pub fn from_status(status: Status) -> Option<Self> {
        let err = match status {
            Status::SUCCESS => return None,
            Status::PARAM => Self::BadParameters,
            Status::USER_CANCELED => Self::UserCanceled,
            Status::BAD_REQUEST => Self::BadRequest,
            Status::NOT_AVAILABLE => Self::KeychainNotAvailable,
            Status::DUPLICATE_ITEM => Self::DuplicateItem,
            Status::ITEM_NOT_FOUND => Self::ItemNotFound,
            Status::INTERACTION_NOT_ALLOWED => Self::InteractionNotAllowed,
            Status::DECODE => Self::DecodeFailure,
            Status::AUTH_FAILED => Self::AuthenticationFailure,
            _ => Self::UnexpectedFailure,
        };
        Some(err)
    }
}
