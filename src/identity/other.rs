//! Fallback for targets without a stable file identity.

use std::fs::File;

use super::{FileIdentity, IdentityError, IdentityResult};

pub(super) fn identity_of(_file: &File) -> IdentityResult<FileIdentity> {
    Err(IdentityError::Unsupported)
}
