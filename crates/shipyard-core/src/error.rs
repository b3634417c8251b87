use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::validation::PasswordIssue;

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("name must be at least 3 characters")]
    NameTooShort,
    #[error("handle must look like Name#1234")]
    InvalidHandle,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error("password does not meet the requirements")]
    WeakPassword(Vec<PasswordIssue>),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// The CLI collapses `NotFound` and `BadPassword` into one user-facing
/// message; callers that need the distinction still get it here.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no account with that email")]
    NotFound,
    #[error("wrong password")]
    BadPassword,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("a logged-in account is required")]
    NoActiveUser,
    #[error("listing not found")]
    ListingNotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("message body is empty")]
    EmptyBody,
    #[error("a logged-in account is required")]
    NoActiveUser,
    #[error("listing not found")]
    ListingNotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("administrator access required")]
    NotAdmin,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("file is empty")]
    Empty,
}
