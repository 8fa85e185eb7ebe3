//! Platform authentication helpers.
//!
//! Password hashing lives in [`password`]; session restoration (principal
//! capability plus an injected user loader) lives in [`session`].

pub mod password;
pub mod session;

use thiserror::Error;

pub use password::{HashingParams, PasswordHasher, verify_password};
pub use session::{AnonymousPrincipal, FnLoader, LoginManager, UserLoader, UserPrincipal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthnError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password is not a readable attribute")]
    WriteOnlyPassword,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),
    #[error("user loader failed: {0}")]
    Loader(String),
}

pub type AuthnResult<T> = Result<T, AuthnError>;
