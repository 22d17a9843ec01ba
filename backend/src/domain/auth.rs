//! Authentication primitives: credentials, registrations, password hashes,
//! and the authenticated principal carried by sessions.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;
use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::user::{DisplayName, Email, Role, UserId, UserValidationError};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length accepted at registration.
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when login or registration payloads are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email was missing or malformed.
    #[error("{0}")]
    Email(UserValidationError),
    /// Display name failed validation.
    #[error("{0}")]
    DisplayName(UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password length outside the accepted range.
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
    /// Self-service registration cannot grant administrator rights.
    #[error("role cannot be requested at registration")]
    ForbiddenRole,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is normalised.
/// - `password` is non-empty but retains caller-provided whitespace to avoid
///   surprising credential comparisons.
///
/// # Examples
/// ```
/// use dfds_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@example.com", "password").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(CredentialsValidationError::Email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for account lookups.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated self-service registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    display_name: DisplayName,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    /// Validate raw registration inputs.
    pub fn try_new(
        email: &str,
        display_name: &str,
        password: &str,
        role: Role,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(CredentialsValidationError::Email)?;
        let display_name =
            DisplayName::new(display_name).map_err(CredentialsValidationError::DisplayName)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        let length = password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(CredentialsValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        if role.is_admin() {
            return Err(CredentialsValidationError::ForbiddenRole);
        }
        Ok(Self {
            email,
            display_name,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    /// Normalised email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Requested display name.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Plaintext password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested platform role.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Errors raised while hashing a password.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Argon2id password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(password: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })
    }

    /// Wrap a stored PHC string.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Verify a plaintext password; malformed stored hashes never verify.
    pub fn verify(&self, password: &str) -> bool {
        argon2::password_hash::PasswordHash::new(&self.0)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Hash used to spend equal work when an account does not exist.
    pub fn decoy() -> &'static Self {
        static DECOY: OnceLock<PasswordHash> = OnceLock::new();
        DECOY.get_or_init(|| {
            Self::hash("decoy-password-for-unknown-accounts")
                .unwrap_or_else(|_| Self(String::new()))
        })
    }

    /// PHC string for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Principal established by a successful login and stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Build a principal from its parts.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Whether the principal holds administrator rights.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
