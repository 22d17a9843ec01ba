//! Client-supplied idempotency keys for retry-safe mutations.
//!
//! Clients send the key in the `Idempotency-Key` header. A repeated request
//! carrying a key that already produced a resource receives that resource
//! unchanged instead of triggering the mutation again.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum accepted key length in bytes.
pub const IDEMPOTENCY_KEY_MAX: usize = 128;

/// Validation errors for [`IdempotencyKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdempotencyKeyValidationError {
    /// The key string was empty.
    #[error("idempotency key must not be empty")]
    EmptyKey,
    /// The key string was longer than [`IDEMPOTENCY_KEY_MAX`].
    #[error("idempotency key must be at most {max} characters")]
    TooLong { max: usize },
    /// The key contained whitespace, control, or non-ASCII characters.
    #[error("idempotency key must contain only visible ASCII characters")]
    InvalidCharacters,
}

/// Opaque client token used to deduplicate logically repeated requests.
///
/// Any visible ASCII string of 1 to 128 characters is accepted, so clients
/// may use UUIDs, ULIDs, or their own request identifiers.
///
/// # Examples
/// ```
/// use dfds_backend::domain::IdempotencyKey;
///
/// let key = IdempotencyKey::new("550e8400-e29b-41d4-a716-446655440000").expect("valid key");
/// assert_eq!(key.as_ref(), "550e8400-e29b-41d4-a716-446655440000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validate and construct an [`IdempotencyKey`].
    pub fn new(key: impl Into<String>) -> Result<Self, IdempotencyKeyValidationError> {
        let key = key.into();
        if key.is_empty() {
            return Err(IdempotencyKeyValidationError::EmptyKey);
        }
        if key.len() > IDEMPOTENCY_KEY_MAX {
            return Err(IdempotencyKeyValidationError::TooLong {
                max: IDEMPOTENCY_KEY_MAX,
            });
        }
        if !key.bytes().all(|byte| byte.is_ascii_graphic()) {
            return Err(IdempotencyKeyValidationError::InvalidCharacters);
        }
        Ok(Self(key))
    }

    /// Generate a random UUID-shaped key; primarily useful in tests.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<IdempotencyKey> for String {
    fn from(value: IdempotencyKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdempotencyKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
