//! Developer API keys.
//!
//! A token has the shape `dfds_<prefix>_<secret>`: an eight character
//! lowercase alphanumeric lookup prefix and a 32 character alphanumeric
//! secret. Only the prefix and the SHA-256 digest of the whole token are
//! persisted; the plaintext is shown to its owner once, at creation.
//!
//! Verification hashes the presented token and compares it against every
//! stored candidate sharing the prefix in constant time, so the comparison
//! cost does not depend on which candidate (if any) matches.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::ids::uuid_id;
use super::sanitize::sanitize_inline;
use super::user::{Role, UserId};

/// Scheme marker at the start of every token.
pub const TOKEN_SCHEME: &str = "dfds";
/// Length of the lookup prefix.
pub const KEY_PREFIX_LEN: usize = 8;
/// Length of the secret segment.
pub const KEY_SECRET_LEN: usize = 32;
/// Longest accepted key label.
pub const API_KEY_NAME_MAX: usize = 64;
/// Longest accepted lifetime for a key, in days.
pub const API_KEY_EXPIRY_DAYS_MAX: u32 = 365;

const PREFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SECRET_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn random_segment<R: Rng>(rng: &mut R, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
        .collect()
}

/// Access level granted to an API key.
///
/// Levels are ordered: `Admin` includes everything `Write` may do, which in
/// turn includes `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Admin,
}

impl Permission {
    /// Whether this level satisfies `required`.
    ///
    /// # Examples
    /// ```
    /// use dfds_backend::domain::Permission;
    ///
    /// assert!(Permission::Admin.allows(Permission::Write));
    /// assert!(!Permission::Read.allows(Permission::Write));
    /// ```
    pub fn allows(self, required: Permission) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or submitted permission is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission '{0}'")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownPermission(other.to_owned())),
        }
    }
}

uuid_id!(
    /// Identifier of a stored API key.
    ApiKeyId
);

/// Errors raised while parsing a presented token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiKeyTokenError {
    #[error("API key is malformed")]
    Malformed,
}

/// Lookup prefix of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    /// Validate a prefix read from a token or from storage.
    pub fn new(raw: impl Into<String>) -> Result<Self, ApiKeyTokenError> {
        let raw = raw.into();
        let valid = raw.len() == KEY_PREFIX_LEN
            && raw
                .bytes()
                .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit());
        if valid {
            Ok(Self(raw))
        } else {
            Err(ApiKeyTokenError::Malformed)
        }
    }
}

impl AsRef<str> for KeyPrefix {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// SHA-256 digest of a full token.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyHash([u8; 32]);

impl KeyHash {
    /// Decode a hex digest read from storage.
    pub fn from_hex(encoded: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0_u8; 32];
        hex::decode_to_slice(encoded, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Hex encoding used for storage.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Constant-time equality.
    pub fn ct_matches(&self, other: &KeyHash) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyHash(..)")
    }
}

/// A full plaintext token.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyToken {
    prefix: KeyPrefix,
    raw: Zeroizing<String>,
}

impl ApiKeyToken {
    /// Mint a fresh token from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Mint a fresh token from the supplied RNG.
    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let prefix = random_segment(rng, PREFIX_ALPHABET, KEY_PREFIX_LEN);
        let secret = Zeroizing::new(random_segment(rng, SECRET_ALPHABET, KEY_SECRET_LEN));
        let raw = Zeroizing::new(format!("{TOKEN_SCHEME}_{prefix}_{}", secret.as_str()));
        Self {
            prefix: KeyPrefix(prefix),
            raw,
        }
    }

    /// Parse a presented token.
    ///
    /// # Examples
    /// ```
    /// use dfds_backend::domain::ApiKeyToken;
    ///
    /// let token = ApiKeyToken::parse("dfds_ab12cd34_0123456789abcdefABCDEF0123456789").unwrap();
    /// assert_eq!(token.prefix().as_ref(), "ab12cd34");
    /// assert!(ApiKeyToken::parse("dfds_short_secret").is_err());
    /// ```
    pub fn parse(presented: &str) -> Result<Self, ApiKeyTokenError> {
        let mut parts = presented.splitn(3, '_');
        let (Some(scheme), Some(prefix), Some(secret)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ApiKeyTokenError::Malformed);
        };
        if scheme != TOKEN_SCHEME
            || secret.len() != KEY_SECRET_LEN
            || !secret.bytes().all(|byte| byte.is_ascii_alphanumeric())
        {
            return Err(ApiKeyTokenError::Malformed);
        }
        Ok(Self {
            prefix: KeyPrefix::new(prefix)?,
            raw: Zeroizing::new(presented.to_owned()),
        })
    }

    pub fn prefix(&self) -> &KeyPrefix {
        &self.prefix
    }

    /// Digest stored for this token.
    pub fn hash(&self) -> KeyHash {
        KeyHash(Sha256::digest(self.raw.as_bytes()).into())
    }

    /// Plaintext for the one-time reveal at creation.
    pub fn expose(&self) -> &str {
        self.raw.as_str()
    }
}

impl fmt::Debug for ApiKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKeyToken({TOKEN_SCHEME}_{}_..)", self.prefix)
    }
}

/// Stored API key row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub id: ApiKeyId,
    pub owner_id: UserId,
    pub owner_role: Role,
    pub name: String,
    pub prefix: KeyPrefix,
    pub key_hash: KeyHash,
    pub permission: Permission,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// A key stops working at the instant it expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Owner-facing view without the hash.
    pub fn summary(&self) -> ApiKeySummary {
        ApiKeySummary {
            id: self.id,
            name: self.name.clone(),
            prefix: self.prefix.to_string(),
            permission: self.permission,
            expires_at: self.expires_at,
            revoked_at: self.revoked_at,
            last_used_at: self.last_used_at,
            created_at: self.created_at,
        }
    }
}

/// Find the candidate whose hash matches `presented`.
///
/// Every candidate is compared; the loop never exits early on a match.
pub fn find_matching_key<'a>(
    presented: &KeyHash,
    candidates: &'a [ApiKeyRecord],
) -> Option<&'a ApiKeyRecord> {
    let mut matched = None;
    for candidate in candidates {
        let is_match = candidate.key_hash.ct_matches(presented);
        if is_match && matched.is_none() {
            matched = Some(candidate);
        }
    }
    matched
}

/// API key as listed to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySummary {
    pub id: ApiKeyId,
    pub name: String,
    pub prefix: String,
    pub permission: Permission,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A freshly minted key together with its one-time plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApiKey {
    #[serde(flatten)]
    pub summary: ApiKeySummary,
    pub token: String,
}

/// Principal resolved from a verified API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyPrincipal {
    pub key_id: ApiKeyId,
    pub owner_id: UserId,
    pub owner_role: Role,
    pub permission: Permission,
}

/// Validation errors for key creation requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewApiKeyError {
    #[error("name must be between 1 and {max} characters")]
    NameLength { max: usize },
    #[error("expiry must be between 1 and {max} days")]
    ExpiryOutOfRange { max: u32 },
}

impl NewApiKeyError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::NameLength { .. } => "name",
            Self::ExpiryOutOfRange { .. } => "expiresInDays",
        }
    }
}

/// Validated request to mint a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiKey {
    name: String,
    permission: Permission,
    expires_in_days: Option<u32>,
}

impl NewApiKey {
    pub fn try_new(
        name: &str,
        permission: Permission,
        expires_in_days: Option<u32>,
    ) -> Result<Self, NewApiKeyError> {
        let name = sanitize_inline(name);
        let length = name.chars().count();
        if length == 0 || length > API_KEY_NAME_MAX {
            return Err(NewApiKeyError::NameLength {
                max: API_KEY_NAME_MAX,
            });
        }
        if let Some(days) = expires_in_days {
            if !(1..=API_KEY_EXPIRY_DAYS_MAX).contains(&days) {
                return Err(NewApiKeyError::ExpiryOutOfRange {
                    max: API_KEY_EXPIRY_DAYS_MAX,
                });
            }
        }
        Ok(Self {
            name,
            permission,
            expires_in_days,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn expires_in_days(&self) -> Option<u32> {
        self.expires_in_days
    }
}
