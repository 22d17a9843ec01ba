//! Startups, their teams, and email invitations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::ids::uuid_id;
use super::sanitize::sanitize_inline;
use super::user::{DisplayName, Email, Role, UserId};

pub const STARTUP_NAME_MIN: usize = 2;
pub const STARTUP_NAME_MAX: usize = 80;
pub const TAGLINE_MAX: usize = 160;
/// Days an invite stays valid after it is issued.
pub const INVITE_TTL_DAYS: i64 = 7;
const INVITE_TOKEN_LEN: usize = 40;
const INVITE_TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

uuid_id!(
    /// Identifier of a startup.
    StartupId
);
uuid_id!(
    /// Identifier of a team invite.
    InviteId
);

/// Funding stage a startup reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupStage {
    Idea,
    Prototype,
    PreSeed,
    Seed,
    SeriesA,
    Growth,
}

impl StartupStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Prototype => "prototype",
            Self::PreSeed => "pre_seed",
            Self::Seed => "seed",
            Self::SeriesA => "series_a",
            Self::Growth => "growth",
        }
    }
}

impl FromStr for StartupStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idea" => Ok(Self::Idea),
            "prototype" => Ok(Self::Prototype),
            "pre_seed" => Ok(Self::PreSeed),
            "seed" => Ok(Self::Seed),
            "series_a" => Ok(Self::SeriesA),
            "growth" => Ok(Self::Growth),
            other => Err(format!("unknown startup stage '{other}'")),
        }
    }
}

/// Validation errors for startup creation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartupValidationError {
    #[error("name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("tagline must be at most {max} characters")]
    TaglineTooLong { max: usize },
}

impl StartupValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::NameLength { .. } => "name",
            Self::TaglineTooLong { .. } => "tagline",
        }
    }
}

/// Validated startup creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStartup {
    pub name: String,
    pub tagline: Option<String>,
    pub stage: StartupStage,
}

impl NewStartup {
    pub fn try_new(
        name: &str,
        tagline: Option<&str>,
        stage: StartupStage,
    ) -> Result<Self, StartupValidationError> {
        let name = sanitize_inline(name);
        let length = name.chars().count();
        if !(STARTUP_NAME_MIN..=STARTUP_NAME_MAX).contains(&length) {
            return Err(StartupValidationError::NameLength {
                min: STARTUP_NAME_MIN,
                max: STARTUP_NAME_MAX,
            });
        }
        let tagline = tagline.map(sanitize_inline).filter(|text| !text.is_empty());
        if tagline
            .as_ref()
            .is_some_and(|text| text.chars().count() > TAGLINE_MAX)
        {
            return Err(StartupValidationError::TaglineTooLong { max: TAGLINE_MAX });
        }
        Ok(Self {
            name,
            tagline,
            stage,
        })
    }
}

/// Stored startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Startup {
    pub id: StartupId,
    pub owner_id: UserId,
    pub name: String,
    pub tagline: Option<String>,
    pub stage: StartupStage,
    pub created_at: DateTime<Utc>,
}

/// Team member of a startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupMember {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

/// Lifecycle of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Revoked,
}

impl InviteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Revoked => "REVOKED",
        }
    }
}

impl FromStr for InviteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "REVOKED" => Ok(Self::Revoked),
            other => Err(format!("unknown invite status '{other}'")),
        }
    }
}

/// Random bearer token carried by an invite link.
#[derive(Clone, PartialEq, Eq)]
pub struct InviteToken(Zeroizing<String>);

impl InviteToken {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token = (0..INVITE_TOKEN_LEN)
            .map(|_| {
                char::from(INVITE_TOKEN_ALPHABET[rng.gen_range(0..INVITE_TOKEN_ALPHABET.len())])
            })
            .collect();
        Self(Zeroizing::new(token))
    }

    /// Wrap a token presented by an invitee.
    pub fn from_presented(raw: &str) -> Option<Self> {
        let valid = raw.len() == INVITE_TOKEN_LEN && raw.bytes().all(|b| b.is_ascii_alphanumeric());
        valid.then(|| Self(Zeroizing::new(raw.to_owned())))
    }

    /// Hex SHA-256 digest stored in place of the token.
    pub fn hash_hex(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for InviteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InviteToken(..)")
    }
}

/// Stored invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInvite {
    pub id: InviteId,
    pub startup_id: StartupId,
    pub inviter_id: UserId,
    pub email: Email,
    #[serde(skip)]
    pub token_hash: String,
    pub status: InviteStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TeamInvite {
    /// Build a pending invite issued at `now`.
    pub fn issue(
        startup_id: StartupId,
        inviter_id: UserId,
        email: Email,
        token: &InviteToken,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InviteId::random(),
            startup_id,
            inviter_id,
            email,
            token_hash: token.hash_hex(),
            status: InviteStatus::Pending,
            expires_at: now + Duration::days(INVITE_TTL_DAYS),
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Invite returned to its issuer, including the one-time token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedInvite {
    pub invite: TeamInvite,
    pub token: String,
}
