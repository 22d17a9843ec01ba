//! Authenticated principal of a request.

use super::api_key::{ApiKeyId, ApiKeyPrincipal, Permission};
use super::auth::AuthenticatedUser;
use super::error::Error;
use super::user::{Role, UserId};

/// How the caller proved its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerSource {
    Session,
    ApiKey(ApiKeyId),
}

/// The user on whose behalf a request runs, with the permission it holds.
///
/// Session callers hold `admin` when their role is admin and `write`
/// otherwise. API key callers hold the key's permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
    role: Role,
    permission: Permission,
    source: CallerSource,
}

impl Caller {
    pub fn from_session(user: AuthenticatedUser) -> Self {
        let permission = if user.is_admin() {
            Permission::Admin
        } else {
            Permission::Write
        };
        Self {
            user_id: user.id,
            role: user.role,
            permission,
            source: CallerSource::Session,
        }
    }

    pub fn from_api_key(principal: ApiKeyPrincipal) -> Self {
        Self {
            user_id: principal.owner_id,
            role: principal.owner_role,
            permission: principal.permission,
            source: CallerSource::ApiKey(principal.key_id),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn source(&self) -> CallerSource {
        self.source
    }

    /// Admin rights need both the admin role and an admin-level credential.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin() && self.permission.allows(Permission::Admin)
    }

    /// Fail with `403 forbidden` unless the credential carries `required`.
    pub fn require(&self, required: Permission) -> Result<(), Error> {
        if self.permission.allows(required) {
            Ok(())
        } else {
            Err(Error::forbidden(format!("{required} permission required")))
        }
    }

    /// Fail with `403 forbidden` unless the caller is an administrator.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("administrator access required"))
        }
    }

    /// Whether the caller authenticated with the session cookie.
    pub fn is_session(&self) -> bool {
        matches!(self.source, CallerSource::Session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Admin, Permission::Admin)]
    #[case(Role::Founder, Permission::Write)]
    #[case(Role::Investor, Permission::Write)]
    fn session_permission_follows_role(#[case] role: Role, #[case] expected: Permission) {
        let caller = Caller::from_session(AuthenticatedUser::new(UserId::random(), role));
        assert_eq!(caller.permission(), expected);
        assert!(caller.is_session());
    }

    #[rstest]
    fn admin_role_with_read_key_is_not_admin() {
        let caller = Caller::from_api_key(ApiKeyPrincipal {
            key_id: ApiKeyId::random(),
            owner_id: UserId::random(),
            owner_role: Role::Admin,
            permission: Permission::Read,
        });
        assert!(!caller.is_admin());
        let err = caller.require(Permission::Write).expect_err("read key");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn non_admin_is_forbidden_from_admin_operations() {
        let caller = Caller::from_session(AuthenticatedUser::new(UserId::random(), Role::Founder));
        let err = caller.require_admin().expect_err("not admin");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
