//! Test utilities shared by unit tests across the crate.
//!
//! Only compiled for tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{AuthenticatedUser, Caller, DisplayName, Email, Role, User, UserId};

/// Fixed instant every fixture clock reports.
pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock frozen at [`fixture_timestamp`].
pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

/// Session caller with a fresh identity.
pub(crate) fn session_caller(role: Role) -> Caller {
    Caller::from_session(AuthenticatedUser::new(UserId::random(), role))
}

/// Stored user with the given identity.
pub(crate) fn user_with(id: &UserId, email: &str, role: Role) -> User {
    User::new(
        id.clone(),
        DisplayName::new("Test User").expect("fixture name"),
        Email::new(email).expect("fixture email"),
        role,
        fixture_timestamp(),
    )
}
