//! Seed rows through the Diesel adapters themselves.

use chrono::Utc;
use dfds_backend::domain::auth::{AuthenticatedUser, PasswordHash};
use dfds_backend::domain::ports::UserRepository as _;
use dfds_backend::domain::{Caller, DisplayName, Email, Role, User, UserId};
use dfds_backend::outbound::persistence::DieselUserRepository;

use super::TestDatabase;

/// Stored PHC string; seeded accounts never log in.
const SEED_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2VlZHNhbHQ$c2VlZGhhc2g";

/// Insert a user with a unique email and return a session caller for it.
pub fn seed_user(db: &TestDatabase, display_name: &str, role: Role) -> Caller {
    let id = UserId::random();
    let user = User::new(
        id.clone(),
        DisplayName::new(display_name).expect("valid display name"),
        Email::new(format!("{}@example.test", id.as_uuid().simple())).expect("valid email"),
        role,
        Utc::now(),
    );
    let repository = DieselUserRepository::new(db.pool.clone());
    db.block_on(repository.create(&user, &PasswordHash::from_stored(SEED_PASSWORD_HASH)))
        .expect("seed user");
    Caller::from_session(AuthenticatedUser::new(id, role))
}
