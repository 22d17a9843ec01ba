//! Fixtures shared by the session configuration tests.

use std::collections::HashMap;
use std::io::Write;

use mockable::MockEnv;
use tempfile::NamedTempFile;

use super::{ALLOW_EPHEMERAL_ENV, COOKIE_SECURE_ENV, KEY_FILE_ENV, SAMESITE_ENV};

/// Write `len` bytes of key material to a temporary file.
pub(super) fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temporary key file");
    file.write_all(&vec![b'k'; len]).expect("write key material");
    file
}

pub(super) fn path_of(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}

/// Environment backed by a fixed map.
pub(super) fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

/// A complete, valid release configuration pointing at `key_path`.
pub(super) fn release_vars(key_path: &str) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key_path.to_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}
