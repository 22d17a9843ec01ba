//! Process-wide embedded PostgreSQL cluster.
//!
//! `pg-embed-setup-unpriv` keeps one cluster alive for the lifetime of the
//! test process. Test binaries run one after another (or side by side under
//! nextest) against the same data directory, so each process takes an
//! exclusive file lock before bootstrapping and stops the postmaster when it
//! exits.

use std::time::Duration;

use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle};

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Whether `SKIP_TEST_CLUSTER` asks for database suites to be skipped.
///
/// Accepts `1`, `true` or `yes`, case-insensitively.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when `SKIP_TEST_CLUSTER` is set, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Shared cluster handle, started on first use.
///
/// Retries transient bootstrap failures and, on unix, registers an exit
/// handler that stops the postmaster once the test binary finishes.
pub fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    ensure_stable_password();
    #[cfg(unix)]
    exit_cleanup::lock_data_directory()?;
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => {
                #[cfg(unix)]
                exit_cleanup::register(handle);
                return Ok(handle);
            }
            Err(error) if attempt >= SHARED_CLUSTER_RETRIES => return Err(error),
            Err(_) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// A reused data directory keeps the password from its first `initdb`, so
/// every process must present the same one.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "dfds_embedded_test");
        }
    }
}

#[cfg(unix)]
mod exit_cleanup {
    use std::fs::{File, OpenOptions};
    use std::os::fd::AsRawFd;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, OnceLock};
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::time::Duration;

    use color_eyre::eyre::eyre;
    use pg_embedded_setup_unpriv::{BootstrapError, BootstrapResult, ClusterHandle};

    const LOCK_FILE: &str = "dfds-pg-embedded-shared-cluster.lock";

    static POSTMASTER_PID: AtomicI32 = AtomicI32::new(0);
    static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
    static LOCK: Mutex<Option<File>> = Mutex::new(None);

    /// Hold an exclusive lock on the shared data directory until exit.
    pub(super) fn lock_data_directory() -> BootstrapResult<()> {
        let mut held = LOCK.lock().unwrap_or_else(|err| err.into_inner());
        if held.is_some() {
            return Ok(());
        }
        let path = std::env::temp_dir().join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|error| {
                BootstrapError::from(eyre!("open cluster lock '{}': {error}", path.display()))
            })?;
        // SAFETY: the descriptor is owned by `file`, which outlives the call.
        if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) } != 0 {
            let error = std::io::Error::last_os_error();
            return Err(BootstrapError::from(eyre!(
                "lock cluster '{}': {error}",
                path.display()
            )));
        }
        *held = Some(file);
        Ok(())
    }

    fn read_postmaster_pid(data_dir: &Path) -> Option<i32> {
        let dir = cap_std::fs::Dir::open_ambient_dir(data_dir, cap_std::ambient_authority()).ok()?;
        let content = dir.read_to_string("postmaster.pid").ok()?;
        content.lines().next()?.trim().parse().ok()
    }

    extern "C" fn stop_postgres() {
        let stored = POSTMASTER_PID.load(Ordering::Relaxed);
        let pid = match DATA_DIR.get().and_then(|dir| read_postmaster_pid(dir)) {
            Some(current) if stored > 0 && current == stored => current,
            _ => return,
        };
        // SAFETY: `pid` still matches the on-disk postmaster.pid.
        if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
            return;
        }
        for _ in 0..50 {
            std::thread::sleep(Duration::from_millis(100));
            // SAFETY: signal 0 only checks that the process is alive.
            if unsafe { libc::kill(pid, 0) } != 0 {
                return;
            }
        }
        // SAFETY: same pid; graceful shutdown did not finish in time.
        unsafe {
            libc::kill(pid, libc::SIGKILL);
        }
    }

    /// Record the postmaster pid and stop it at process exit, once.
    pub(super) fn register(handle: &ClusterHandle) {
        let data_dir = &handle.settings().data_dir;
        let Some(pid) = read_postmaster_pid(data_dir) else {
            return;
        };
        if POSTMASTER_PID
            .compare_exchange(0, pid, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        let _ = DATA_DIR.set(data_dir.clone());
        // SAFETY: `stop_postgres` is a plain `extern "C"` fn with no arguments.
        if unsafe { libc::atexit(stop_postgres) } != 0 {
            eprintln!(
                "pg-embed: atexit registration failed; postmaster {pid} may outlive the tests"
            );
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use rstest::rstest;

        #[rstest]
        #[case("4242\n/var/data\n5432\n", Some(4242))]
        #[case("garbage\n", None)]
        fn postmaster_pid_comes_from_first_line(
            #[case] content: &str,
            #[case] expected: Option<i32>,
        ) {
            let dir = tempfile::tempdir().expect("tempdir");
            std::fs::write(dir.path().join("postmaster.pid"), content).expect("write pid file");
            assert_eq!(read_postmaster_pid(dir.path()), expected);
        }

        #[rstest]
        fn missing_pid_file_reads_as_none() {
            let dir = tempfile::tempdir().expect("tempdir");
            assert_eq!(read_postmaster_pid(dir.path()), None);
        }
    }
}
