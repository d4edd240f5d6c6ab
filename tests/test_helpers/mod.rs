//! Environment guards and worker discovery shared by database test suites.

use camino::Utf8PathBuf;
use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};

const WORKER_NAME: &str = "pg_worker";

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Applies environment variable changes until dropped.
///
/// Guards are serialized through a process-wide lock, so at most one is
/// alive at a time.
pub struct EnvVarGuard {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets or removes each variable and remembers its previous value.
    pub fn set_many(changes: &[(OsString, Option<OsString>)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = changes
            .iter()
            .map(|(key, value)| {
                let prior = env::var_os(key);
                // SAFETY: ENV_MUTEX serializes environment mutations in tests.
                unsafe {
                    match value {
                        Some(next) => env::set_var(key, next),
                        None => env::remove_var(key),
                    }
                }
                (key.clone(), prior)
            })
            .collect();

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..).rev() {
            // SAFETY: the guard still holds ENV_MUTEX.
            unsafe {
                match value {
                    Some(prior) => env::set_var(&key, prior),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

/// Finds the `pg_worker` binary used when the suite runs as root.
///
/// `CARGO_BIN_EXE_pg_worker` wins, then the binary Cargo built next to this
/// test executable, then the first match on `PATH`.
pub fn locate_pg_worker_path() -> Option<Utf8PathBuf> {
    env::var_os("CARGO_BIN_EXE_pg_worker")
        .map(Utf8PathBuf::try_from)
        .or_else(|| option_env!("CARGO_BIN_EXE_pg_worker").map(|path| Ok(path.into())))
        .and_then(Result::ok)
        .filter(|path| path.is_file())
        .or_else(worker_near_target)
        .or_else(worker_on_path)
}

fn worker_near_target() -> Option<Utf8PathBuf> {
    let exe = Utf8PathBuf::try_from(env::current_exe().ok()?).ok()?;
    let target_dir = exe.parent()?.parent()?;
    Some(target_dir.join(WORKER_NAME)).filter(|path| path.is_file())
}

fn worker_on_path() -> Option<Utf8PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .filter_map(|dir| Utf8PathBuf::try_from(dir).ok())
        .map(|dir| dir.join(WORKER_NAME))
        .find(|candidate| candidate.is_file())
}
