use std::sync::{Mutex, MutexGuard, OnceLock};

/// Global lock for environment variable modifications in tests.
/// All tests that modify environment variables (the path and program
/// overrides) should acquire this lock to prevent race conditions between
/// parallel test executions.
pub static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
