use std::sync::Mutex;

/// Serializes tests that touch process-wide state (env vars).
pub(crate) static ENV_MUTEX: Mutex<()> = Mutex::new(());
