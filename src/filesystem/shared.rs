use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::filesystem::VirtualFilesystem;

/// Cloneable handle to a filesystem shared between threads.
///
/// A single mutex guards the whole tree together with the cursor.
#[derive(Debug, Clone, Default)]
pub struct SharedFilesystem {
    inner: Arc<Mutex<VirtualFilesystem>>,
}

impl SharedFilesystem {
    pub fn new(filesystem: VirtualFilesystem) -> Self {
        Self {
            inner: Arc::new(Mutex::new(filesystem)),
        }
    }

    /// Runs `operation` while holding the lock. A poisoned lock is recovered.
    pub fn with<R>(&self, operation: impl FnOnce(&mut VirtualFilesystem) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Filesystem lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        });
        operation(&mut guard)
    }
}
