use std::sync::{Arc, Mutex};

/// Holder for the bearer credential. Explicit and cloneable rather than
/// process-global, so tests can run isolated instances side by side. Clones
/// share the same underlying credential.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.inner.lock().unwrap().clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.inner.lock().unwrap() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.inner.lock().unwrap() = None;
    }
}
