use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::session::Session;

/// All known sessions, keyed by an externally supplied stable id.
/// Lookup is create-or-get; an unseen id is never an error.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session for `id`, creating it on first contact.
    pub fn get_or_create(&self, id: &str) -> Arc<Session> {
        if let Some(session) = self.inner.read().expect("session store lock").get(id) {
            return Arc::clone(session);
        }
        let mut map = self.inner.write().expect("session store lock");
        // A concurrent caller may have created it between the locks.
        Arc::clone(
            map.entry(id.to_owned())
                .or_insert_with(|| Arc::new(Session::new(id))),
        )
    }

    /// Remove a session when its owning connection ends.
    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.inner.write().expect("session store lock").remove(id)
    }

    /// Snapshot of all sessions for fan-out. Sessions created after the
    /// snapshot are picked up by the next fan-out.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.inner
            .read()
            .expect("session store lock")
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("session store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
