use std::collections::HashMap;
use std::sync::Mutex;

use crate::auth::dto::CredentialPair;
use crate::error::ApiError;

/// Fixed keys under which the credential pair is persisted.
pub const ACCESS_TOKEN_KEY: &str = "cookshare.access";
pub const REFRESH_TOKEN_KEY: &str = "cookshare.refresh";

/// Persistent key-value storage for the credential pair.
///
/// Implementations map onto whatever the host platform provides (browser
/// localStorage, a keychain, a file). The storage itself is a plain string
/// store; the pair invariant is enforced by [`load_pair`], [`save_pair`]
/// and [`clear_pair`], which are the only accessors the session layer uses.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Load the persisted session, if any. A half-written pair (exactly one
/// credential present) is treated as absent and cleared.
pub fn load_pair(store: &dyn CredentialStore) -> Result<Option<CredentialPair>, ApiError> {
    let access = store.get(ACCESS_TOKEN_KEY)?;
    let refresh = store.get(REFRESH_TOKEN_KEY)?;
    match (access, refresh) {
        (Some(access), Some(refresh)) => Ok(Some(CredentialPair { access, refresh })),
        (None, None) => Ok(None),
        _ => {
            tracing::warn!("half-written credential pair found, clearing");
            clear_pair(store)?;
            Ok(None)
        }
    }
}

pub fn save_pair(store: &dyn CredentialStore, pair: &CredentialPair) -> Result<(), ApiError> {
    store.set(ACCESS_TOKEN_KEY, &pair.access)?;
    store.set(REFRESH_TOKEN_KEY, &pair.refresh)?;
    Ok(())
}

pub fn clear_pair(store: &dyn CredentialStore) -> Result<(), ApiError> {
    store.remove(ACCESS_TOKEN_KEY)?;
    store.remove(REFRESH_TOKEN_KEY)?;
    Ok(())
}

/// In-memory store. Backs tests and any host that keeps the session for
/// the lifetime of the page only.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
