//! # Issuer Provider

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use chrono::{DateTime, TimeDelta, Utc};
use interop_issuance::deferred::IssuanceMetadata;
use interop_issuance::provider::{Clock, Conflict, Metadata, SessionStore, State};
use interop_issuance::CredentialTemplate;

const CONFIGURATIONS: &[u8] = include_bytes!("../data/configurations.json");

type Sessions = HashMap<String, State<IssuanceMetadata>>;

/// In-memory issuer provider. Clones share sessions and the clock.
#[derive(Clone)]
pub struct Issuer {
    templates: Arc<HashMap<String, CredentialTemplate>>,
    sessions: Arc<Mutex<Sessions>>,
    offset: Arc<AtomicI64>,
    conflicts: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

impl Issuer {
    /// Create a provider loaded with the fixture credential templates.
    ///
    /// # Panics
    ///
    /// When the fixture cannot be loaded.
    #[must_use]
    pub fn new() -> Self {
        let templates = serde_json::from_slice(CONFIGURATIONS).expect("should load templates");
        Self {
            templates: Arc::new(templates),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            offset: Arc::new(AtomicI64::new(0)),
            conflicts: Arc::new(AtomicUsize::new(0)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Move the provider's clock forward.
    pub fn advance(&self, by: TimeDelta) {
        self.offset.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    /// Fail the next `count` session writes with a [`Conflict`], as if a
    /// concurrent writer got there first.
    pub fn inject_conflicts(&self, count: usize) {
        self.conflicts.store(count, Ordering::SeqCst);
    }

    /// Make session storage fail every call.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The stored state for a session.
    ///
    /// # Panics
    ///
    /// When the session lock is poisoned.
    #[must_use]
    pub fn session(&self, owner: &str, session_id: &str) -> Option<State<IssuanceMetadata>> {
        let sessions = self.sessions.lock().expect("should lock");
        sessions.get(&format!("{owner}-{session_id}")).cloned()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(anyhow!("session store offline"));
        }
        Ok(())
    }
}

impl Default for Issuer {
    fn default() -> Self {
        Self::new()
    }
}

impl Metadata for Issuer {
    async fn configuration(
        &self, _owner: &str, configuration_id: &str,
    ) -> Result<Option<CredentialTemplate>> {
        Ok(self.templates.get(configuration_id).cloned())
    }
}

impl SessionStore for Issuer {
    async fn get(&self, owner: &str, session_id: &str) -> Result<Option<State<IssuanceMetadata>>> {
        self.check_online()?;
        let sessions = self.sessions.lock().map_err(|_| anyhow!("issue locking"))?;
        Ok(sessions.get(&format!("{owner}-{session_id}")).cloned())
    }

    async fn put(
        &self, owner: &str, session_id: &str, state: &State<IssuanceMetadata>,
    ) -> Result<()> {
        self.check_online()?;
        let key = format!("{owner}-{session_id}");
        let mut sessions = self.sessions.lock().map_err(|_| anyhow!("issue locking"))?;

        let found = sessions.get(&key).map(|current| current.version);
        let injected = self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected || found != state.expected_version() {
            return Err(Conflict {
                expected: state.expected_version(),
                found,
            }
            .into());
        }

        sessions.insert(key, state.clone());
        Ok(())
    }
}

impl Clock for Issuer {
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + TimeDelta::milliseconds(self.offset.load(Ordering::SeqCst))
    }
}
