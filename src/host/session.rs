use std::sync::Mutex;

use crate::detection::CredentialToken;

/// The most recent page credential the host has been told about.
#[derive(Debug, Default)]
pub struct HostSession {
    credential: Mutex<Option<CredentialToken>>,
}

impl HostSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `credential`, returning true when it differs from the previous one.
    pub fn remember(&self, credential: CredentialToken) -> bool {
        let mut slot = self.credential.lock().unwrap();
        let changed = slot.as_ref() != Some(&credential);
        *slot = Some(credential);
        changed
    }

    pub fn credential(&self) -> Option<CredentialToken> {
        self.credential.lock().unwrap().clone()
    }
}
