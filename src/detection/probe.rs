use serde_json::Value;

use crate::detection::constants::{
    ACCESS_TOKEN_KEY, AUTH_STORAGE_KEY, AUTH_STORAGE_TOKEN_PATHS, AUTH_TOKEN_KEY,
    SESSION_TOKEN_KEY, TOKEN_KEY,
};
use crate::detection::credential::CredentialToken;
use crate::detection::storage::{PageStorage, StorageArea};

/// How a stored value is turned into a credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueFormat {
    /// The stored string is the credential.
    Raw,
    /// The stored string is a JSON document; the credential sits at the first
    /// of these field paths that holds a non-empty string.
    Envelope(Vec<Vec<String>>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeCandidate {
    pub area: StorageArea,
    pub key: String,
    pub format: ValueFormat,
}

impl ProbeCandidate {
    pub fn raw(area: StorageArea, key: impl Into<String>) -> Self {
        Self {
            area,
            key: key.into(),
            format: ValueFormat::Raw,
        }
    }

    pub fn envelope(area: StorageArea, key: impl Into<String>, paths: &[&[&str]]) -> Self {
        let paths = paths
            .iter()
            .map(|path| path.iter().map(|segment| segment.to_string()).collect())
            .collect();
        Self {
            area,
            key: key.into(),
            format: ValueFormat::Envelope(paths),
        }
    }

    fn extract(&self, stored: &str) -> Option<CredentialToken> {
        match &self.format {
            ValueFormat::Raw => CredentialToken::new(stored),
            ValueFormat::Envelope(paths) => {
                let document: Value = serde_json::from_str(stored).ok()?;
                paths.iter().find_map(|path| {
                    let found = path
                        .iter()
                        .try_fold(&document, |node, segment| node.get(segment.as_str()))?;
                    CredentialToken::new(found.as_str()?)
                })
            }
        }
    }
}

/// Looks for a credential in the page's storage.
///
/// Candidates are read in order and the first one yielding a non-empty
/// credential wins. Unparseable envelopes count as absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageProbe {
    candidates: Vec<ProbeCandidate>,
}

impl Default for StorageProbe {
    fn default() -> Self {
        Self::new(vec![
            ProbeCandidate::envelope(StorageArea::Local, AUTH_STORAGE_KEY, AUTH_STORAGE_TOKEN_PATHS),
            ProbeCandidate::raw(StorageArea::Local, TOKEN_KEY),
            ProbeCandidate::raw(StorageArea::Local, AUTH_TOKEN_KEY),
            ProbeCandidate::raw(StorageArea::Local, ACCESS_TOKEN_KEY),
            ProbeCandidate::raw(StorageArea::Session, SESSION_TOKEN_KEY),
        ])
    }
}

impl StorageProbe {
    pub fn new(candidates: Vec<ProbeCandidate>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[ProbeCandidate] {
        &self.candidates
    }

    pub fn probe(&self, local: &dyn PageStorage, session: &dyn PageStorage) -> Option<CredentialToken> {
        self.candidates.iter().find_map(|candidate| {
            let storage = match candidate.area {
                StorageArea::Local => local,
                StorageArea::Session => session,
            };
            let stored = storage.get_item(&candidate.key)?;
            candidate.extract(&stored)
        })
    }
}
