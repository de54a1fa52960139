use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::host::constants::{
    DEVICE_ID_PREFIX, DEVICE_ID_STORAGE_KEY, DEVICE_ID_SUFFIX_LEN, FCM_TOKEN_STORAGE_KEY,
};
use crate::host::error::{storage_error, HostResult};
use crate::host::storage::HostStorage;
use crate::host::LOGGER;
use crate::util::current_timestamp_ms;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRecord {
    pub token: String,
    pub create_time_ms: u64,
}

impl TokenRecord {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            create_time_ms: current_timestamp_ms(),
        }
    }
}

/// Typed access to the host keys this crate owns.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn HostStorage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(storage: Arc<dyn HostStorage>) -> Self {
        Self { storage }
    }

    /// Reads the persisted token. A bare string written by an older build is
    /// accepted as a record with an unknown creation time.
    pub fn read_token(&self) -> HostResult<Option<TokenRecord>> {
        let Some(raw) = self.storage.get_item(FCM_TOKEN_STORAGE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<TokenRecord>(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(_) if !raw.trim().is_empty() && !raw.trim_start().starts_with('{') => {
                Ok(Some(TokenRecord {
                    token: raw,
                    create_time_ms: 0,
                }))
            }
            Err(err) => Err(storage_error(format!("Stored push token is corrupt: {err}"))),
        }
    }

    pub fn write_token(&self, record: &TokenRecord) -> HostResult<()> {
        let raw = serde_json::to_string(record)
            .map_err(|err| storage_error(format!("Failed to serialize push token: {err}")))?;
        self.storage.set_item(FCM_TOKEN_STORAGE_KEY, &raw)
    }

    pub fn remove_token(&self) -> HostResult<()> {
        self.storage.remove_item(FCM_TOKEN_STORAGE_KEY)
    }

    /// Returns the persisted device id, generating and storing one on first use.
    pub fn device_id(&self) -> HostResult<String> {
        if let Some(existing) = self.storage.get_item(DEVICE_ID_STORAGE_KEY)? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }
        let id = generate_device_id(current_timestamp_ms());
        self.storage.set_item(DEVICE_ID_STORAGE_KEY, &id)?;
        LOGGER.debug(format!("Generated device id {id}"));
        Ok(id)
    }
}

/// `device_<unix-ms>_<9 base36 chars>`
pub fn generate_device_id(now_ms: u64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..DEVICE_ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{DEVICE_ID_PREFIX}{now_ms}_{suffix}")
}
