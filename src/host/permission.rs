use std::sync::Arc;

use crate::detection::Latch;
use crate::host::constants::{
    PERMISSION_PROMPT_CANCEL, PERMISSION_PROMPT_CONFIRM, PERMISSION_PROMPT_MESSAGE,
    PERMISSION_PROMPT_TITLE,
};
use crate::host::error::HostError;
use crate::host::platform::UserDialog;
use crate::host::token_manager::TokenLifecycleManager;
use crate::host::types::{DialogChoice, DialogPrompt};
use crate::host::LOGGER;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// The dialog was shown earlier in this process; nothing happened.
    AlreadyShown,
    Declined,
    Enabled(String),
    Failed(HostError),
}

/// Confirmation gate in front of the platform permission request.
///
/// Moves from not-shown to shown on the first [`run`](Self::run) and never
/// back.
pub struct PermissionFlow {
    shown: Latch,
    dialog: Arc<dyn UserDialog>,
    manager: Arc<TokenLifecycleManager>,
}

impl std::fmt::Debug for PermissionFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionFlow")
            .field("shown", &self.shown.is_set())
            .finish_non_exhaustive()
    }
}

impl PermissionFlow {
    pub fn new(dialog: Arc<dyn UserDialog>, manager: Arc<TokenLifecycleManager>) -> Self {
        Self {
            shown: Latch::new(),
            dialog,
            manager,
        }
    }

    pub fn was_shown(&self) -> bool {
        self.shown.is_set()
    }

    pub async fn run(&self) -> PermissionOutcome {
        if !self.shown.try_latch() {
            LOGGER.debug("Permission dialog already shown in this session, ignoring request");
            return PermissionOutcome::AlreadyShown;
        }

        let prompt = DialogPrompt::new(
            PERMISSION_PROMPT_TITLE,
            PERMISSION_PROMPT_MESSAGE,
            PERMISSION_PROMPT_CONFIRM,
            PERMISSION_PROMPT_CANCEL,
        );
        if self.dialog.confirm(&prompt).await == DialogChoice::Cancel {
            LOGGER.info("User postponed push notifications");
            return PermissionOutcome::Declined;
        }

        match self.manager.obtain_token().await {
            Ok(token) => PermissionOutcome::Enabled(token),
            Err(err) => PermissionOutcome::Failed(err),
        }
    }
}
