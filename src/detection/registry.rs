use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::detection::detector::Detector;
use crate::detection::schedule::DetectionSchedule;
use crate::detection::triggers::{default_triggers, DetectionTrigger, TriggerContext};
use crate::detection::LOGGER;
use crate::util::runtime::spawn_detached;

/// Owns the set of detection triggers and their shared cancellation.
#[derive(Default)]
pub struct TriggerRegistry {
    triggers: Vec<Box<dyn DetectionTrigger>>,
}

impl std::fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("triggers", &self.names())
            .finish()
    }
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: &DetectionSchedule) -> Self {
        Self {
            triggers: default_triggers(schedule),
        }
    }

    pub fn register<T>(&mut self, trigger: T) -> &mut Self
    where
        T: DetectionTrigger + 'static,
    {
        self.triggers.push(Box::new(trigger));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.triggers.iter().map(|trigger| trigger.name()).collect()
    }

    /// Spawns every trigger against `detector`.
    ///
    /// Must be called from within a tokio runtime. When the detector's latch
    /// is already set nothing is spawned and the returned handle starts out
    /// cancelled.
    pub fn arm(self, detector: Arc<Detector>) -> ArmedTriggers {
        let cancel = CancellationToken::new();
        if detector.latch().is_set() {
            LOGGER.debug("login already detected; detection triggers not armed");
            cancel.cancel();
            return ArmedTriggers {
                cancel,
                handles: Vec::new(),
            };
        }

        let handles = self
            .triggers
            .into_iter()
            .map(|trigger| {
                let ctx = TriggerContext::new(Arc::clone(&detector), cancel.clone());
                let events = detector.page().subscribe();
                let cancel = cancel.clone();
                spawn_detached(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            LOGGER.debug(format!("{}: cancelled", trigger.name()));
                        }
                        _ = trigger.run(ctx, events) => {
                            LOGGER.debug(format!("{}: finished", trigger.name()));
                        }
                    }
                })
            })
            .collect();

        ArmedTriggers { cancel, handles }
    }
}

/// Running triggers. Dropping this cancels them.
#[derive(Debug)]
pub struct ArmedTriggers {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl ArmedTriggers {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the registry is cancelled (normally: login detected).
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Waits for every trigger task to end.
    pub async fn join(mut self) {
        let handles = std::mem::take(&mut self.handles);
        join_all(handles).await;
    }
}

impl Drop for ArmedTriggers {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
