//! Page-side login detection.
//!
//! A [`Detector`] reads the page's storage through a [`StorageProbe`] and flips
//! a set-once [`Latch`] the first time a credential shows up. A
//! [`TriggerRegistry`] arms several independent [`DetectionTrigger`]s (timers,
//! a bounded poll, page event listeners, a location poll) that all race to
//! call the detector; the first success cancels the rest.

mod constants;
mod credential;
mod detector;
mod latch;
mod page;
mod probe;
mod registry;
mod schedule;
mod storage;
mod triggers;

use crate::logger::Logger;

pub(crate) static LOGGER: Logger = Logger::new("@webview-bridge/detection");

pub use constants::{
    ACCESS_TOKEN_KEY, AUTH_STORAGE_KEY, AUTH_TOKEN_KEY, SESSION_TOKEN_KEY, TOKEN_KEY,
};
pub use credential::CredentialToken;
pub use detector::{DetectionListener, DetectionOutcome, Detector};
pub use latch::Latch;
pub use page::{PageContext, PageEvent};
pub use probe::{ProbeCandidate, StorageProbe, ValueFormat};
pub use registry::{ArmedTriggers, TriggerRegistry};
pub use schedule::DetectionSchedule;
pub use storage::{MemoryPageStorage, PageStorage, StorageArea};
pub use triggers::{
    default_triggers, DelayedProbes, DetectionTrigger, EventWatch, IntervalPoll, LocationPoll,
    MutationWatch, TriggerContext,
};
