use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::detection::credential::CredentialToken;
use crate::detection::latch::Latch;
use crate::detection::page::PageContext;
use crate::detection::probe::StorageProbe;
use crate::detection::LOGGER;

/// Callback invoked exactly once, when the login latch flips.
pub type DetectionListener = Arc<dyn Fn(&CredentialToken) + Send + Sync + 'static>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// This call found the credential and flipped the latch.
    Detected(CredentialToken),
    /// The latch was already set before probing.
    AlreadyLatched,
    /// A credential was found but another caller flipped the latch first.
    LostRace,
    NotFound,
}

impl DetectionOutcome {
    pub fn is_detected(&self) -> bool {
        matches!(self, DetectionOutcome::Detected(_))
    }
}

/// The single detection operation every trigger races to call.
pub struct Detector {
    page: PageContext,
    probe: StorageProbe,
    latch: Arc<Latch>,
    listener: DetectionListener,
    probes: AtomicUsize,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("page", &self.page)
            .field("latched", &self.latch.is_set())
            .field("probes", &self.probe_count())
            .finish()
    }
}

impl Detector {
    pub fn new(
        page: PageContext,
        probe: StorageProbe,
        latch: Arc<Latch>,
        listener: DetectionListener,
    ) -> Self {
        Self {
            page,
            probe,
            latch,
            listener,
            probes: AtomicUsize::new(0),
        }
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn latch(&self) -> &Latch {
        &self.latch
    }

    /// Number of times storage was actually read.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Reads storage without touching the latch.
    pub fn peek(&self) -> Option<CredentialToken> {
        self.probe
            .probe(self.page.local_storage(), self.page.session_storage())
    }

    pub fn attempt(&self, source: &str) -> DetectionOutcome {
        if self.latch.is_set() {
            LOGGER.debug(format!("{source}: login already detected, skipping probe"));
            return DetectionOutcome::AlreadyLatched;
        }

        self.probes.fetch_add(1, Ordering::SeqCst);
        let Some(credential) = self.peek() else {
            LOGGER.debug(format!("{source}: no credential in page storage yet"));
            return DetectionOutcome::NotFound;
        };

        if !self.latch.try_latch() {
            return DetectionOutcome::LostRace;
        }

        LOGGER.info(format!(
            "{source}: login detected (credential {})",
            crate::logger::redact(credential.as_str())
        ));
        (self.listener)(&credential);
        DetectionOutcome::Detected(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn detector_with_listener() -> (Detector, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: DetectionListener = Arc::new(move |credential: &CredentialToken| {
            sink.lock().unwrap().push(credential.as_str().to_string());
        });
        let detector = Detector::new(
            PageContext::in_memory("https://app.test/login"),
            StorageProbe::default(),
            Arc::new(Latch::new()),
            listener,
        );
        (detector, seen)
    }

    #[test]
    fn not_found_leaves_latch_unset() {
        let (detector, seen) = detector_with_listener();
        assert_eq!(detector.attempt("test"), DetectionOutcome::NotFound);
        assert!(!detector.latch().is_set());
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(detector.probe_count(), 1);
    }

    #[test]
    fn many_callers_detect_once() {
        let (detector, seen) = detector_with_listener();
        detector.page().local_storage().set_item("token", "xyz");

        let outcomes: Vec<_> = (0..6).map(|i| detector.attempt(&format!("source-{i}"))).collect();

        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_detected()).count(), 1);
        assert!(outcomes[0].is_detected());
        assert!(outcomes[1..]
            .iter()
            .all(|outcome| *outcome == DetectionOutcome::AlreadyLatched));
        assert_eq!(seen.lock().unwrap().as_slice(), ["xyz"]);
        // Latched callers never touch storage.
        assert_eq!(detector.probe_count(), 1);
    }

    #[test]
    fn latch_flipped_elsewhere_suppresses_listener() {
        let seen = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        let latch = Arc::new(Latch::new());
        let page = PageContext::in_memory("https://app.test/");
        page.local_storage().set_item("token", "xyz");
        let detector = Detector::new(
            page,
            StorageProbe::default(),
            Arc::clone(&latch),
            Arc::new(move |_: &CredentialToken| *sink.lock().unwrap() += 1),
        );

        assert!(detector.peek().is_some());
        assert!(latch.try_latch());
        assert_eq!(detector.attempt("late"), DetectionOutcome::AlreadyLatched);
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
