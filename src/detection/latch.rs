use std::sync::atomic::{AtomicBool, Ordering};

/// Set-once flag with an atomic check-and-set.
///
/// Used for the login latch and for the permission dialog gate. There is no
/// way to clear it; a fresh process (or a fresh `Latch`) starts unset.
#[derive(Debug, Default)]
pub struct Latch {
    set: AtomicBool,
}

impl Latch {
    pub const fn new() -> Self {
        Self {
            set: AtomicBool::new(false),
        }
    }

    /// Returns `true` for exactly one caller: the first to observe the latch
    /// unset. Every later call returns `false`.
    pub fn try_latch(&self) -> bool {
        self.set
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn only_first_call_wins() {
        let latch = Latch::new();
        assert!(!latch.is_set());
        assert!(latch.try_latch());
        assert!(latch.is_set());
        for _ in 0..10 {
            assert!(!latch.try_latch());
        }
        assert!(latch.is_set());
    }

    #[test]
    fn racing_threads_see_a_single_winner() {
        for _ in 0..20 {
            let latch = Arc::new(Latch::new());
            let winners = Arc::new(AtomicUsize::new(0));
            let threads: Vec<_> = (0..8)
                .map(|_| {
                    let latch = Arc::clone(&latch);
                    let winners = Arc::clone(&winners);
                    std::thread::spawn(move || {
                        if latch.try_latch() {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();
            for thread in threads {
                thread.join().unwrap();
            }
            assert_eq!(winners.load(Ordering::SeqCst), 1);
        }
    }
}
