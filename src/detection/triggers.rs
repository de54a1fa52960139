use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::detection::constants::{CREDENTIAL_INPUT_TYPES, ENTER_KEY};
use crate::detection::detector::{DetectionOutcome, Detector};
use crate::detection::page::{PageContext, PageEvent};
use crate::detection::schedule::{poll_firings, DetectionSchedule};
use crate::detection::LOGGER;
use crate::util::runtime::{sleep, spawn_detached};

/// What a trigger gets to work with once armed.
///
/// Clones share the registry's cancellation token; firing a successful
/// detection cancels every trigger armed by the same registry.
#[derive(Clone, Debug)]
pub struct TriggerContext {
    detector: Arc<Detector>,
    cancel: CancellationToken,
}

impl TriggerContext {
    pub(crate) fn new(detector: Arc<Detector>, cancel: CancellationToken) -> Self {
        Self { detector, cancel }
    }

    pub fn page(&self) -> &PageContext {
        self.detector.page()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs the detection operation now.
    pub fn fire(&self, source: &str) -> DetectionOutcome {
        let outcome = self.detector.attempt(source);
        match outcome {
            DetectionOutcome::Detected(_)
            | DetectionOutcome::AlreadyLatched
            | DetectionOutcome::LostRace => self.cancel.cancel(),
            DetectionOutcome::NotFound => {}
        }
        outcome
    }

    /// Fires after `delay` unless the registry is cancelled first.
    pub async fn fire_after(&self, delay: Duration, source: &str) -> Option<DetectionOutcome> {
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            _ = sleep(delay) => Some(self.fire(source)),
        }
    }

    pub fn spawn_fire_after(&self, delay: Duration, source: &'static str) {
        let ctx = self.clone();
        spawn_detached(async move {
            ctx.fire_after(delay, source).await;
        });
    }
}

/// One independent source of detection attempts.
///
/// `run` is driven by the registry until it returns or the registry is
/// cancelled, whichever comes first. `events` was subscribed before the
/// trigger was spawned, so no page event published after arming is missed.
#[async_trait]
pub trait DetectionTrigger: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: TriggerContext, events: broadcast::Receiver<PageEvent>);
}

/// One-shot probes at fixed offsets from arming.
#[derive(Clone, Debug)]
pub struct DelayedProbes {
    offsets: Vec<Duration>,
}

impl DelayedProbes {
    pub fn new(offsets: impl IntoIterator<Item = Duration>) -> Self {
        let mut offsets: Vec<Duration> = offsets.into_iter().collect();
        offsets.sort();
        Self { offsets }
    }
}

#[async_trait]
impl DetectionTrigger for DelayedProbes {
    fn name(&self) -> &'static str {
        "delayed-probe"
    }

    async fn run(&self, ctx: TriggerContext, _events: broadcast::Receiver<PageEvent>) {
        let start = Instant::now();
        for offset in &self.offsets {
            tokio::time::sleep_until(start + *offset).await;
            ctx.fire(self.name());
        }
    }
}

/// Repeating probe that gives up after a fixed window.
#[derive(Clone, Debug)]
pub struct IntervalPoll {
    period: Duration,
    firings: u32,
}

impl IntervalPoll {
    pub fn new(period: Duration, window: Duration) -> Self {
        Self {
            period,
            firings: poll_firings(period, window),
        }
    }
}

#[async_trait]
impl DetectionTrigger for IntervalPoll {
    fn name(&self) -> &'static str {
        "interval-poll"
    }

    async fn run(&self, ctx: TriggerContext, _events: broadcast::Receiver<PageEvent>) {
        let start = Instant::now();
        for firing in 1..=self.firings {
            tokio::time::sleep_until(start + self.period * firing).await;
            ctx.fire(self.name());
        }
        LOGGER.debug(format!(
            "{}: window elapsed after {} firings",
            self.name(),
            self.firings
        ));
    }
}

/// Probes once the document has stopped mutating for `debounce`.
#[derive(Clone, Debug)]
pub struct MutationWatch {
    debounce: Duration,
}

impl MutationWatch {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }
}

#[async_trait]
impl DetectionTrigger for MutationWatch {
    fn name(&self) -> &'static str {
        "mutation-observer"
    }

    async fn run(&self, ctx: TriggerContext, mut events: broadcast::Receiver<PageEvent>) {
        loop {
            match next_event(&mut events).await {
                Some(PageEvent::Mutation) => {}
                Some(_) => continue,
                None => return,
            }

            let mut deadline = Instant::now() + self.debounce;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {
                        ctx.fire(self.name());
                        break;
                    }
                    event = next_event(&mut events) => match event {
                        Some(PageEvent::Mutation) => deadline = Instant::now() + self.debounce,
                        Some(_) => {}
                        None => {
                            tokio::time::sleep_until(deadline).await;
                            ctx.fire(self.name());
                            return;
                        }
                    },
                }
            }
        }
    }
}

/// Probes `delay` after every page event accepted by `matches`.
#[derive(Clone)]
pub struct EventWatch {
    name: &'static str,
    delay: Duration,
    matches: fn(&PageEvent) -> bool,
}

impl EventWatch {
    pub fn new(name: &'static str, delay: Duration, matches: fn(&PageEvent) -> bool) -> Self {
        Self {
            name,
            delay,
            matches,
        }
    }

    pub fn enter_key(delay: Duration) -> Self {
        Self::new("enter-key", delay, |event| {
            matches!(event, PageEvent::KeyDown { key } if key == ENTER_KEY)
        })
    }

    pub fn click(delay: Duration) -> Self {
        Self::new("click", delay, |event| matches!(event, PageEvent::Click))
    }

    /// Focus landing on a password or email field.
    pub fn credential_focus(delay: Duration) -> Self {
        Self::new("credential-focus", delay, |event| match event {
            PageEvent::Focus { input_type, name } => {
                is_credential_field(input_type) || name.as_deref().is_some_and(is_credential_field)
            }
            _ => false,
        })
    }
}

impl std::fmt::Debug for EventWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventWatch")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .finish()
    }
}

fn is_credential_field(value: &str) -> bool {
    let value = value.to_ascii_lowercase();
    CREDENTIAL_INPUT_TYPES.iter().any(|kind| value == *kind)
}

#[async_trait]
impl DetectionTrigger for EventWatch {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self, ctx: TriggerContext, mut events: broadcast::Receiver<PageEvent>) {
        while let Some(event) = next_event(&mut events).await {
            if (self.matches)(&event) {
                ctx.spawn_fire_after(self.delay, self.name);
            }
        }
    }
}

/// Polls the page location and probes `delay` after it changes.
#[derive(Clone, Debug)]
pub struct LocationPoll {
    interval: Duration,
    delay: Duration,
}

impl LocationPoll {
    pub fn new(interval: Duration, delay: Duration) -> Self {
        Self { interval, delay }
    }
}

#[async_trait]
impl DetectionTrigger for LocationPoll {
    fn name(&self) -> &'static str {
        "location-poll"
    }

    async fn run(&self, ctx: TriggerContext, _events: broadcast::Receiver<PageEvent>) {
        if self.interval.is_zero() {
            return;
        }
        let mut last = ctx.page().location();
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        loop {
            ticker.tick().await;
            let current = ctx.page().location();
            if current != last {
                LOGGER.debug(format!("location changed: {last} -> {current}"));
                last = current;
                ctx.spawn_fire_after(self.delay, self.name());
            }
        }
    }
}

async fn next_event(events: &mut broadcast::Receiver<PageEvent>) -> Option<PageEvent> {
    loop {
        match events.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                LOGGER.debug(format!("page event listener lagged, {skipped} events dropped"));
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// The built-in trigger set, configured from `schedule`.
pub fn default_triggers(schedule: &DetectionSchedule) -> Vec<Box<dyn DetectionTrigger>> {
    vec![
        Box::new(DelayedProbes::new(schedule.one_shot_offsets.iter().copied())),
        Box::new(IntervalPoll::new(schedule.poll_interval, schedule.poll_window)),
        Box::new(MutationWatch::new(schedule.mutation_debounce)),
        Box::new(EventWatch::enter_key(schedule.enter_key_delay)),
        Box::new(EventWatch::click(schedule.click_delay)),
        Box::new(EventWatch::credential_focus(schedule.credential_focus_delay)),
        Box::new(LocationPoll::new(
            schedule.location_poll_interval,
            schedule.location_change_delay,
        )),
    ]
}
