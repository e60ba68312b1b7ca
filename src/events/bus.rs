//! # Event bus: concurrent multi-subscriber notification.
//!
//! [`EventBus`] delivers one notification to an arbitrary number of
//! subscribers under one of four contracts:
//!
//! ```text
//! notify_all        s1 ──► s2 ──► s3          sequential, fail-fast
//! notify_all_await  s1 ─┬─ s2 ─┬─ s3          concurrent, wait for all
//!                       └──────┴──► combined outcome
//! notify_any        s1 ─┬─ s2 ─┬─ timer       first finisher wins
//!                       └──────┴──► first outcome (timer is a valid winner)
//! notify_first      s1 ─┬─ s2 ─┬─ timer       first VERIFIED result wins;
//!                       └──────┴──► errors/abstentions discarded, race continues
//! ```
//!
//! ## Rules
//! - **Snapshot delivery**: every round works on a copy of the subscriber
//!   list taken under the lock; (un)subscription during an in-flight round
//!   never affects that round.
//! - **Ordering**: only `notify_all` guarantees subscriber order, and full
//!   completion of subscriber *i* before *i+1* starts.
//! - **Failure containment**: `notify_all`/`notify_all_await` propagate
//!   subscriber failures to the caller; the racing variants contain them
//!   (`notify_first` logs and discards, `notify_any` returns the first
//!   outcome whatever it is).
//! - **Cancellation**: every variant selects on the caller's token;
//!   outstanding subscriber futures are dropped, not forcibly killed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::events::{ApiHandle, LogRecord, Notify, Reply};

/// One entry of a delivery race: a subscriber finishing, or the timer.
enum Raced<R> {
    Finished {
        subscriber: &'static str,
        result: Result<Reply<R>, NotifyError>,
    },
    TimerFired,
}

/// Concurrent multi-subscriber notifier.
///
/// `E` is the notification payload, `R` the subscriber result type. Log
/// buses use `EventBus<LogRecord>`; decision buses pick a concrete `R` and
/// race subscribers with [`notify_first`](EventBus::notify_first).
///
/// Subscriber identity is `Arc` pointer identity: subscribing the same
/// `Arc` twice is a no-op, and `unsubscribe` removes exactly that `Arc`.
pub struct EventBus<E, R = ()> {
    subscribers: Mutex<Vec<Arc<dyn Notify<E, R>>>>,
}

impl<E, R> Default for EventBus<E, R>
where
    E: Send + Sync + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, R> EventBus<E, R>
where
    E: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Arc<dyn Notify<E, R>>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a subscriber. Returns `false` (and leaves the list unchanged)
    /// if this exact `Arc` is already subscribed.
    pub fn subscribe(&self, handler: Arc<dyn Notify<E, R>>) -> bool {
        let mut subs = self.guard();
        if subs.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            return false;
        }
        subs.push(handler);
        true
    }

    /// Removes a subscriber by `Arc` identity. Returns `false` if it was
    /// not subscribed.
    pub fn unsubscribe(&self, handler: &Arc<dyn Notify<E, R>>) -> bool {
        let mut subs = self.guard();
        let before = subs.len();
        subs.retain(|h| !Arc::ptr_eq(h, handler));
        subs.len() != before
    }

    /// Number of current subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.guard().len()
    }

    fn snapshot(&self) -> Vec<Arc<dyn Notify<E, R>>> {
        self.guard().clone()
    }

    /// Delivers to every subscriber **sequentially**, awaiting each before
    /// starting the next. The first subscriber error aborts the remaining
    /// deliveries and propagates (fail-fast).
    ///
    /// This is the variant for sinks that must not interleave, e.g. an
    /// append-only log file.
    pub async fn notify_all(
        &self,
        at: DateTime<Utc>,
        api: &ApiHandle,
        event: &E,
        cancel: &CancellationToken,
    ) -> Result<(), NotifyError> {
        for sub in self.snapshot() {
            if cancel.is_cancelled() {
                return Err(NotifyError::Canceled);
            }
            tokio::select! {
                res = sub.notify(at, api, event, cancel) => { res?; }
                _ = cancel.cancelled() => return Err(NotifyError::Canceled),
            }
        }
        Ok(())
    }

    /// Delivers to every subscriber **concurrently** and waits for all to
    /// finish. The combined outcome is the first error observed, if any
    /// subscriber failed; remaining subscribers still run to completion.
    pub async fn notify_all_await(
        &self,
        at: DateTime<Utc>,
        api: &ApiHandle,
        event: &E,
        cancel: &CancellationToken,
    ) -> Result<(), NotifyError> {
        let subs = self.snapshot();
        let mut round: FuturesUnordered<_> = subs
            .iter()
            .map(|sub| sub.notify(at, api, event, cancel))
            .collect();

        let mut first_err: Option<NotifyError> = None;
        loop {
            tokio::select! {
                next = round.next() => match next {
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        if first_err.is_none() {
                            first_err = Some(e);
                        }
                    }
                    None => break,
                },
                _ = cancel.cancelled() => return Err(NotifyError::Canceled),
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Delivers to every subscriber **concurrently** and completes with the
    /// first finisher's outcome, success or failure.
    ///
    /// A supplied `timeout` enters the race as a timer task and is a valid
    /// winner: if it fires first, the result is [`NotifyError::Timeout`].
    /// An empty bus with no timer resolves to `Timeout` immediately — the
    /// race has no competitor.
    pub async fn notify_any(
        &self,
        at: DateTime<Utc>,
        api: &ApiHandle,
        event: &E,
        cancel: &CancellationToken,
        timeout: Option<Duration>,
    ) -> Result<Reply<R>, NotifyError> {
        let started = Instant::now();
        let subs = self.snapshot();
        let mut race: FuturesUnordered<BoxFuture<'_, Raced<R>>> = subs
            .iter()
            .map(|sub| {
                let subscriber = sub.name();
                async move {
                    Raced::Finished {
                        subscriber,
                        result: sub.notify(at, api, event, cancel).await,
                    }
                }
                .boxed()
            })
            .collect();
        if let Some(t) = timeout {
            race.push(
                async move {
                    tokio::time::sleep(t).await;
                    Raced::TimerFired
                }
                .boxed(),
            );
        }

        tokio::select! {
            next = race.next() => match next {
                Some(Raced::Finished { result, .. }) => result,
                Some(Raced::TimerFired) | None => Err(NotifyError::Timeout {
                    elapsed: started.elapsed(),
                }),
            },
            _ = cancel.cancelled() => Err(NotifyError::Canceled),
        }
    }

    /// Delivers to every subscriber **concurrently** and returns the first
    /// result that is a [`Reply::Value`] satisfying `verify`.
    ///
    /// The race repeatedly takes the earliest finisher:
    /// - a subscriber error is logged and discarded, the race continues;
    /// - an abstention is discarded, the race continues;
    /// - a value failing `verify` is discarded, the race continues;
    /// - a verified value returns immediately.
    ///
    /// When the timer wins, all subscribers are exhausted, or the caller
    /// cancels, `default` is invoked with the elapsed wall time and its
    /// result returned. One slow or opinion-less subscriber can therefore
    /// never stall the operation, at the cost of discarding its error.
    pub async fn notify_first<V, D>(
        &self,
        at: DateTime<Utc>,
        api: &ApiHandle,
        event: &E,
        cancel: &CancellationToken,
        verify: V,
        timeout: Option<Duration>,
        default: D,
    ) -> R
    where
        V: Fn(&R) -> bool,
        D: FnOnce(Duration) -> R,
    {
        let started = Instant::now();
        let subs = self.snapshot();
        let mut remaining = subs.len();
        let mut race: FuturesUnordered<BoxFuture<'_, Raced<R>>> = subs
            .iter()
            .map(|sub| {
                let subscriber = sub.name();
                async move {
                    Raced::Finished {
                        subscriber,
                        result: sub.notify(at, api, event, cancel).await,
                    }
                }
                .boxed()
            })
            .collect();
        if let Some(t) = timeout {
            race.push(
                async move {
                    tokio::time::sleep(t).await;
                    Raced::TimerFired
                }
                .boxed(),
            );
        }

        loop {
            let next = tokio::select! {
                next = race.next() => next,
                _ = cancel.cancelled() => return default(started.elapsed()),
            };
            match next {
                Some(Raced::Finished { subscriber, result }) => {
                    remaining -= 1;
                    match result {
                        Ok(Reply::Value(r)) if verify(&r) => return r,
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(
                                subscriber,
                                error = %e,
                                "discarding failed subscriber in first-result race"
                            );
                        }
                    }
                    if remaining == 0 {
                        return default(started.elapsed());
                    }
                }
                Some(Raced::TimerFired) | None => return default(started.elapsed()),
            }
        }
    }
}

/// Subscribe/unsubscribe hook a protocol API exposes per named event.
///
/// The log registry stores this interface reference instead of closures,
/// so it stays decoupled from how an API wires its buses internally.
/// [`EventBus<LogRecord>`] implements it directly.
pub trait EventHook: Send + Sync + 'static {
    /// Attach a sink to the event. Returns `false` if it was already
    /// attached.
    fn attach(&self, sink: Arc<dyn Notify<LogRecord>>) -> bool;

    /// Detach a sink from the event. Returns `false` if it was not
    /// attached.
    fn detach(&self, sink: &Arc<dyn Notify<LogRecord>>) -> bool;
}

impl EventHook for EventBus<LogRecord> {
    fn attach(&self, sink: Arc<dyn Notify<LogRecord>>) -> bool {
        self.subscribe(sink)
    }

    fn detach(&self, sink: &Arc<dyn Notify<LogRecord>>) -> bool {
        self.unsubscribe(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    enum Behavior {
        Value(u32),
        Abstain,
        Fail,
    }

    struct Probe {
        label: &'static str,
        delay: Duration,
        behavior: Behavior,
        log: Arc<StdMutex<Vec<&'static str>>>,
    }

    impl Probe {
        fn new(
            label: &'static str,
            delay_ms: u64,
            behavior: Behavior,
            log: &Arc<StdMutex<Vec<&'static str>>>,
        ) -> Arc<dyn Notify<(), u32>> {
            Arc::new(Self {
                label,
                delay: Duration::from_millis(delay_ms),
                behavior,
                log: Arc::clone(log),
            })
        }
    }

    #[async_trait]
    impl Notify<(), u32> for Probe {
        async fn notify(
            &self,
            _at: DateTime<Utc>,
            _api: &ApiHandle,
            _event: &(),
            _cancel: &CancellationToken,
        ) -> Result<Reply<u32>, NotifyError> {
            tokio::time::sleep(self.delay).await;
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(self.label);
            match self.behavior {
                Behavior::Value(v) => Ok(Reply::Value(v)),
                Behavior::Abstain => Ok(Reply::Abstain),
                Behavior::Fail => Err(NotifyError::Subscriber {
                    subscriber: self.label.to_string(),
                    message: "boom".to_string(),
                }),
            }
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    fn ctx() -> (DateTime<Utc>, ApiHandle, CancellationToken) {
        (
            Utc::now(),
            ApiHandle::new("cpo", crate::events::OcpiVersion::V2_2_1),
            CancellationToken::new(),
        )
    }

    fn log() -> Arc<StdMutex<Vec<&'static str>>> {
        Arc::new(StdMutex::new(Vec::new()))
    }

    fn entries(log: &Arc<StdMutex<Vec<&'static str>>>) -> Vec<&'static str> {
        log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[test]
    fn test_subscribe_is_deduplicated_by_identity() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        let probe = Probe::new("p", 0, Behavior::Value(1), &l);

        assert!(bus.subscribe(Arc::clone(&probe)));
        assert!(!bus.subscribe(Arc::clone(&probe)));
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(&probe));
        assert!(!bus.unsubscribe(&probe));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_notify_all_is_sequential_and_fail_fast() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        bus.subscribe(Probe::new("s1", 20, Behavior::Value(1), &l));
        bus.subscribe(Probe::new("s2", 0, Behavior::Fail, &l));
        bus.subscribe(Probe::new("s3", 0, Behavior::Value(3), &l));

        let (at, api, cancel) = ctx();
        let res = bus.notify_all(at, &api, &(), &cancel).await;

        assert!(matches!(res, Err(NotifyError::Subscriber { .. })));
        // s1 completed before s2 started; s3 never ran.
        assert_eq!(entries(&l), vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn test_notify_all_await_waits_for_all_and_reports_failure() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        bus.subscribe(Probe::new("fast-fail", 0, Behavior::Fail, &l));
        bus.subscribe(Probe::new("slow-ok", 30, Behavior::Value(2), &l));

        let (at, api, cancel) = ctx();
        let res = bus.notify_all_await(at, &api, &(), &cancel).await;

        assert!(matches!(res, Err(NotifyError::Subscriber { .. })));
        // the slow subscriber still ran to completion
        assert!(entries(&l).contains(&"slow-ok"));
    }

    #[tokio::test]
    async fn test_notify_any_fast_subscriber_beats_generous_timeout() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        bus.subscribe(Probe::new("fast", 0, Behavior::Value(7), &l));

        let (at, api, cancel) = ctx();
        let res = bus
            .notify_any(at, &api, &(), &cancel, Some(Duration::from_millis(1000)))
            .await;

        assert!(matches!(res, Ok(Reply::Value(7))));
    }

    #[tokio::test]
    async fn test_notify_any_timer_is_a_valid_winner() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        bus.subscribe(Probe::new("slow", 500, Behavior::Value(1), &l));

        let (at, api, cancel) = ctx();
        let res = bus
            .notify_any(at, &api, &(), &cancel, Some(Duration::from_millis(20)))
            .await;

        assert!(matches!(res, Err(NotifyError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_notify_any_empty_bus_without_timer_times_out() {
        let bus: EventBus<(), u32> = EventBus::new();
        let (at, api, cancel) = ctx();
        let res = bus.notify_any(at, &api, &(), &cancel, None).await;
        assert!(matches!(res, Err(NotifyError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_notify_first_prefers_later_valid_over_earlier_invalid() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        bus.subscribe(Probe::new("slow", 50, Behavior::Value(99), &l));
        bus.subscribe(Probe::new("invalid", 10, Behavior::Value(0), &l));
        bus.subscribe(Probe::new("valid", 30, Behavior::Value(42), &l));

        let (at, api, cancel) = ctx();
        let res = bus
            .notify_first(
                at,
                &api,
                &(),
                &cancel,
                |r| *r != 0,
                Some(Duration::from_millis(100)),
                |_| 0,
            )
            .await;

        // the invalid 0 at ~10ms is discarded; the valid 42 at ~30ms wins
        // before the slow 99 at ~50ms and long before the timer.
        assert_eq!(res, 42);
    }

    #[tokio::test]
    async fn test_notify_first_returns_default_when_exhausted() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        bus.subscribe(Probe::new("abstains", 0, Behavior::Abstain, &l));
        bus.subscribe(Probe::new("fails", 0, Behavior::Fail, &l));

        let (at, api, cancel) = ctx();
        let res = bus
            .notify_first(at, &api, &(), &cancel, |_| true, None, |_| 111)
            .await;

        assert_eq!(res, 111);
    }

    #[tokio::test]
    async fn test_notify_first_returns_default_when_timer_wins() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        bus.subscribe(Probe::new("slow", 500, Behavior::Value(5), &l));

        let (at, api, cancel) = ctx();
        let res = bus
            .notify_first(
                at,
                &api,
                &(),
                &cancel,
                |_| true,
                Some(Duration::from_millis(20)),
                |elapsed| u32::try_from(elapsed.as_millis().min(1000)).unwrap_or(1000),
            )
            .await;

        // the default is computed from elapsed time, which is at least the
        // timer duration and far below the slow subscriber's delay.
        assert!((20..500).contains(&res));
    }

    #[tokio::test]
    async fn test_notify_all_canceled_before_start() {
        let bus: EventBus<(), u32> = EventBus::new();
        let l = log();
        bus.subscribe(Probe::new("s1", 0, Behavior::Value(1), &l));

        let (at, api, cancel) = ctx();
        cancel.cancel();
        let res = bus.notify_all(at, &api, &(), &cancel).await;

        assert!(matches!(res, Err(NotifyError::Canceled)));
        assert!(entries(&l).is_empty());
    }
}
