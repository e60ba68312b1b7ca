//! # Per-event log target registry.
//!
//! One [`EventLogger`] exists per registered event name. It owns the
//! attach/detach hook into the protocol API and tracks, per [`LogTarget`],
//! whether the event currently routes to that target.
//!
//! ## Rules
//! - The actual attach/detach happens **exactly once per state
//!   transition**: enabling an already-enabled target is a success no-op,
//!   disabling a never-enabled target reports `false`.
//! - Slots are created for all four targets at registration; the shared
//!   sink instance behind each slot never changes afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{EventHook, LogEventName, LogRecord, Notify};
use crate::logging::LogTarget;
use crate::sinks::SinkSet;

struct TargetSlot {
    enabled: bool,
    sink: Arc<dyn Notify<LogRecord>>,
}

/// Subscription state of one registered event.
pub struct EventLogger {
    name: LogEventName,
    hook: Arc<dyn EventHook>,
    targets: Mutex<HashMap<LogTarget, TargetSlot>>,
}

impl EventLogger {
    pub(crate) fn new(name: LogEventName, hook: Arc<dyn EventHook>, sinks: &SinkSet) -> Self {
        let mut targets = HashMap::with_capacity(LogTarget::ALL.len());
        for target in LogTarget::ALL {
            targets.insert(
                target,
                TargetSlot {
                    enabled: false,
                    sink: sinks.sink_for(target),
                },
            );
        }
        Self {
            name,
            hook,
            targets: Mutex::new(targets),
        }
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<LogTarget, TargetSlot>> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The event this logger belongs to.
    pub fn name(&self) -> &LogEventName {
        &self.name
    }

    /// Routes this event to `target`. Idempotent: an already-enabled
    /// target stays enabled and the call still reports success.
    pub fn subscribe(&self, target: LogTarget) -> bool {
        let mut targets = self.guard();
        let Some(slot) = targets.get_mut(&target) else {
            return false;
        };
        if slot.enabled {
            return true;
        }
        self.hook.attach(Arc::clone(&slot.sink));
        slot.enabled = true;
        true
    }

    /// Stops routing this event to `target`. Returns `false` if the
    /// target was not enabled.
    pub fn unsubscribe(&self, target: LogTarget) -> bool {
        let mut targets = self.guard();
        let Some(slot) = targets.get_mut(&target) else {
            return false;
        };
        if !slot.enabled {
            return false;
        }
        self.hook.detach(&slot.sink);
        slot.enabled = false;
        true
    }

    /// Whether the event currently routes to `target`.
    pub fn is_enabled(&self, target: LogTarget) -> bool {
        self.guard().get(&target).is_some_and(|slot| slot.enabled)
    }

    /// Targets the event currently routes to, in display order.
    pub fn enabled_targets(&self) -> Vec<LogTarget> {
        let targets = self.guard();
        LogTarget::ALL
            .into_iter()
            .filter(|t| targets.get(t).is_some_and(|slot| slot.enabled))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::EventBus;

    fn logger_with_bus() -> (Arc<EventBus<LogRecord>>, EventLogger) {
        let bus = Arc::new(EventBus::<LogRecord>::new());
        let hook = Arc::clone(&bus) as Arc<dyn EventHook>;
        let sinks = SinkSet::from_config(&Config::default());
        let logger = EventLogger::new(LogEventName::new("PutTokenRequest"), hook, &sinks);
        (bus, logger)
    }

    #[test]
    fn test_subscribe_attaches_exactly_once() {
        let (bus, logger) = logger_with_bus();

        assert!(logger.subscribe(LogTarget::Console));
        assert!(logger.subscribe(LogTarget::Console));
        assert_eq!(bus.subscriber_count(), 1);
        assert!(logger.is_enabled(LogTarget::Console));
    }

    #[test]
    fn test_unsubscribe_requires_prior_subscribe() {
        let (bus, logger) = logger_with_bus();

        assert!(!logger.unsubscribe(LogTarget::Disc));

        logger.subscribe(LogTarget::Disc);
        assert!(logger.unsubscribe(LogTarget::Disc));
        assert!(!logger.unsubscribe(LogTarget::Disc));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_targets_toggle_independently() {
        let (bus, logger) = logger_with_bus();

        logger.subscribe(LogTarget::Console);
        logger.subscribe(LogTarget::Sse);
        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(
            logger.enabled_targets(),
            vec![LogTarget::Console, LogTarget::Sse]
        );

        logger.unsubscribe(LogTarget::Console);
        assert_eq!(bus.subscriber_count(), 1);
        assert!(logger.is_enabled(LogTarget::Sse));
        assert!(!logger.is_enabled(LogTarget::Console));
    }
}
