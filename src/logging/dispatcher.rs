//! # Named-event registry and group-tag resolution.
//!
//! [`LogDispatcher`] is the single source of truth mapping a
//! [`LogEventName`] to its logger and to zero-or-more [`GroupTag`]s. One
//! dispatcher exists per process, constructed at startup and passed by
//! reference to every protocol API instance.
//!
//! ## Architecture
//! ```text
//! register_request_event("PutTokenRequest", hook, ["tokens", "requests"])
//!         │
//!         ├─► request registry:  "PutTokenRequest" → EventLogger
//!         └─► group tags:        "tokens"   → { PutTokenRequest, ... }
//!                                "requests" → { PutTokenRequest, ... }
//!
//! debug("tokens", Disc)
//!         │
//!         ├─► resolve: group hit → { PutTokenRequest, GetTokenResponse }
//!         └─► per name: look up in request AND response registries,
//!             enable the Disc target (logical AND over all names)
//! ```
//!
//! ## Rules
//! - A name registers in **either** the request or the response registry,
//!   never both; a collision fails with
//!   [`RegistryError::DuplicateEvent`].
//! - `debug`/`undebug` on an unknown name or group return `false` without
//!   raising: runtime toggling must tolerate operator typos.
//! - `resolve` treats an unknown argument as a literal event name, so
//!   "toggle a group" and "toggle one event" share one code path.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::RegistryError;
use crate::events::{EventHook, GroupTag, LogEventName};
use crate::logging::{EventLogger, LogTarget};
use crate::sinks::SinkSet;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide registry of loggable protocol events.
pub struct LogDispatcher {
    request: RwLock<HashMap<LogEventName, Arc<EventLogger>>>,
    response: RwLock<HashMap<LogEventName, Arc<EventLogger>>>,
    groups: RwLock<HashMap<GroupTag, BTreeSet<LogEventName>>>,
    sinks: SinkSet,
}

impl LogDispatcher {
    /// Creates an empty dispatcher routing to the given sinks.
    pub fn new(sinks: SinkSet) -> Self {
        Self {
            request: RwLock::new(HashMap::new()),
            response: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            sinks,
        }
    }

    /// Registers a request-side event under the given hook and group tags.
    pub fn register_request_event(
        &self,
        name: impl Into<LogEventName>,
        hook: Arc<dyn EventHook>,
        group_tags: &[GroupTag],
    ) -> Result<Arc<EventLogger>, RegistryError> {
        self.register(true, name.into(), hook, group_tags)
    }

    /// Registers a response-side event under the given hook and group tags.
    pub fn register_response_event(
        &self,
        name: impl Into<LogEventName>,
        hook: Arc<dyn EventHook>,
        group_tags: &[GroupTag],
    ) -> Result<Arc<EventLogger>, RegistryError> {
        self.register(false, name.into(), hook, group_tags)
    }

    fn register(
        &self,
        request_side: bool,
        name: LogEventName,
        hook: Arc<dyn EventHook>,
        group_tags: &[GroupTag],
    ) -> Result<Arc<EventLogger>, RegistryError> {
        // lock order: request before response, always
        let mut request = write(&self.request);
        let mut response = write(&self.response);
        if request.contains_key(&name) || response.contains_key(&name) {
            return Err(RegistryError::DuplicateEvent { name });
        }

        let logger = Arc::new(EventLogger::new(name.clone(), hook, &self.sinks));
        if request_side {
            request.insert(name.clone(), Arc::clone(&logger));
        } else {
            response.insert(name.clone(), Arc::clone(&logger));
        }
        drop(response);
        drop(request);

        let mut groups = write(&self.groups);
        for tag in group_tags {
            groups.entry(tag.clone()).or_default().insert(name.clone());
        }
        Ok(logger)
    }

    /// Resolves an operator argument to a set of event names: the member
    /// set if it names a known group, otherwise a singleton of the
    /// argument taken as a literal event name.
    pub fn resolve(&self, name_or_group: &str) -> BTreeSet<LogEventName> {
        let groups = read(&self.groups);
        match groups.get(name_or_group) {
            Some(members) => members.clone(),
            None => BTreeSet::from([LogEventName::new(name_or_group)]),
        }
    }

    /// Enables `target` for every event resolved from `name_or_group`.
    ///
    /// Returns `true` only if **every** resolved name was found (in either
    /// registry) and its target enabled. Unknown names yield `false`
    /// without error.
    pub fn debug(&self, name_or_group: &str, target: LogTarget) -> bool {
        self.toggle(name_or_group, |logger| logger.subscribe(target))
    }

    /// Disables `target` for every event resolved from `name_or_group`.
    ///
    /// Returns `true` only if every resolved name was found and its target
    /// was enabled before the call.
    pub fn undebug(&self, name_or_group: &str, target: LogTarget) -> bool {
        self.toggle(name_or_group, |logger| logger.unsubscribe(target))
    }

    fn toggle(&self, name_or_group: &str, op: impl Fn(&EventLogger) -> bool) -> bool {
        let names = self.resolve(name_or_group);
        let request = read(&self.request);
        let response = read(&self.response);

        let mut all = true;
        for name in &names {
            // a name lives in at most one registry, by the registration
            // invariant; check both
            match request.get(name).or_else(|| response.get(name)) {
                Some(logger) => {
                    if !op(logger) {
                        all = false;
                    }
                }
                None => all = false,
            }
        }
        all
    }

    /// Looks up the logger of a single event, in either registry.
    pub fn logger(&self, name: &str) -> Option<Arc<EventLogger>> {
        if let Some(logger) = read(&self.request).get(name) {
            return Some(Arc::clone(logger));
        }
        read(&self.response).get(name).cloned()
    }

    /// Sorted list of all registered event names.
    pub fn event_names(&self) -> Vec<LogEventName> {
        let mut names: Vec<LogEventName> = read(&self.request).keys().cloned().collect();
        names.extend(read(&self.response).keys().cloned());
        names.sort_unstable();
        names
    }

    /// Sorted list of all known group tags.
    pub fn group_tags(&self) -> Vec<GroupTag> {
        let mut tags: Vec<GroupTag> = read(&self.groups).keys().cloned().collect();
        tags.sort_unstable();
        tags
    }
}
