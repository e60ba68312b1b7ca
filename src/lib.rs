//! # roamvisor
//!
//! **Roamvisor** is the runtime core of an OCPI roaming node.
//!
//! It provides the cross-version infrastructure every protocol API shares:
//! a concurrent notification engine with four delivery contracts, a
//! named-event registry operators drive at runtime, the remote-party trust
//! model, and a correlator for asynchronous commands. Per-version DTO
//! catalogues, the HTTP transport, and persistence are external
//! collaborators that plug into these seams.
//!
//! ## Architecture
//! ### Notification path
//! ```text
//!  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!  │  CPO API     │  │  eMSP API    │  │  Hub API     │   (external)
//!  │ 2.1.1…3.0    │  │              │  │              │
//!  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!         │ one EventBus<LogRecord> per named event
//!         ▼                 ▼                 ▼
//!  ┌───────────────────────────────────────────────────────────┐
//!  │  LogDispatcher (process-wide, built once at startup)      │
//!  │  - request registry:  "PutTokenRequest"  → EventLogger    │
//!  │  - response registry: "PutTokenResponse" → EventLogger    │
//!  │  - group tags:        "tokens" → { both of the above }    │
//!  │  - debug("tokens", Disc) / undebug(...)                   │
//!  └──────────────────────────┬────────────────────────────────┘
//!                             │ attach/detach via EventHook
//!                             ▼
//!            EventBus delivery (notify_all / notify_any /
//!                      notify_first / notify_all_await)
//!                             │
//!              ┌───────┬──────┴────┬──────────┐
//!              ▼       ▼           ▼          ▼
//!          Console    Disc      Network      SSE
//!          (stdout)  (files)   (NDJSON/TCP) (broadcast)
//! ```
//!
//! ### Command path
//! ```text
//!  issue(party, response_url)            inbound callback (external HTTP)
//!         │                                        │
//!         ▼                                        ▼
//!  CommandCorrelator ──► pending table ──► resolve(correlation_id, result)
//!         │                                        │
//!         │  expire(now): age ≥ horizon            ▼
//!         └────────► timeout result        OutstandingCommand::outcome()
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types                                  |
//! |-----------------|----------------------------------------------------------|--------------------------------------------|
//! | **Delivery**    | Four concurrency contracts over one subscriber list.     | [`EventBus`], [`Notify`], [`Reply`]        |
//! | **Log routing** | Per-event/per-group target toggling at runtime.          | [`LogDispatcher`], [`EventLogger`], [`LogTarget`] |
//! | **Sinks**       | Console, disc, network, and SSE outputs.                 | [`SinkSet`], [`DiscSink`], [`SseSink`]     |
//! | **Parties**     | Partner trust: tokens, TLS material, retry budgets.      | [`RemoteParty`], [`PartyStore`]            |
//! | **Commands**    | Correlation of out-of-band command results.              | [`CommandCorrelator`], [`OutstandingCommand`] |
//! | **Errors**      | Typed errors with stable labels.                         | [`NotifyError`], [`CommandError`]          |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use roamvisor::{
//!     ApiHandle, Config, EventBus, EventHook, GroupTag, LogDispatcher, LogRecord,
//!     LogTarget, OcpiVersion, SinkSet,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let dispatcher = LogDispatcher::new(SinkSet::from_config(&config));
//!
//!     // A protocol API owns one bus per named event and registers it once.
//!     let put_token_request = Arc::new(EventBus::<LogRecord>::new());
//!     dispatcher.register_request_event(
//!         "PutTokenRequest",
//!         Arc::clone(&put_token_request) as Arc<dyn EventHook>,
//!         &[GroupTag::new("tokens")],
//!     )?;
//!
//!     // The operator enables console output for the whole group.
//!     assert!(dispatcher.debug("tokens", LogTarget::Console));
//!
//!     // The API fires the event when it observes a request.
//!     let api = ApiHandle::new("emsp", OcpiVersion::V2_2_1);
//!     let record = LogRecord::new("PutTokenRequest", r#"{"uid":"X1"}"#);
//!     put_token_request
//!         .notify_all(chrono::Utc::now(), &api, &record, &CancellationToken::new())
//!         .await?;
//!     Ok(())
//! }
//! ```

mod commands;
mod config;
mod error;
mod events;
mod logging;
mod parties;
mod policies;
mod sinks;

// ---- Public re-exports ----

pub use commands::{
    CommandCorrelator, CommandResult, CommandResultKind, CorrelationId, OutstandingCommand,
    RequestId,
};
pub use config::Config;
pub use error::{CommandError, NotifyError, PartyError, RegistryError};
pub use events::{
    ApiHandle, EventBus, EventHook, GroupTag, LogEventName, LogRecord, Notify, OcpiVersion, Reply,
};
pub use logging::{EventLogger, LogDispatcher, LogTarget};
pub use parties::{
    AccessStatus, EntityTag, LocalAccessInfo, PartyRef, PartyRole, PartyStatus, PartyStore,
    RemoteAccessInfo, RemoteParty, TlsPrefs, TlsVersion, TransportPrefs, TrustMode,
};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use sinks::{
    log_file_name, ConsoleSink, DiscSink, NetworkSink, SinkSet, SseFrame, SseSink,
};
