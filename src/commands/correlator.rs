//! # Command correlation.
//!
//! An asynchronous command (unlock-connector, start-session, ...) is sent
//! to a partner together with a response URL; the partner acknowledges
//! immediately and delivers the real outcome later via an independent
//! HTTP callback. [`CommandCorrelator`] bridges the two halves.
//!
//! ## State machine
//! ```text
//! issue ──► Issued ──┬─ resolve(correlation_id, result) ──► Resolved
//!                    └─ expire(now), age ≥ horizon ───────► Expired
//! ```
//! Both outcomes are terminal: the pending entry is removed on
//! completion, so a late, duplicate, or forged callback observes an
//! absent id and fails with
//! [`CommandError::UnknownCorrelation`](crate::CommandError).
//!
//! ## Rules
//! - Ids are generated randomly and **re-generated on collision** against
//!   the live tables; an id can never silently overwrite a pending entry.
//! - The pending table is locked only for O(1) map operations — the
//!   outbound path (insert) and the callback path (remove) never wait on
//!   each other's I/O.
//! - Expiry is age-based against a wall clock supplied by the caller; an
//!   external ticker drives [`expire`](CommandCorrelator::expire).

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::commands::{CommandResult, CorrelationId, RequestId};
use crate::error::CommandError;
use crate::parties::PartyRef;

/// Envelope of an issued command, to be sent to the partner.
///
/// Await [`outcome`](OutstandingCommand::outcome) to receive the result
/// delivered by the callback, or the synthetic timeout from the sweep.
#[derive(Debug)]
pub struct OutstandingCommand {
    /// Request-scoped id, unique among pending commands.
    pub request_id: RequestId,
    /// Id the partner must echo in its callback.
    pub correlation_id: CorrelationId,
    /// URL the partner must deliver the result to.
    pub response_url: String,
    outcome: oneshot::Receiver<CommandResult>,
}

impl OutstandingCommand {
    /// Waits for the command's terminal result.
    pub async fn outcome(self) -> Result<CommandResult, CommandError> {
        let id = self.correlation_id.clone();
        self.outcome
            .await
            .map_err(|_| CommandError::Abandoned { id })
    }
}

struct Pending {
    request_id: RequestId,
    party: PartyRef,
    issued_at: DateTime<Utc>,
    tx: oneshot::Sender<CommandResult>,
}

#[derive(Default)]
struct PendingTable {
    by_correlation: HashMap<CorrelationId, Pending>,
    request_ids: HashSet<RequestId>,
}

/// Tracks commands awaiting an out-of-band result.
pub struct CommandCorrelator {
    pending: Mutex<PendingTable>,
    horizon: Duration,
}

impl CommandCorrelator {
    /// Creates a correlator sweeping commands older than `horizon`.
    pub fn new(horizon: Duration) -> Self {
        Self {
            pending: Mutex::new(PendingTable::default()),
            horizon,
        }
    }

    fn guard(&self) -> MutexGuard<'_, PendingTable> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a command against `party`, recording it as pending.
    ///
    /// Both ids are generated independently and re-rolled until they are
    /// unique within their lookup tables.
    pub fn issue(&self, party: &PartyRef, response_url: impl Into<String>) -> OutstandingCommand {
        let (tx, rx) = oneshot::channel();
        let mut table = self.guard();

        let correlation_id = loop {
            let id = CorrelationId::random();
            if !table.by_correlation.contains_key(&id) {
                break id;
            }
        };
        let request_id = loop {
            let id = RequestId::random();
            if !table.request_ids.contains(&id) {
                break id;
            }
        };

        table.request_ids.insert(request_id.clone());
        table.by_correlation.insert(
            correlation_id.clone(),
            Pending {
                request_id: request_id.clone(),
                party: party.clone(),
                issued_at: Utc::now(),
                tx,
            },
        );

        OutstandingCommand {
            request_id,
            correlation_id,
            response_url: response_url.into(),
            outcome: rx,
        }
    }

    /// Completes a pending command with the partner's result.
    ///
    /// Fails with [`CommandError::UnknownCorrelation`] when no pending
    /// command carries `id` — late and duplicate callbacks land here,
    /// since completion removes the entry.
    pub fn resolve(&self, id: &CorrelationId, result: CommandResult) -> Result<(), CommandError> {
        let pending = {
            let mut table = self.guard();
            match table.by_correlation.remove(id) {
                Some(pending) => {
                    table.request_ids.remove(&pending.request_id);
                    pending
                }
                None => {
                    return Err(CommandError::UnknownCorrelation { id: id.clone() });
                }
            }
        };
        // the issuer may have stopped waiting; the command completes anyway
        let _ = pending.tx.send(result);
        Ok(())
    }

    /// Sweeps pending commands issued before `now - horizon`, completing
    /// each with [`CommandResult::timeout`]. Returns the number swept.
    pub fn expire(&self, now: DateTime<Utc>) -> usize {
        let mut swept: Vec<Pending> = Vec::new();
        {
            let mut table = self.guard();
            let old: Vec<CorrelationId> = table
                .by_correlation
                .iter()
                .filter(|(_, pending)| {
                    now.signed_duration_since(pending.issued_at)
                        .to_std()
                        .is_ok_and(|age| age >= self.horizon)
                })
                .map(|(id, _)| id.clone())
                .collect();

            for id in old {
                if let Some(pending) = table.by_correlation.remove(&id) {
                    table.request_ids.remove(&pending.request_id);
                    swept.push(pending);
                }
            }
        }

        let count = swept.len();
        for pending in swept {
            let _ = pending.tx.send(CommandResult::timeout());
        }
        if count > 0 {
            tracing::debug!(swept = count, "completed expired commands with timeout");
        }
        count
    }

    /// Number of commands currently pending.
    pub fn pending_count(&self) -> usize {
        self.guard().by_correlation.len()
    }

    /// The party a pending command was issued against.
    pub fn party_of(&self, id: &CorrelationId) -> Option<PartyRef> {
        self.guard()
            .by_correlation
            .get(id)
            .map(|pending| pending.party.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandResultKind;
    use crate::parties::PartyRole;
    use std::collections::HashSet as StdHashSet;

    fn party() -> PartyRef {
        PartyRef::new("DE", "GEF", PartyRole::Cpo)
    }

    #[tokio::test]
    async fn test_issue_then_resolve_round_trip() {
        let correlator = CommandCorrelator::new(Duration::from_secs(60));
        let cmd = correlator.issue(&party(), "https://emsp.example/callback/1");

        assert_eq!(correlator.pending_count(), 1);
        assert_eq!(correlator.party_of(&cmd.correlation_id), Some(party()));

        let correlation_id = cmd.correlation_id.clone();
        correlator
            .resolve(&correlation_id, CommandResult::accepted())
            .unwrap();

        let outcome = cmd.outcome().await.unwrap();
        assert_eq!(outcome.result, CommandResultKind::Accepted);
        assert_eq!(correlator.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_second_resolve_is_unknown() {
        let correlator = CommandCorrelator::new(Duration::from_secs(60));
        let cmd = correlator.issue(&party(), "https://emsp.example/callback/2");
        let id = cmd.correlation_id.clone();

        correlator.resolve(&id, CommandResult::accepted()).unwrap();

        let replay = correlator.resolve(&id, CommandResult::rejected("late"));
        assert!(matches!(
            replay,
            Err(CommandError::UnknownCorrelation { .. })
        ));
    }

    #[test]
    fn test_resolve_forged_id_is_unknown() {
        let correlator = CommandCorrelator::new(Duration::from_secs(60));
        let forged = CorrelationId::new("no-such-command");
        let res = correlator.resolve(&forged, CommandResult::accepted());
        assert!(matches!(res, Err(CommandError::UnknownCorrelation { .. })));
    }

    #[tokio::test]
    async fn test_expire_sweeps_only_old_commands() {
        let correlator = CommandCorrelator::new(Duration::from_millis(100));
        let old = correlator.issue(&party(), "https://emsp.example/callback/old");

        tokio::time::sleep(Duration::from_millis(150)).await;
        let fresh = correlator.issue(&party(), "https://emsp.example/callback/fresh");

        assert_eq!(correlator.expire(Utc::now()), 1);
        assert_eq!(correlator.pending_count(), 1);

        let outcome = old.outcome().await.unwrap();
        assert_eq!(outcome.result, CommandResultKind::Timeout);

        // the fresh command is untouched and still resolvable
        let id = fresh.correlation_id.clone();
        correlator.resolve(&id, CommandResult::accepted()).unwrap();
    }

    #[test]
    fn test_expire_below_horizon_sweeps_nothing() {
        let correlator = CommandCorrelator::new(Duration::from_secs(3600));
        let _cmd = correlator.issue(&party(), "https://emsp.example/callback/3");
        assert_eq!(correlator.expire(Utc::now()), 0);
        assert_eq!(correlator.pending_count(), 1);
    }

    #[test]
    fn test_issued_ids_are_unique() {
        let correlator = CommandCorrelator::new(Duration::from_secs(60));
        let mut correlations = StdHashSet::new();
        let mut requests = StdHashSet::new();
        for i in 0..64 {
            let cmd = correlator.issue(&party(), format!("https://emsp.example/cb/{i}"));
            assert!(correlations.insert(cmd.correlation_id.clone()));
            assert!(requests.insert(cmd.request_id.clone()));
        }
        assert_eq!(correlator.pending_count(), 64);
    }

    #[tokio::test]
    async fn test_dropping_the_correlator_abandons_waiters() {
        let correlator = CommandCorrelator::new(Duration::from_secs(60));
        let cmd = correlator.issue(&party(), "https://emsp.example/callback/4");
        drop(correlator);

        let res = cmd.outcome().await;
        assert!(matches!(res, Err(CommandError::Abandoned { .. })));
    }
}
