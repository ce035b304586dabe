use std::collections::{
    HashMap,
    HashSet,
};

use super::{
    gesture::{
        GestureClassifier,
        GestureSample,
        ReleaseVelocity,
        SwipeOutcome,
    },
    queue::DecisionQueue,
    refill::RefillTrigger,
};
use crate::{
    backend::PersistError,
    core::models::{
        ActorId,
        Card,
        CardId,
        Decision,
        Response,
    },
};

/// Work the coordinator wants performed at the asynchronous boundary. The
/// caller forwards these to the task layer; completions come back through
/// `on_submit_result` / `on_refill`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    SubmitDecision { actor_id: ActorId, card_id: CardId, response: Response },
    RequestRefill { exclude: Vec<CardId> },
}

/// What the error slot can hold. Only a failed save is retryable; the
/// retained submission is re-dispatched through `retry_failed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Your answer couldn't be saved")]
    SaveFailed { card_id: CardId },

    #[error("That card is no longer available")]
    CardGone { card_id: CardId },

    #[error("Your session has expired")]
    SessionExpired,
}

impl EngineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::SaveFailed { .. })
    }
}

/// Everything the caller needs after a gesture release: the classified
/// outcome, the card it applied to (None when nothing was decided), the
/// release velocity for the exit animation, and the async work to dispatch.
#[derive(Debug)]
pub struct SwipeResolution {
    pub outcome: SwipeOutcome,
    pub card: Option<Card>,
    pub velocity: ReleaseVelocity,
    pub commands: Vec<EngineCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FailedSubmission {
    card_id: CardId,
    response: Response,
}

/// The decision engine: turns classified gestures into optimistic queue
/// advancement, persistence commands, a bounded undo, and refill requests.
///
/// All methods are synchronous and run on the UI thread; the queue, the undo
/// slot, and the error slot are owned here exclusively. At most one
/// submission per card id is ever outstanding: a re-decision of a card whose
/// prior submission has not resolved is parked and dispatched on resolution,
/// so the last value always wins without assuming network-level ordering.
pub struct DecisionCoordinator {
    actor_id: ActorId,
    classifier: GestureClassifier,
    queue: DecisionQueue,
    refill: RefillTrigger,

    /// Ids the actor has decided, remotely or this session. Refill dedup.
    decided_ids: HashSet<CardId>,
    /// Upsert mirror of this session's decisions: one value per card.
    local_decisions: HashMap<CardId, Response>,

    in_flight: HashMap<CardId, Response>,
    parked: HashMap<CardId, Response>,
    failed: Option<FailedSubmission>,
    error_slot: Option<EngineError>,

    committed_count: u64,
}

impl DecisionCoordinator {
    /// The queue is seeded at construction, so the engine cannot exist in an
    /// uninitialized state: no actor, no catalog, no coordinator.
    pub fn new(
        actor_id: ActorId,
        classifier: GestureClassifier,
        refill: RefillTrigger,
        catalog: Vec<Card>,
        already_decided: HashSet<CardId>,
    ) -> Self {
        let mut queue = DecisionQueue::new();
        queue.initialize(catalog, &already_decided);
        Self {
            actor_id,
            classifier,
            queue,
            refill,
            decided_ids: already_decided,
            local_decisions: HashMap::new(),
            in_flight: HashMap::new(),
            parked: HashMap::new(),
            failed: None,
            error_slot: None,
            committed_count: 0,
        }
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Swaps the refill cadence; takes effect from the next commit.
    pub fn set_refill_policy(&mut self, refill: RefillTrigger) {
        self.refill = refill;
    }

    // ---- gesture surface -------------------------------------------------

    pub fn on_gesture_start(&mut self) {
        self.classifier.begin_gesture();
    }

    /// Feeds an in-progress drag offset. True exactly once per gesture, the
    /// first instant the trajectory becomes committable; the caller uses it
    /// for a one-shot cue.
    pub fn on_gesture_update(&mut self, sample: GestureSample) -> bool {
        if self.queue.current().is_none() {
            return false;
        }
        self.classifier.update(sample)
    }

    /// Classifies the release and, on a committed outcome, advances the
    /// queue, records the undo entry, mirrors the decision locally, and
    /// emits the submission (and possibly a refill request). The queue moves
    /// before any network work is dispatched; a CANCEL mutates nothing.
    pub fn on_gesture_end(
        &mut self,
        release: GestureSample,
        velocity: ReleaseVelocity,
    ) -> SwipeResolution {
        let outcome = self.classifier.classify(release);
        let mut resolution =
            SwipeResolution { outcome, card: None, velocity, commands: Vec::new() };

        let Some(response) = outcome.response() else {
            return resolution;
        };
        let Some(card) = self.queue.current().cloned() else {
            return resolution;
        };

        let prior_cursor = self.queue.cursor();
        self.queue.advance();
        self.queue.record_for_undo(card.clone(), response, prior_cursor);

        self.local_decisions.insert(card.id, response);
        self.decided_ids.insert(card.id);
        self.committed_count += 1;

        // A newer decision supersedes any retained failure for this card.
        if self.failed.is_some_and(|f| f.card_id == card.id) {
            self.failed = None;
            if matches!(self.error_slot, Some(EngineError::SaveFailed { card_id }) if card_id == card.id)
            {
                self.error_slot = None;
            }
        }

        if self.in_flight.contains_key(&card.id) {
            self.parked.insert(card.id, response);
        } else {
            self.in_flight.insert(card.id, response);
            resolution.commands.push(EngineCommand::SubmitDecision {
                actor_id: self.actor_id,
                card_id: card.id,
                response,
            });
        }

        if self.refill.should_refill(self.committed_count) {
            log::debug!(
                "Requesting refill after {} decisions (batch size {})",
                self.committed_count,
                self.refill.batch_size()
            );
            resolution.commands.push(EngineCommand::RequestRefill { exclude: self.known_ids() });
        }

        resolution.card = Some(card);
        resolution
    }

    // ---- persistence completions ----------------------------------------

    /// Observes the outcome of one submission. Forward progress is never
    /// rolled back here; failures land in the error slot instead. May return
    /// a follow-up submission when a parked re-decision was waiting on this
    /// one.
    pub fn on_submit_result(
        &mut self,
        card_id: CardId,
        result: Result<Decision, PersistError>,
    ) -> Option<EngineCommand> {
        let Some(submitted) = self.in_flight.remove(&card_id) else {
            log::debug!("Ignoring completion for card {} with no outstanding submission", card_id);
            return None;
        };
        let parked_next = self.parked.remove(&card_id);

        match result {
            Ok(_) => {}
            Err(PersistError::Network(reason)) => {
                log::warn!("Saving decision for card {} failed: {}", card_id, reason);
                // Only retain the failure if no newer decision supersedes it.
                if parked_next.is_none() {
                    self.failed = Some(FailedSubmission { card_id, response: submitted });
                    self.error_slot = Some(EngineError::SaveFailed { card_id });
                }
            }
            Err(PersistError::Conflict(reason)) => {
                log::warn!("Card {} rejected by backend: {}", card_id, reason);
                self.queue.remove(card_id);
                self.local_decisions.remove(&card_id);
                self.error_slot = Some(EngineError::CardGone { card_id });
                return None;
            }
            Err(PersistError::Auth(reason)) => {
                log::warn!("Session rejected while saving card {}: {}", card_id, reason);
                self.error_slot = Some(EngineError::SessionExpired);
                return None;
            }
        }

        if let Some(response) = parked_next {
            self.in_flight.insert(card_id, response);
            return Some(EngineCommand::SubmitDecision {
                actor_id: self.actor_id,
                card_id,
                response,
            });
        }
        None
    }

    /// Folds a refill result into the queue tail. Failures are logged and
    /// swallowed; the queue keeps operating on what it has.
    pub fn on_refill(&mut self, result: Result<Vec<Card>, PersistError>) {
        match result {
            Ok(cards) => {
                let added = self.queue.append(cards, &self.decided_ids);
                log::debug!("Refill appended {} cards", added);
            }
            Err(e) => {
                log::warn!("Card refill failed: {}", e);
            }
        }
    }

    // ---- undo ------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.queue.can_undo()
    }

    /// Steps the queue back to the last decided card. Local navigation only:
    /// the stored decision stands until the card is swiped again, which
    /// upserts over it.
    pub fn request_undo(&mut self) -> bool {
        self.queue.undo_last().is_some()
    }

    // ---- error surface ---------------------------------------------------

    pub fn last_error(&self) -> Option<&EngineError> {
        self.error_slot.as_ref()
    }

    /// Dismisses the error slot. The queue is untouched; a retained failed
    /// submission is dropped with it.
    pub fn clear_error(&mut self) {
        self.error_slot = None;
        self.failed = None;
    }

    /// Re-dispatches the retained failed submission, unless a newer decision
    /// for that card has taken over in the meantime.
    pub fn retry_failed(&mut self) -> Option<EngineCommand> {
        let failed = self.failed.take()?;
        self.error_slot = None;
        if self.in_flight.contains_key(&failed.card_id) {
            return None;
        }
        if self.local_decisions.get(&failed.card_id) != Some(&failed.response) {
            return None;
        }
        self.in_flight.insert(failed.card_id, failed.response);
        Some(EngineCommand::SubmitDecision {
            actor_id: self.actor_id,
            card_id: failed.card_id,
            response: failed.response,
        })
    }

    // ---- queries ---------------------------------------------------------

    pub fn current_card(&self) -> Option<&Card> {
        self.queue.current()
    }

    pub fn is_queue_exhausted(&self) -> bool {
        self.queue.is_exhausted()
    }

    pub fn remaining(&self) -> usize {
        self.queue.remaining()
    }

    pub fn is_saving(&self, card_id: CardId) -> bool {
        self.in_flight.contains_key(&card_id)
    }

    pub fn pending_submissions(&self) -> usize {
        self.in_flight.len() + self.parked.len()
    }

    pub fn session_decision_count(&self) -> u64 {
        self.committed_count
    }

    pub fn local_decision(&self, card_id: CardId) -> Option<Response> {
        self.local_decisions.get(&card_id).copied()
    }

    fn known_ids(&self) -> Vec<CardId> {
        let mut ids: Vec<CardId> = self.decided_ids.iter().copied().collect();
        for id in self.queue.queued_ids() {
            if !self.decided_ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    const RIGHT: GestureSample = GestureSample { dx: 150.0, dy: 0.0 };
    const LEFT: GestureSample = GestureSample { dx: -150.0, dy: 0.0 };
    const UP: GestureSample = GestureSample { dx: 0.0, dy: -200.0 };
    const NUDGE: GestureSample = GestureSample { dx: 30.0, dy: -10.0 };

    fn card(title: &str) -> Card {
        Card {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            intensity: 1,
            category: None,
            position: None,
            tags: Vec::new(),
            active: true,
        }
    }

    fn decision(card_id: CardId, response: Response) -> Decision {
        let now = Utc::now();
        Decision { actor_id: Uuid::new_v4(), card_id, response, created_at: now, updated_at: now }
    }

    fn engine(catalog: Vec<Card>, decided: HashSet<CardId>) -> DecisionCoordinator {
        DecisionCoordinator::new(
            Uuid::new_v4(),
            GestureClassifier::new(100.0, 120.0),
            RefillTrigger::new(5),
            catalog,
            decided,
        )
    }

    fn swipe(engine: &mut DecisionCoordinator, release: GestureSample) -> SwipeResolution {
        engine.on_gesture_start();
        engine.on_gesture_end(release, ReleaseVelocity::default())
    }

    fn submit_command(resolution: &SwipeResolution) -> (CardId, Response) {
        let found: Vec<_> = resolution
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                EngineCommand::SubmitDecision { card_id, response, .. } => {
                    Some((*card_id, *response))
                }
                _ => None,
            })
            .collect();
        assert_eq!(found.len(), 1, "expected exactly one submission, got {:?}", resolution.commands);
        found[0]
    }

    #[test]
    fn test_initial_queue_filters_decided_set() {
        let (a, b, c) = (card("a"), card("b"), card("c"));
        let decided = [b.id].into_iter().collect();
        let mut engine = engine(vec![a.clone(), b, c.clone()], decided);

        assert_eq!(engine.current_card().map(|card| card.id), Some(a.id));

        // Swipe A right: one submission, cursor on C.
        let resolution = swipe(&mut engine, RIGHT);
        assert_eq!(resolution.outcome, SwipeOutcome::Affirm);
        assert_eq!(submit_command(&resolution), (a.id, Response::Affirmative));
        assert_eq!(engine.current_card().map(|card| card.id), Some(c.id));

        // Swipe C up: deferred, queue exhausted.
        let resolution = swipe(&mut engine, UP);
        assert_eq!(resolution.outcome, SwipeOutcome::Defer);
        assert_eq!(submit_command(&resolution), (c.id, Response::Deferred));
        assert!(engine.is_queue_exhausted());
    }

    #[test]
    fn test_cancel_mutates_nothing() {
        let a = card("a");
        let mut engine = engine(vec![a.clone()], HashSet::new());

        let resolution = swipe(&mut engine, NUDGE);
        assert_eq!(resolution.outcome, SwipeOutcome::Cancel);
        assert!(resolution.card.is_none());
        assert!(resolution.commands.is_empty());
        assert_eq!(engine.current_card().map(|card| card.id), Some(a.id));
        assert_eq!(engine.session_decision_count(), 0);
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_advancement_is_optimistic() {
        let (a, b) = (card("a"), card("b"));
        let mut engine = engine(vec![a.clone(), b.clone()], HashSet::new());

        swipe(&mut engine, LEFT);

        // No completion has arrived, but the user has already moved on.
        assert!(engine.is_saving(a.id));
        assert_eq!(engine.current_card().map(|card| card.id), Some(b.id));
        assert_eq!(engine.pending_submissions(), 1);
    }

    #[test]
    fn test_transient_failure_keeps_progress_and_offers_retry() {
        let (a, b) = (card("a"), card("b"));
        let mut engine = engine(vec![a.clone(), b.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        let follow_up =
            engine.on_submit_result(a.id, Err(PersistError::Network("offline".into())));
        assert!(follow_up.is_none());

        // Progress is not reverted, the failure is surfaced and retryable.
        assert_eq!(engine.current_card().map(|card| card.id), Some(b.id));
        let error = engine.last_error().expect("error slot should be set");
        assert!(error.is_retryable());
        assert_eq!(*error, EngineError::SaveFailed { card_id: a.id });

        let retry = engine.retry_failed().expect("failed submission should be retryable");
        assert!(matches!(
            retry,
            EngineCommand::SubmitDecision { card_id, response: Response::Affirmative, .. }
                if card_id == a.id
        ));
        assert!(engine.last_error().is_none());
        assert!(engine.is_saving(a.id));
    }

    #[test]
    fn test_clear_error_leaves_queue_untouched() {
        let (a, b) = (card("a"), card("b"));
        let mut engine = engine(vec![a.clone(), b.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        engine.on_submit_result(a.id, Err(PersistError::Network("offline".into())));
        assert!(engine.last_error().is_some());

        engine.clear_error();
        assert!(engine.last_error().is_none());
        assert_eq!(engine.current_card().map(|card| card.id), Some(b.id));
        assert_eq!(engine.session_decision_count(), 1);
        // Dismissing declines the retry as well.
        assert!(engine.retry_failed().is_none());
    }

    #[test]
    fn test_conflict_is_terminal_and_drops_card() {
        let (a, b) = (card("a"), card("b"));
        let mut engine = engine(vec![a.clone(), b.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        engine.on_submit_result(a.id, Err(PersistError::Conflict("gone".into())));

        let error = engine.last_error().expect("error slot should be set");
        assert!(!error.is_retryable());
        assert!(engine.retry_failed().is_none());
        // The dead card is no longer reachable, not even through undo.
        assert!(!engine.can_undo());
        assert_eq!(engine.current_card().map(|card| card.id), Some(b.id));
    }

    #[test]
    fn test_auth_failure_surfaces_session_error() {
        let a = card("a");
        let mut engine = engine(vec![a.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        engine.on_submit_result(a.id, Err(PersistError::Auth("expired token".into())));

        assert_eq!(engine.last_error(), Some(&EngineError::SessionExpired));
        assert!(engine.retry_failed().is_none());
    }

    #[test]
    fn test_undo_is_local_navigation_only() {
        let (a, b) = (card("a"), card("b"));
        let mut engine = engine(vec![a.clone(), b.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        engine.on_submit_result(a.id, Ok(decision(a.id, Response::Affirmative)));

        assert!(engine.can_undo());
        assert!(engine.request_undo());

        // The cursor is back on A, nothing was sent to retract the stored
        // decision, and the local mirror still holds the committed value.
        assert_eq!(engine.current_card().map(|card| card.id), Some(a.id));
        assert_eq!(engine.local_decision(a.id), Some(Response::Affirmative));
        assert!(!engine.can_undo());
        assert!(!engine.request_undo());
    }

    #[test]
    fn test_reswipe_before_resolution_is_parked_then_sequenced() {
        let (a, b) = (card("a"), card("b"));
        let mut engine = engine(vec![a.clone(), b.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        assert!(engine.request_undo());

        // Second decision for A while the first submission is still in
        // flight: nothing new is dispatched yet.
        let resolution = swipe(&mut engine, LEFT);
        assert_eq!(resolution.outcome, SwipeOutcome::Reject);
        assert!(resolution
            .commands
            .iter()
            .all(|cmd| !matches!(cmd, EngineCommand::SubmitDecision { .. })));
        assert_eq!(engine.pending_submissions(), 2);

        // The parked re-decision dispatches only once the first resolves.
        let follow_up = engine
            .on_submit_result(a.id, Ok(decision(a.id, Response::Affirmative)))
            .expect("parked submission should dispatch");
        assert!(matches!(
            follow_up,
            EngineCommand::SubmitDecision { card_id, response: Response::Negative, .. }
                if card_id == a.id
        ));
        assert!(engine.is_saving(a.id));

        // Upsert law, locally: one entry, last value wins.
        assert_eq!(engine.local_decision(a.id), Some(Response::Negative));
        engine.on_submit_result(a.id, Ok(decision(a.id, Response::Negative)));
        assert_eq!(engine.pending_submissions(), 0);
    }

    #[test]
    fn test_stale_failure_is_superseded_by_parked_redecision() {
        let (a, b) = (card("a"), card("b"));
        let mut engine = engine(vec![a.clone(), b.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        engine.request_undo();
        swipe(&mut engine, UP);

        // The first submission fails, but a newer decision is parked: no
        // error is surfaced and the newer value goes out instead.
        let follow_up = engine
            .on_submit_result(a.id, Err(PersistError::Network("offline".into())))
            .expect("parked submission should dispatch");
        assert!(matches!(
            follow_up,
            EngineCommand::SubmitDecision { card_id, response: Response::Deferred, .. }
                if card_id == a.id
        ));
        assert!(engine.last_error().is_none());
    }

    #[test]
    fn test_refill_requested_every_batch() {
        let cards: Vec<Card> = (0..6).map(|i| card(&format!("card {}", i))).collect();
        let mut engine = DecisionCoordinator::new(
            Uuid::new_v4(),
            GestureClassifier::new(100.0, 120.0),
            RefillTrigger::new(2),
            cards.clone(),
            HashSet::new(),
        );

        let first = swipe(&mut engine, RIGHT);
        assert!(!first.commands.iter().any(|c| matches!(c, EngineCommand::RequestRefill { .. })));

        let second = swipe(&mut engine, LEFT);
        let exclude = second
            .commands
            .iter()
            .find_map(|cmd| match cmd {
                EngineCommand::RequestRefill { exclude } => Some(exclude.clone()),
                _ => None,
            })
            .expect("second decision should request a refill");

        // Every decided and still-queued id is excluded from the fetch.
        for c in &cards {
            assert!(exclude.contains(&c.id));
        }
    }

    #[test]
    fn test_refill_appends_at_tail_and_failures_are_silent() {
        let (a, b) = (card("a"), card("b"));
        let mut engine = engine(vec![a.clone(), b.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        let fresh = card("fresh");
        engine.on_refill(Ok(vec![fresh.clone(), a.clone()]));

        // Cursor stays on B; the decided card A is not re-enqueued.
        assert_eq!(engine.current_card().map(|card| card.id), Some(b.id));
        assert_eq!(engine.remaining(), 2);

        engine.on_refill(Err(PersistError::Network("offline".into())));
        assert!(engine.last_error().is_none());
        assert_eq!(engine.remaining(), 2);
    }

    #[test]
    fn test_swipe_on_exhausted_queue_is_noop() {
        let a = card("a");
        let mut engine = engine(vec![a.clone()], HashSet::new());

        swipe(&mut engine, RIGHT);
        assert!(engine.is_queue_exhausted());

        let resolution = swipe(&mut engine, RIGHT);
        assert!(resolution.card.is_none());
        assert!(resolution.commands.is_empty());
        assert_eq!(engine.session_decision_count(), 1);
    }

    #[test]
    fn test_decision_counter_tracks_commits_not_cancels() {
        let cards: Vec<Card> = (0..3).map(|i| card(&format!("card {}", i))).collect();
        let mut engine = engine(cards, HashSet::new());

        swipe(&mut engine, RIGHT);
        swipe(&mut engine, NUDGE);
        swipe(&mut engine, LEFT);
        assert_eq!(engine.session_decision_count(), 2);
    }
}
