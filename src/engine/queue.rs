use std::collections::HashSet;

use crate::core::models::{
    Card,
    CardId,
    Response,
};

#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub card: Card,
    pub response: Response,
    pub prior_cursor: usize,
}

/// Ordered working set of undecided cards plus a cursor and a single-slot
/// undo history.
///
/// Invariants: the cursor never exceeds the sequence length (length itself
/// means "exhausted"); no card id appears twice; no card from the
/// already-decided set is ever enqueued.
#[derive(Debug, Default)]
pub struct DecisionQueue {
    cards: Vec<Card>,
    cursor: usize,
    undo_slot: Option<UndoEntry>,
}

impl DecisionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the queue from the catalog, dropping inactive cards, cards
    /// the actor has already decided, and duplicate ids, while preserving
    /// the catalog's relative order. Resets the cursor and clears the undo
    /// slot. An empty result is a valid "all caught up" state.
    pub fn initialize(&mut self, catalog: Vec<Card>, already_decided: &HashSet<CardId>) {
        let mut seen = HashSet::new();
        self.cards = catalog
            .into_iter()
            .filter(|card| card.active)
            .filter(|card| !already_decided.contains(&card.id))
            .filter(|card| seen.insert(card.id))
            .collect();
        self.cursor = 0;
        self.undo_slot = None;
    }

    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.cards.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.cursor)
    }

    /// Moves the cursor one position forward. Exactly one, always: rapid
    /// repeated calls each move a single step, and calls past exhaustion are
    /// no-ops.
    pub fn advance(&mut self) {
        if self.cursor < self.cards.len() {
            self.cursor += 1;
        }
    }

    /// Overwrites the single undo slot with the decision just taken.
    pub fn record_for_undo(&mut self, card: Card, response: Response, prior_cursor: usize) {
        self.undo_slot = Some(UndoEntry { card, response, prior_cursor });
    }

    pub fn can_undo(&self) -> bool {
        self.undo_slot.is_some()
    }

    /// Restores the cursor to where it was before the last recorded decision
    /// and returns that decision, or None when there is nothing to undo.
    pub fn undo_last(&mut self) -> Option<(Card, Response)> {
        let entry = self.undo_slot.take()?;
        self.cursor = entry.prior_cursor;
        Some((entry.card, entry.response))
    }

    /// Appends freshly fetched cards to the tail without touching the cursor
    /// or the undo slot. Cards already queued, already decided, inactive, or
    /// repeated within the batch are skipped. Returns how many were added.
    pub fn append(&mut self, fresh: Vec<Card>, already_decided: &HashSet<CardId>) -> usize {
        let mut known: HashSet<CardId> = self.cards.iter().map(|c| c.id).collect();
        let before = self.cards.len();
        for card in fresh {
            if card.active && !already_decided.contains(&card.id) && known.insert(card.id) {
                self.cards.push(card);
            }
        }
        self.cards.len() - before
    }

    pub fn queued_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id).collect()
    }

    /// Drops a card that no longer exists upstream. Positions behind the
    /// cursor shift it back so the visible card stays put, and an undo entry
    /// pointing at the removed card is discarded.
    pub fn remove(&mut self, id: CardId) -> bool {
        let Some(pos) = self.cards.iter().position(|c| c.id == id) else {
            return false;
        };
        self.cards.remove(pos);
        if pos < self.cursor {
            self.cursor -= 1;
        }
        if self.undo_slot.as_ref().is_some_and(|entry| entry.card.id == id) {
            self.undo_slot = None;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn card(title: &str) -> Card {
        Card {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            intensity: 2,
            category: None,
            position: None,
            tags: Vec::new(),
            active: true,
        }
    }

    fn ids(cards: &[Card]) -> Vec<CardId> {
        cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_initialize_filters_decided_preserving_order() {
        let (a, b, c) = (card("a"), card("b"), card("c"));
        let decided: HashSet<CardId> = [b.id].into_iter().collect();

        let mut queue = DecisionQueue::new();
        queue.initialize(vec![a.clone(), b.clone(), c.clone()], &decided);

        assert_eq!(queue.queued_ids(), vec![a.id, c.id]);
        assert_eq!(queue.cursor(), 0);
        assert_eq!(queue.current().map(|card| card.id), Some(a.id));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let catalog = vec![card("a"), card("b"), card("c")];
        let decided: HashSet<CardId> = [catalog[1].id].into_iter().collect();

        let mut first = DecisionQueue::new();
        first.initialize(catalog.clone(), &decided);
        let mut second = DecisionQueue::new();
        second.initialize(catalog, &decided);

        assert_eq!(first.queued_ids(), second.queued_ids());
        assert_eq!(first.cursor(), 0);
        assert_eq!(second.cursor(), 0);
    }

    #[test]
    fn test_initialize_drops_inactive_and_duplicates() {
        let mut inactive = card("sleeping");
        inactive.active = false;
        let a = card("a");

        let mut queue = DecisionQueue::new();
        queue.initialize(vec![a.clone(), inactive, a.clone()], &HashSet::new());

        assert_eq!(queue.queued_ids(), vec![a.id]);
    }

    #[test]
    fn test_empty_filtered_result_is_exhausted_not_error() {
        let a = card("a");
        let decided: HashSet<CardId> = [a.id].into_iter().collect();

        let mut queue = DecisionQueue::new();
        queue.initialize(vec![a], &decided);

        assert!(queue.is_exhausted());
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_advance_moves_exactly_one_step() {
        let catalog = vec![card("a"), card("b"), card("c")];
        let mut queue = DecisionQueue::new();
        queue.initialize(catalog, &HashSet::new());

        for expected in 1..=3 {
            queue.advance();
            assert_eq!(queue.cursor(), expected);
        }

        // Idempotent past exhaustion.
        queue.advance();
        queue.advance();
        assert_eq!(queue.cursor(), 3);
        assert!(queue.is_exhausted());
    }

    #[test]
    fn test_undo_round_trip() {
        let catalog = vec![card("a"), card("b")];
        let mut queue = DecisionQueue::new();
        queue.initialize(catalog, &HashSet::new());

        let before = queue.current().cloned().unwrap();
        let prior = queue.cursor();
        queue.advance();
        queue.record_for_undo(before.clone(), Response::Affirmative, prior);

        let (undone, response) = queue.undo_last().unwrap();
        assert_eq!(undone.id, before.id);
        assert_eq!(response, Response::Affirmative);
        assert_eq!(queue.current().map(|c| c.id), Some(before.id));
        assert!(!queue.can_undo());
        assert!(queue.undo_last().is_none());
    }

    #[test]
    fn test_undo_slot_holds_one_entry() {
        let catalog = vec![card("a"), card("b"), card("c")];
        let mut queue = DecisionQueue::new();
        queue.initialize(catalog, &HashSet::new());

        let first = queue.current().cloned().unwrap();
        queue.advance();
        queue.record_for_undo(first, Response::Negative, 0);

        let second = queue.current().cloned().unwrap();
        queue.advance();
        queue.record_for_undo(second.clone(), Response::Affirmative, 1);

        // Only the most recent decision is restorable.
        let (undone, _) = queue.undo_last().unwrap();
        assert_eq!(undone.id, second.id);
        assert_eq!(queue.cursor(), 1);
    }

    #[test]
    fn test_append_deduplicates_and_keeps_cursor() {
        let (a, b) = (card("a"), card("b"));
        let mut queue = DecisionQueue::new();
        queue.initialize(vec![a.clone(), b.clone()], &HashSet::new());
        queue.advance();

        let decided: HashSet<CardId> = [a.id].into_iter().collect();
        let fresh_one = card("fresh1");
        let fresh_two = card("fresh2");
        let added = queue.append(
            vec![b.clone(), a.clone(), fresh_one.clone(), fresh_two.clone(), fresh_one.clone()],
            &decided,
        );

        assert_eq!(added, 2);
        assert_eq!(queue.queued_ids(), vec![a.id, b.id, fresh_one.id, fresh_two.id]);
        assert_eq!(queue.cursor(), 1);
    }

    #[test]
    fn test_remove_behind_cursor_keeps_current_card() {
        let (a, b, c) = (card("a"), card("b"), card("c"));
        let mut queue = DecisionQueue::new();
        queue.initialize(vec![a.clone(), b.clone(), c.clone()], &HashSet::new());
        queue.advance();
        queue.advance(); // current = c

        assert!(queue.remove(a.id));
        assert_eq!(queue.cursor(), 1);
        assert_eq!(queue.current().map(|card| card.id), Some(c.id));
    }

    #[test]
    fn test_remove_clears_matching_undo_entry() {
        let (a, b) = (card("a"), card("b"));
        let mut queue = DecisionQueue::new();
        queue.initialize(vec![a.clone(), b], &HashSet::new());
        queue.advance();
        queue.record_for_undo(a.clone(), Response::Deferred, 0);

        assert!(queue.remove(a.id));
        assert!(!queue.can_undo());
    }
}
