use std::collections::HashSet;

use crate::{
    backend::PersistError,
    core::models::{
        Card,
        CardId,
        Decision,
    },
};

/// Completions flowing back from background work, drained once per frame.
/// Persistence results keep their typed error so the engine can apply its
/// failure taxonomy; app-level loads flatten to a display string.
#[derive(Debug, Clone)]
pub enum TaskResult {
    Connection(bool),
    InitialLoad(Result<(Vec<Card>, HashSet<CardId>), String>),
    DecisionSaved { card_id: CardId, result: Result<Decision, PersistError> },
    RefillLoaded(Result<Vec<Card>, PersistError>),
    MatchesLoaded(Result<Vec<Card>, String>),
    LoadingMessage(String),
}

impl TaskResult {
    pub fn task_type(&self) -> &'static str {
        match self {
            TaskResult::Connection(_) => "connection",
            TaskResult::InitialLoad(_) => "initial_load",
            TaskResult::DecisionSaved { .. } => "decision_saved",
            TaskResult::RefillLoaded(_) => "refill",
            TaskResult::MatchesLoaded(_) => "matches",
            TaskResult::LoadingMessage(_) => "loading_message",
        }
    }
}
