use std::{
    sync::{
        mpsc,
        Arc,
    },
    thread,
};

use tokio::runtime::Runtime;

use super::types::TaskResult;
use crate::{
    backend::BackendClient,
    core::models::{
        ActorId,
        CardId,
        Response,
    },
};

/// Owns the background runtime. Every asynchronous operation is spawned on
/// its own thread, blocks on the shared runtime, and reports back through
/// the channel; the UI thread drains `poll_results` once per frame and never
/// waits on I/O itself.
pub struct TaskManager {
    runtime: Arc<Runtime>,
    receiver: mpsc::Receiver<TaskResult>,
    sender: mpsc::Sender<TaskResult>,
}

impl TaskManager {
    pub fn new() -> Self {
        let runtime = Arc::new(Runtime::new().expect("Failed to create TaskManager runtime"));

        let (sender, receiver) = mpsc::channel();

        Self { runtime, receiver, sender }
    }

    pub fn poll_results(&mut self) -> Vec<TaskResult> {
        let mut results = Vec::new();

        while let Ok(result) = self.receiver.try_recv() {
            log::debug!("Task completed: {}", result.task_type());
            results.push(result);
        }

        results
    }

    fn task_context(&self) -> (mpsc::Sender<TaskResult>, Arc<Runtime>) {
        (self.sender.clone(), self.runtime.clone())
    }

    pub fn check_connection(&self, backend: BackendClient) {
        let (sender, runtime) = self.task_context();

        thread::spawn(move || {
            let connected = runtime.block_on(async { backend.get_health().await.is_ok() });

            let _ = sender.send(TaskResult::Connection(connected));
        });
    }

    /// Fetches the card catalog and the actor's decided set together; the
    /// pair seeds queue construction.
    pub fn load_initial(&self, backend: BackendClient, actor_id: ActorId) {
        let (sender, runtime) = self.task_context();

        thread::spawn(move || {
            let _ = sender.send(TaskResult::LoadingMessage("Loading your deck...".to_string()));

            let result = runtime.block_on(async {
                let (catalog, decided) = futures::try_join!(
                    backend.list_active_cards(),
                    backend.fetch_decided_card_ids(actor_id),
                )
                .map_err(|e| e.to_string())?;

                Ok::<_, String>((catalog, decided))
            });

            let _ = sender.send(TaskResult::InitialLoad(result));
        });
    }

    pub fn submit_decision(
        &self,
        backend: BackendClient,
        actor_id: ActorId,
        card_id: CardId,
        response: Response,
    ) {
        let (sender, runtime) = self.task_context();

        thread::spawn(move || {
            let result =
                runtime.block_on(backend.submit_decision(actor_id, card_id, response));

            let _ = sender.send(TaskResult::DecisionSaved { card_id, result });
        });
    }

    pub fn fetch_refill(&self, backend: BackendClient, exclude: Vec<CardId>) {
        let (sender, runtime) = self.task_context();

        thread::spawn(move || {
            let result = runtime.block_on(backend.list_more_cards(&exclude));

            let _ = sender.send(TaskResult::RefillLoaded(result));
        });
    }

    pub fn fetch_matches(&self, backend: BackendClient, actor_id: ActorId) {
        let (sender, runtime) = self.task_context();

        thread::spawn(move || {
            let result = runtime
                .block_on(backend.fetch_matches(actor_id))
                .map_err(|e| e.to_string());

            let _ = sender.send(TaskResult::MatchesLoaded(result));
        });
    }
}
