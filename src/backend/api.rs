use std::{
    collections::HashSet,
    time::Duration,
};

use reqwest::{
    Client,
    StatusCode,
};
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};
use tokio::time::sleep;

use super::PersistError;
use crate::core::models::{
    ActorId,
    Card,
    CardId,
    Decision,
    Response,
};

const RPC_VERSION: u32 = 1;
const MAX_FETCH_ATTEMPTS: usize = 3;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<ApiError>,
}

/// Thin RPC client for the partner backend. One action endpoint, JSON
/// envelope in and out, bearer-token auth.
///
/// Idempotent reads go through a bounded retry; `submit_decision` is sent
/// exactly once per call so the engine keeps control over re-submission.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    auth_token: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), auth_token: auth_token.into() }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/rpc", self.base_url.trim_end_matches('/'))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<T, PersistError> {
        let mut body = serde_json::Map::new();
        body.insert("action".to_string(), serde_json::Value::String(action.to_string()));
        body.insert("version".to_string(), serde_json::Value::Number(RPC_VERSION.into()));
        if let Some(params) = params {
            body.insert("params".to_string(), params);
        }

        let client = http_client()?;
        let response = client
            .post(self.endpoint())
            .bearer_auth(&self.auth_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PersistError::Network(e.to_string()))?;

        ensure_success(response.status())?;

        let envelope: ApiResponse<T> =
            response.json().await.map_err(|e| PersistError::Network(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(map_error_code(&error.code, error.message));
        }

        envelope
            .result
            .ok_or_else(|| PersistError::Network(format!("empty result for '{}'", action)))
    }

    /// Cheap liveness probe, used by the periodic connection check.
    pub async fn get_health(&self) -> Result<u32, PersistError> {
        self.call("version", None).await
    }

    /// Upserts the actor's decision for one card. The backend keys on
    /// (actor, card): the last submitted value is what remains stored.
    pub async fn submit_decision(
        &self,
        actor_id: ActorId,
        card_id: CardId,
        response: Response,
    ) -> Result<Decision, PersistError> {
        let params = serde_json::json!({
            "actorId": actor_id,
            "cardId": card_id,
            "response": response,
        });
        self.call("submitDecision", Some(params)).await
    }

    /// Ids of every card this actor has already decided. Seeds queue
    /// filtering at startup.
    pub async fn fetch_decided_card_ids(
        &self,
        actor_id: ActorId,
    ) -> Result<HashSet<CardId>, PersistError> {
        let params = serde_json::json!({ "actorId": actor_id });
        let ids: Vec<CardId> =
            with_retry(|| self.call("listDecidedCards", Some(params.clone()))).await?;
        Ok(ids.into_iter().collect())
    }

    pub async fn list_active_cards(&self) -> Result<Vec<Card>, PersistError> {
        with_retry(|| self.call("listActiveCards", None)).await
    }

    /// Fetches a fresh batch for a queue refill, excluding everything the
    /// client already knows about.
    pub async fn list_more_cards(&self, exclude: &[CardId]) -> Result<Vec<Card>, PersistError> {
        let params = serde_json::json!({ "exclude": exclude });
        with_retry(|| self.call("listMoreCards", Some(params.clone()))).await
    }

    /// Cards both partners answered affirmatively.
    pub async fn fetch_matches(&self, actor_id: ActorId) -> Result<Vec<Card>, PersistError> {
        let params = serde_json::json!({ "actorId": actor_id });
        with_retry(|| self.call("listMatches", Some(params.clone()))).await
    }
}

fn http_client() -> Result<Client, PersistError> {
    Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .map_err(|e| PersistError::Network(format!("HTTP client build failed: {}", e)))
}

fn ensure_success(status: StatusCode) -> Result<(), PersistError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(PersistError::Auth(format!("HTTP {}", status)))
        }
        StatusCode::NOT_FOUND | StatusCode::CONFLICT => {
            Err(PersistError::Conflict(format!("HTTP {}", status)))
        }
        _ => Err(PersistError::Network(format!("HTTP {}", status))),
    }
}

fn map_error_code(code: &str, message: String) -> PersistError {
    match code {
        "conflict" | "not_found" | "foreign_key_violation" => PersistError::Conflict(message),
        "unauthorized" | "forbidden" | "session_expired" => PersistError::Auth(message),
        _ => PersistError::Network(message),
    }
}

async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, PersistError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, PersistError>>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match op().await {
            Err(PersistError::Network(reason)) if attempts < MAX_FETCH_ATTEMPTS => {
                log::debug!("Backend fetch attempt {} failed: {}", attempts, reason);
                sleep(Duration::from_millis(400 * attempts as u64)).await;
            }
            other => return other,
        }
    }
}
