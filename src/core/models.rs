use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use uuid::Uuid;

pub type CardId = Uuid;
pub type ActorId = Uuid;

/// A content card from the shared catalog. Read-only on the client; the
/// backend owns the catalog and its validity (intensity bounds, ordering).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub intensity: u8, // 0..=5
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub active: bool,
}

/// A user's answer to one card. Unique per (actor, card) — re-deciding the
/// same card overwrites the stored value, it never duplicates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Affirmative,
    Negative,
    Deferred,
}

impl Response {
    pub fn label(&self) -> &'static str {
        match self {
            Response::Affirmative => "Yes",
            Response::Negative => "No",
            Response::Deferred => "Later",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub actor_id: ActorId,
    pub card_id: CardId,
    pub response: Response,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
