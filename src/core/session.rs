use serde::{
    Deserialize,
    Serialize,
};

use super::models::ActorId;
use crate::persistence::{
    delete_data_file,
    load_json,
};

const SESSION_FILE: &str = "session.json";

/// Stored identity for the signed-in partner, provisioned by the pairing
/// flow outside this client. Without a session the decision engine is never
/// constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub actor_id: ActorId,
    pub auth_token: String,
}

impl Session {
    pub fn load() -> Option<Session> {
        match load_json::<Option<Session>>(SESSION_FILE) {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Failed to read stored session: {}", e);
                None
            }
        }
    }

    pub fn clear() {
        if let Err(e) = delete_data_file(SESSION_FILE) {
            log::warn!("Failed to delete stored session: {}", e);
        }
    }
}
