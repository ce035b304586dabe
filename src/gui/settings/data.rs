use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Serialize, Deserialize)]
pub struct SettingsData {
    pub backend_url: String,
    pub refill_batch_size: u64,
    pub dark_mode: bool,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            backend_url: "https://api.tandemcards.app".to_string(),
            refill_batch_size: 5,
            dark_mode: true,
        }
    }
}
