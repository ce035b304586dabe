pub mod errors;
pub mod models;
pub mod session;
pub mod tasks;

pub use errors::TandemError;
pub use models::{ ActorId, Card, CardId, Decision, Response };
pub use session::Session;
