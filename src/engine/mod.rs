pub mod coordinator;
pub mod gesture;
pub mod queue;
pub mod refill;

pub use coordinator::{ DecisionCoordinator, EngineCommand, EngineError, SwipeResolution };
pub use gesture::{ GestureClassifier, GestureSample, ReleaseVelocity, SwipeOutcome };
pub use queue::DecisionQueue;
pub use refill::RefillTrigger;
