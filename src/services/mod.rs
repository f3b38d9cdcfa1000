pub mod review;
pub mod sla_monitor;

pub use review::{ReviewService, ReviewSettings, TransitionOutcome};
