// Post-commit observer pipeline for work item transitions. Observers run
// after the new state and its audit entry are durable and can only warn.

pub mod context;
pub mod error;
pub mod implementations;
pub mod pipeline;
pub mod traits;

pub use context::TransitionEvent;
pub use error::{ObserverError, ObserverReport, ObserverWarning};
pub use implementations::{NotifyOwner, PublishStatusEvent};
pub use pipeline::ObserverPipeline;
pub use traits::{ObserverRing, TransitionObserver};
