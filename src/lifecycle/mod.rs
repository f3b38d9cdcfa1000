// Report/task lifecycle: states, final status derivation and role-gated
// transition planning. Storage and side effects live in services::review.

pub mod error;
pub mod status;
pub mod transition;
pub mod work_item;

pub use error::{Denial, LifecycleError};
pub use status::{derive_final_status, Decision, FinalStatus, LifecycleState, ReviewStatus};
pub use transition::{plan, Action, Transition};
pub use work_item::{NewWorkItem, WorkItem, WorkItemFilter, WorkItemKind};
