// Observer implementations organized by rings

// Ring 8: Integration - realtime event feed
#[path = "8/publish_status_event.rs"]
pub mod publish_status_event;

// Ring 9: Notification - owner notifications
#[path = "9/notify_owner.rs"]
pub mod notify_owner;

pub use notify_owner::NotifyOwner;
pub use publish_status_event::PublishStatusEvent;
