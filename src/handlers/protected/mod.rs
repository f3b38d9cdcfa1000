// handlers/protected/mod.rs - JWT authentication required
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware inserts the AuthUser every handler extracts

pub mod attention;
pub mod audit;
pub mod events;
pub mod items;
pub mod me;
pub mod payroll;

pub use attention::attention_list;
pub use audit::audit_list;
pub use events::events_stream;
pub use items::{items_create, items_list, items_override, items_resubmit, items_review, items_show};
pub use me::me;
pub use payroll::payroll_summary;
