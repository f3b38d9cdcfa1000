// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (JWT auth, /api/*)
pub mod protected;
pub mod public;
