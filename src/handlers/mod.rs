// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (session gate, see middleware::require_session)
pub mod protected;
pub mod public;
