// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (/api/*, JWT middleware; some reads accept anonymous callers)
pub mod public;
pub mod protected;
pub mod utils;
