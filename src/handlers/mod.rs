// handlers/mod.rs - 2-Tier Handler Architecture
//
// Public (no auth) → Protected (session required)
pub mod public;    // Tier 1: Published sites and plans (/sites/*)
pub mod protected; // Tier 2: Session required, tenant-scoped (/api/*)
