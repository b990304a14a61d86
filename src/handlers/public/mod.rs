// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Read-only views of published content, resolved by subdomain or custom domain.
// Only `published` plans are visible here.
//
// Security Level: None (completely public access)
// Route Prefix: /sites/*

pub mod sites;

pub use sites::{plan_get as site_plan_get, site_get};
