// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers, one module per route group.

pub mod auth;
pub mod health;
pub mod history;
pub mod users;
