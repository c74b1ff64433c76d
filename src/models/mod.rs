//! Core data models for the warren service.
//!
//! These entities mirror the SQLite tables one to one. They map to rows via
//! `sqlx::FromRow` and serialize as JSON via `serde`.

pub mod bunny;
pub mod rabbit_hole;
pub mod user;
pub mod visit;
