//! warren: visit analytics, rabbit holes and the bunnies living in them,
//! served as a JSON API over axum and SQLite.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
