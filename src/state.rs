//! Shared application state handed to every handler and middleware.

use crate::services::{
    fox_service::FoxService, user_service::UserService, visit_service::VisitService,
    warren_service::WarrenService,
};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub users: UserService,
    pub visits: VisitService,
    pub warren: WarrenService,
    pub foxes: FoxService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            users: UserService::new(db.clone()),
            visits: VisitService::new(db.clone()),
            warren: WarrenService::new(db.clone()),
            foxes: FoxService::new(db.clone()),
            db,
        }
    }
}
