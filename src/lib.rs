pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;

use crate::services::candidate_service::{CandidateService, CandidateStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub candidate_service: Arc<dyn CandidateStore>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let candidate_service = CandidateService::new(pool.clone());
        Self::with_store(pool, Arc::new(candidate_service))
    }

    /// State backed by a caller-supplied store; the pool still serves the connectivity probe.
    pub fn with_store(pool: PgPool, candidate_service: Arc<dyn CandidateStore>) -> Self {
        Self {
            pool,
            candidate_service,
        }
    }
}
