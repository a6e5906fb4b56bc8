//! Business logic services

pub mod admin;
pub mod catalog;
pub mod loans;
pub mod redis;
pub mod sessions;

use std::sync::Arc;

use crate::{config::LoansConfig, models::loan::RenewalPolicy, repository::Repository};

pub use sessions::SessionStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub admin: admin::AdminService,
    pub sessions: Arc<dyn SessionStore>,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(
        repository: Repository,
        sessions: Arc<dyn SessionStore>,
        loans_config: &LoansConfig,
    ) -> Self {
        let policy = RenewalPolicy {
            proposed_weeks: loans_config.proposed_renewal_weeks,
            max_weeks: loans_config.max_renewal_weeks,
        };

        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), policy),
            admin: admin::AdminService::new(repository),
            sessions,
        }
    }
}
