//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, LinkSettings, RedirectResolver};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Application state shared across handlers.
///
/// Services are built over trait objects, so the same router runs against
/// Postgres and Redis in production and against the in-memory back-ends in
/// tests.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub resolver: Arc<RedirectResolver<dyn LinkRepository>>,
    pub repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        settings: LinkSettings,
    ) -> Self {
        let resolver = RedirectResolver::new(repository.clone(), cache.clone(), &settings);
        let link_service = LinkService::new(repository.clone(), cache.clone(), settings);

        Self {
            link_service: Arc::new(link_service),
            resolver: Arc::new(resolver),
            repository,
            cache,
        }
    }
}
