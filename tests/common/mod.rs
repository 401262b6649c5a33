#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use shortlink::application::services::LinkSettings;
use shortlink::domain::entities::{Link, NewLink};
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::cache::{CacheService, MokaCache};
use shortlink::infrastructure::persistence::InMemoryLinkRepository;
use shortlink::routes::router;
use shortlink::state::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "https://sho.rt";

/// In-memory back-ends plus the state wired over them.
pub struct TestApp {
    pub state: AppState,
    pub repo: Arc<InMemoryLinkRepository>,
    pub cache: Arc<MokaCache>,
}

pub fn test_settings() -> LinkSettings {
    LinkSettings {
        base_url: BASE_URL.to_string(),
        code_length: 7,
        store_timeout: Duration::from_secs(1),
        cache_timeout: Duration::from_millis(200),
        ..Default::default()
    }
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(test_settings())
}

pub fn create_test_app_with(settings: LinkSettings) -> TestApp {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let cache = Arc::new(MokaCache::default());

    let state = AppState::new(
        repo.clone() as Arc<dyn LinkRepository>,
        cache.clone() as Arc<dyn CacheService>,
        settings,
    );

    TestApp { state, repo, cache }
}

pub fn create_test_server(app: &TestApp) -> TestServer {
    TestServer::new(router(app.state.clone())).unwrap()
}

pub async fn create_test_link(
    repo: &InMemoryLinkRepository,
    code: &str,
    target: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Link {
    repo.create(NewLink {
        code: code.to_string(),
        target: target.to_string(),
        expires_at,
        is_custom: true,
    })
    .await
    .unwrap()
}

pub async fn click_count(repo: &InMemoryLinkRepository, code: &str) -> i64 {
    repo.find_latest_by_code(code)
        .await
        .unwrap()
        .map(|link| link.click_count)
        .unwrap_or_default()
}

/// Waits for detached click accounting to land.
pub async fn wait_for_clicks(repo: &InMemoryLinkRepository, code: &str, expected: i64) {
    for _ in 0..100 {
        if click_count(repo, code).await >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {} clicks for {}, saw {}",
        expected,
        code,
        click_count(repo, code).await
    );
}
