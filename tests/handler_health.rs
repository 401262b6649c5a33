mod common;

use serde_json::Value;

#[tokio::test]
async fn test_health_check_success() {
    let app = common::create_test_app();
    let server = common::create_test_server(&app);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}

#[tokio::test]
async fn test_health_reports_cache_backend() {
    let app = common::create_test_app();
    let server = common::create_test_server(&app);

    let json = server.get("/health").await.json::<Value>();

    assert!(
        json["checks"]["cache"]["message"]
            .as_str()
            .unwrap()
            .contains("memory")
    );
}
