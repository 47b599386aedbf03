//! Admin API integration tests.

use serde_json::Value;
use std::sync::Arc;

use cms_template::template::{Actor, TemplateRecord, Validity};

mod common;

#[tokio::test]
async fn test_admin_requires_bearer_token() {
    let server = common::start_server(common::admin_config(), Arc::new(common::CountingStore::default())).await;
    let client = common::client();

    let res = client.get(server.url("/admin/status")).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(server.url("/admin/status"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(server.url("/admin/status"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let status: Value = res.json().await.unwrap();
    assert_eq!(status["status"], "operational");
    assert_eq!(status["routes"], 0);
}

#[tokio::test]
async fn test_routes_match_and_invalidate() {
    let store = common::CountingStore::default();
    let server = common::start_server(common::admin_config(), Arc::new(store.clone())).await;
    let saved = server
        .state
        .repository
        .save(
            TemplateRecord::new("/blog/{slug}", "Post", "{{ slug }}").with_validity(Validity::Active),
            &Actor::system(),
        )
        .await
        .unwrap();
    let client = common::client();

    let routes: Value = client
        .get(server.url("/admin/routes"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(routes.as_array().map(Vec::len), Some(1));
    assert_eq!(routes[0]["path"], "/blog/{slug}");
    assert_eq!(routes[0]["name"], format!("{}-Post", saved.id));

    let report: Value = client
        .get(server.url("/admin/match"))
        .query(&[("path", "//blog/hello-world/")])
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["normalized"], "/blog/hello-world");
    assert_eq!(report["match"]["params"]["slug"], "hello-world");
    assert_eq!(report["match"]["template_id"], saved.id.to_string());

    let report: Value = client
        .get(server.url("/admin/match"))
        .query(&[("path", "/missing")])
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(report["match"].is_null());

    let scans_before = store.scans();
    let res = client
        .post(server.url("/admin/cache/invalidate"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client.get(server.url("/blog/first")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "first");
    assert_eq!(store.scans(), scans_before + 1);
}
