//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use cms_template::config::AppConfig;
use cms_template::http::{AppState, HttpServer};
use cms_template::lifecycle::Shutdown;
use cms_template::render::{HandlebarsEngine, InMemoryCatalog};
use cms_template::template::{
    InMemoryTemplateStore, StoreError, StoreResult, TemplateId, TemplateRecord, TemplateStore,
};

pub const ADMIN_KEY: &str = "test-admin-key";

/// A running server on an ephemeral port. Shuts down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub catalog: InMemoryCatalog,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn admin_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config
}

/// Start the server in the background over the given store.
pub async fn start_server(config: AppConfig, store: Arc<dyn TemplateStore>) -> TestServer {
    let catalog = InMemoryCatalog::new();
    let state = AppState::new(
        config,
        store,
        Arc::new(catalog.clone()),
        Arc::new(catalog.clone()),
        Arc::new(HandlebarsEngine::new()),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(state.clone());
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        state,
        catalog,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// In-memory store that counts route table scans.
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: InMemoryTemplateStore,
    pub scans: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TemplateStore for CountingStore {
    async fn find_by_id(&self, id: TemplateId, valid_only: bool) -> StoreResult<Option<TemplateRecord>> {
        self.inner.find_by_id(id, valid_only).await
    }

    async fn find_all_valid(&self) -> StoreResult<Vec<TemplateRecord>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all_valid().await
    }

    async fn find_children(&self, parent: TemplateId) -> StoreResult<Vec<TemplateRecord>> {
        self.inner.find_children(parent).await
    }

    async fn save(&self, record: TemplateRecord) -> StoreResult<()> {
        self.inner.save(record).await
    }

    async fn remove(&self, id: TemplateId) -> StoreResult<TemplateRecord> {
        self.inner.remove(id).await
    }
}

/// In-memory store that can be switched into failing every call.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryTemplateStore,
    pub down: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TemplateStore for FlakyStore {
    async fn find_by_id(&self, id: TemplateId, valid_only: bool) -> StoreResult<Option<TemplateRecord>> {
        self.check()?;
        self.inner.find_by_id(id, valid_only).await
    }

    async fn find_all_valid(&self) -> StoreResult<Vec<TemplateRecord>> {
        self.check()?;
        self.inner.find_all_valid().await
    }

    async fn find_children(&self, parent: TemplateId) -> StoreResult<Vec<TemplateRecord>> {
        self.check()?;
        self.inner.find_children(parent).await
    }

    async fn save(&self, record: TemplateRecord) -> StoreResult<()> {
        self.check()?;
        self.inner.save(record).await
    }

    async fn remove(&self, id: TemplateId) -> StoreResult<TemplateRecord> {
        self.check()?;
        self.inner.remove(id).await
    }
}
