#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shortlink_engine::application::services::auth_service::hash_key;
use shortlink_engine::prelude::*;
use sqlx::PgPool;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// Link store backed by a map, for exercising the HTTP surface without a database.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: DashMap<String, ShortLink>,
    down: AtomicBool,
}

impl InMemoryLinkRepository {
    pub fn insert(&self, link: ShortLink) {
        self.links.insert(link.short_code.clone(), link);
    }

    pub fn get(&self, code: &str) -> Option<ShortLink> {
        self.links.get(code).map(|l| l.clone())
    }

    /// Makes `ping` fail, as if the database were unreachable.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        use dashmap::mapref::entry::Entry;

        match self.links.entry(new_link.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::code_taken(&new_link.short_code)),
            Entry::Vacant(slot) => {
                let link = new_link.into_link(Utc::now());
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.get(code))
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.links.contains_key(code))
    }

    async fn increment_clicks(&self, code: &str) -> Result<bool, AppError> {
        match self.links.get_mut(code) {
            Some(mut link) => {
                link.clicks += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.links.remove(code).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let before = self.links.len();
        self.links
            .retain(|_, link| link.expires_at.is_none_or(|e| e >= now));
        Ok((before - self.links.len()) as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::internal(
                "Database error",
                serde_json::json!({ "source": "connection refused" }),
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryApiKeyRepository {
    keys: DashMap<Uuid, ApiKey>,
    lookups: AtomicUsize,
}

impl InMemoryApiKeyRepository {
    pub fn get(&self, id: Uuid) -> Option<ApiKey> {
        self.keys.get(&id).map(|k| k.clone())
    }

    /// Number of hash lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .keys
            .iter()
            .find(|k| k.key_hash == key_hash && k.is_active)
            .map(|k| k.clone()))
    }

    async fn update_last_used(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(mut key) = self.keys.get_mut(&id) {
            key.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError> {
        let key = ApiKey {
            id: Uuid::new_v4(),
            key_hash: new_key.key_hash,
            name: new_key.name,
            rate_limit: new_key.rate_limit,
            is_active: true,
            created_at: Utc::now(),
            last_used_at: None,
        };
        self.keys.insert(key.id, key.clone());
        Ok(key)
    }

    async fn list(&self) -> Result<Vec<ApiKey>, AppError> {
        Ok(self.keys.iter().map(|k| k.clone()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiKey>, AppError> {
        Ok(self.get(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError> {
        Ok(self.keys.iter().find(|k| k.name == name).map(|k| k.clone()))
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool, AppError> {
        match self.keys.get_mut(&id) {
            Some(mut key) => {
                key.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Everything a test needs to drive the app and inspect its stores.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub links: Arc<InMemoryLinkRepository>,
    pub keys: Arc<InMemoryApiKeyRepository>,
    pub cache: Arc<dyn CacheService>,
}

impl TestApp {
    /// Waits for cache writes and click counting to finish.
    pub async fn settle(&self) {
        assert!(self.state.background.wait_idle(Duration::from_secs(5)).await);
    }

    /// Stores a key with the given budget and returns the raw secret.
    pub async fn seed_key(&self, name: &str, rate_limit: i32) -> (String, ApiKey) {
        let raw = AuthService::<InMemoryApiKeyRepository>::generate_key().unwrap();
        let key = self
            .keys
            .create(NewApiKey {
                key_hash: hash_key(&raw),
                name: name.to_string(),
                rate_limit,
            })
            .await
            .unwrap();
        (raw, key)
    }

    pub fn seed_link(&self, code: &str, url: &str, expires_at: Option<DateTime<Utc>>) {
        self.links.insert(
            NewShortLink {
                short_code: code.to_string(),
                original_url: url.to_string(),
                api_key_id: None,
                expires_at,
            }
            .into_link(Utc::now()),
        );
    }
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_budget(1000)
}

/// Builds the app over in-memory stores with `budget` requests per hour for
/// callers without a key.
pub fn create_test_app_with_budget(budget: u32) -> TestApp {
    build_app(Arc::new(MemoryCache::new()), budget)
}

/// Builds the app as it runs when Redis is configured but unreachable.
pub fn create_uncached_app() -> TestApp {
    build_app(Arc::new(NullCache::new()), 1000)
}

fn build_app(cache: Arc<dyn CacheService>, budget: u32) -> TestApp {
    let links = Arc::new(InMemoryLinkRepository::default());
    let keys = Arc::new(InMemoryApiKeyRepository::default());
    let background = BackgroundTasks::new(64, Duration::from_secs(5));

    let link_repo: Arc<dyn LinkRepository> = links.clone();
    let key_repo: Arc<dyn ApiKeyRepository> = keys.clone();

    let link_service = Arc::new(LinkService::new(
        link_repo,
        cache.clone(),
        background.clone(),
        LinkSettings {
            base_url: "https://sho.rt".to_string(),
            ..LinkSettings::default()
        },
    ));
    let auth_service = Arc::new(AuthService::new(key_repo, background.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(
        cache.clone(),
        Duration::from_secs(3600),
        budget,
    ));

    let state = AppState::new(
        link_service,
        auth_service,
        rate_limiter,
        cache.clone(),
        background,
        true,
    );

    let server = TestServer::new(build_router(state.clone())).unwrap();

    TestApp {
        server,
        state,
        links,
        keys,
        cache,
    }
}

pub async fn insert_link(pool: &PgPool, code: &str, url: &str, expires_at: Option<DateTime<Utc>>) {
    sqlx::query(
        "INSERT INTO urls (id, short_code, original_url, expires_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(code)
    .bind(url)
    .bind(expires_at)
    .execute(pool)
    .await
    .unwrap();
}
