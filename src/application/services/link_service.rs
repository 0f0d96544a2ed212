//! Short code issuance and resolution.
//!
//! Resolution is cache-aside: the cache is consulted first, the store on a
//! miss, and the cache populated afterwards. Cache failures are treated as
//! misses. Cache writes, cache invalidation of expired entries and click
//! counting are advisory and run through [`BackgroundTasks`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::background::BackgroundTasks;
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, validate_custom_alias, validate_url};

/// Generation attempts before giving up with `generation_exhausted`.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct LinkSettings {
    pub code_length: usize,
    pub cache_ttl: Duration,
    /// Prefix for `short_url`, without trailing slash.
    pub base_url: String,
    /// Expiry applied when a request carries none.
    pub default_link_ttl: Option<Duration>,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            code_length: 8,
            cache_ttl: Duration::from_secs(3600),
            base_url: "http://localhost:8080".to_string(),
            default_link_ttl: None,
        }
    }
}

/// Result of a successful [`LinkService::issue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedLink {
    pub short_code: String,
    pub short_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct LinkService<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    background: BackgroundTasks,
    settings: LinkSettings,
}

impl<L: LinkRepository + ?Sized + 'static> LinkService<L> {
    pub fn new(
        repository: Arc<L>,
        cache: Arc<dyn CacheService>,
        background: BackgroundTasks,
        mut settings: LinkSettings,
    ) -> Self {
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();
        Self {
            repository,
            cache,
            background,
            settings,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.settings.base_url, code)
    }

    /// Creates a short link.
    ///
    /// With a custom alias the alias is normalized and must be free; otherwise
    /// a random code is generated, retrying on collision up to
    /// [`MAX_GENERATION_ATTEMPTS`] times. The store's unique constraint is the
    /// final arbiter: a concurrent issuer winning the race yields `code_taken`.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] with reason `invalid_url` or `invalid_code`
    /// - [`AppError::Conflict`] with reason `code_taken`
    /// - [`AppError::Internal`] with reason `generation_exhausted`, or on store errors
    pub async fn issue(
        &self,
        url: &str,
        custom_alias: Option<&str>,
        expires_in: Option<Duration>,
        owner: Option<Uuid>,
    ) -> Result<IssuedLink, AppError> {
        validate_url(url)?;

        let code = match custom_alias {
            Some(alias) => {
                let alias = validate_custom_alias(alias)?;
                if self.repository.exists(&alias).await? {
                    return Err(AppError::code_taken(&alias));
                }
                alias
            }
            None => self.generate_unique_code().await?,
        };

        let now = Utc::now();
        let expires_at = match expires_in.or(self.settings.default_link_ttl) {
            Some(ttl) => Some(now + expiry_offset(ttl)?),
            None => None,
        };

        let link = self
            .repository
            .create(NewShortLink {
                short_code: code,
                original_url: url.to_string(),
                api_key_id: owner,
                expires_at,
            })
            .await?;

        info!(short_code = %link.short_code, "Short link created");
        self.schedule_cache_write(&link, now);

        Ok(IssuedLink {
            short_url: self.short_url(&link.short_code),
            short_code: link.short_code,
            expires_at: link.expires_at,
        })
    }

    /// Resolves a short code to its destination URL and counts the click.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no link has this code
    /// - [`AppError::Expired`] if the link is past its expiration instant
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let link = self.lookup(code).await?;
        let now = Utc::now();

        if link.is_expired_at(now) {
            self.schedule_cache_invalidation(code);
            return Err(expired(code));
        }

        self.schedule_click(code);

        Ok(link.original_url)
    }

    /// Returns the stored record for a code, read from the store so that the
    /// click counter is current.
    pub async fn stats(&self, code: &str) -> Result<ShortLink, AppError> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| not_found(code))
    }

    /// Deletes a link and evicts it from the cache.
    pub async fn delete(&self, code: &str) -> Result<(), AppError> {
        if !self.repository.delete(code).await? {
            return Err(not_found(code));
        }

        if let Err(e) = self.cache.invalidate(code).await {
            warn!(short_code = code, error = %e, "Cache invalidation failed after delete");
        }

        info!(short_code = code, "Short link deleted");
        Ok(())
    }

    /// Physically removes links past their expiration instant.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let deleted = self.repository.delete_expired(Utc::now()).await?;
        metrics::counter!("links_purged_total").increment(deleted);
        Ok(deleted)
    }

    /// Checks that the store is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    async fn lookup(&self, code: &str) -> Result<ShortLink, AppError> {
        match self.cache.get_link(code).await {
            Ok(Some(link)) => {
                metrics::counter!("cache_hits_total").increment(1);
                return Ok(link);
            }
            Ok(None) => {
                metrics::counter!("cache_misses_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("cache_errors_total").increment(1);
                warn!(short_code = code, error = %e, "Cache read failed, using store");
            }
        }

        let link = self
            .repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| not_found(code))?;

        self.schedule_cache_write(&link, Utc::now());
        Ok(link)
    }

    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code = generate_code(self.settings.code_length)?;

            if !self.repository.exists(&code).await? {
                return Ok(code);
            }

            debug!(attempt, "Generated short code collided");
        }

        Err(AppError::generation_exhausted(MAX_GENERATION_ATTEMPTS))
    }

    fn schedule_cache_write(&self, link: &ShortLink, now: DateTime<Utc>) {
        let Some(ttl) = link.cache_ttl_at(self.settings.cache_ttl, now) else {
            return;
        };

        let cache = Arc::clone(&self.cache);
        let link = link.clone();
        self.background.spawn("cache_write", async move {
            cache.set_link(&link, ttl).await.map_err(cache_task_error)
        });
    }

    fn schedule_cache_invalidation(&self, code: &str) {
        let cache = Arc::clone(&self.cache);
        let code = code.to_string();
        self.background.spawn("cache_invalidate", async move {
            cache.invalidate(&code).await.map_err(cache_task_error)
        });
    }

    fn schedule_click(&self, code: &str) {
        let repository = Arc::clone(&self.repository);
        let code = code.to_string();
        self.background.spawn("click_increment", async move {
            let strategy = ExponentialBackoff::from_millis(20).map(jitter).take(3);

            let found = Retry::start(strategy, || repository.increment_clicks(&code)).await?;
            if !found {
                debug!(short_code = %code, "Click not counted, link no longer exists");
            }
            Ok(())
        });
    }
}

fn expiry_offset(ttl: Duration) -> Result<chrono::Duration, AppError> {
    chrono::Duration::from_std(ttl)
        .map_err(|_| AppError::bad_request("Expiry is too far in the future", json!({})))
}

fn cache_task_error(e: crate::infrastructure::cache::CacheError) -> AppError {
    AppError::internal("Cache operation failed", json!({ "source": e.to_string() }))
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}

fn expired(code: &str) -> AppError {
    AppError::expired("Short link has expired", json!({ "code": code }))
}
