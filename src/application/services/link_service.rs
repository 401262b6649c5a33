//! Link creation, lookup and deactivation.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{Link, LinkStats, NewLink};
use crate::domain::expiration::cache_ttl_for;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{CodeGenerator, CodeStrategy};
use crate::utils::deadline::{cache_call, store_call};

/// Generated candidates tried before giving up on a shorten request.
pub const MAX_COLLISION_RETRIES: usize = 5;

/// Longest lifetime a link may be given, in days.
pub const MAX_EXPIRATION_DAYS: u32 = 3650;

/// Tunables shared by the shorten and resolve paths.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Public prefix for short URLs, e.g. `https://sho.rt`.
    pub base_url: String,
    pub code_length: usize,
    pub strategy: CodeStrategy,
    /// Lifetime applied when a request does not override it. `0` means never expire.
    pub default_expiration_days: u32,
    pub cache_ttl: Duration,
    pub store_timeout: Duration,
    pub cache_timeout: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            code_length: 7,
            strategy: CodeStrategy::Random,
            default_expiration_days: 0,
            cache_ttl: Duration::from_secs(3600),
            store_timeout: Duration::from_secs(2),
            cache_timeout: Duration::from_millis(200),
        }
    }
}

/// A request to shorten an already normalized target.
#[derive(Debug, Clone, Default)]
pub struct ShortenCommand {
    pub target: String,
    pub custom_code: Option<String>,
    /// Overrides the default lifetime when greater than zero.
    pub expiry_days: Option<u32>,
}

/// Result of a shorten request: the stored link and its public URL.
#[derive(Debug, Clone)]
pub struct ShortenedLink {
    pub link: Link,
    pub short_url: String,
}

/// Service for creating and managing short links.
///
/// Owns the write path: deduplication by target, custom alias claims,
/// collision-retrying code generation, persistence and cache seeding.
/// The store's unique index on active codes has the final word on who owns
/// a code; every check made here is an optimistic pre-check.
pub struct LinkService<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    generator: CodeGenerator,
    settings: LinkSettings,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    pub fn new(repository: Arc<L>, cache: Arc<dyn CacheService>, settings: LinkSettings) -> Self {
        Self {
            repository,
            cache,
            generator: CodeGenerator::new(settings.code_length),
            settings,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Creates a short link, or returns the live link already pointing at
    /// the same target.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the custom code fails the shared charset/length rule
    /// - [`AppError::CodeTaken`] if an active link owns the custom code, or another
    ///   request won the race for the chosen code
    /// - [`AppError::GenerationExhausted`] after [`MAX_COLLISION_RETRIES`] used candidates
    /// - [`AppError::Internal`] on store errors or timeouts
    pub async fn shorten(&self, command: ShortenCommand) -> Result<ShortenedLink, AppError> {
        let now = Utc::now();

        if let Some(existing) = store_call(
            self.settings.store_timeout,
            "find_active_by_target",
            self.repository.find_active_by_target(&command.target, now),
        )
        .await?
        {
            debug!(code = %existing.code, "Reusing live link for target");
            return Ok(self.shortened(existing));
        }

        let (code, is_custom) = match command.custom_code {
            Some(custom) => (self.claim_custom_code(custom).await?, true),
            None => (self.generate_unique_code().await?, false),
        };

        let new_link = NewLink {
            code,
            target: command.target,
            expires_at: self.expires_at(command.expiry_days, now)?,
            is_custom,
        };

        let link = store_call(
            self.settings.store_timeout,
            "create",
            self.repository.create(new_link),
        )
        .await?;

        info!(code = %link.code, custom = link.is_custom, "Short link created");

        self.seed_cache(&link).await;

        Ok(self.shortened(link))
    }

    /// Returns the active link for a code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active link owns the code.
    pub async fn get_info(&self, code: &str) -> Result<Link, AppError> {
        store_call(
            self.settings.store_timeout,
            "find_active_by_code",
            self.repository.find_active_by_code(code),
        )
        .await?
        .ok_or_else(|| not_found(code))
    }

    /// Returns statistics for the most recent link with this code, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code was never used.
    pub async fn get_stats(&self, code: &str) -> Result<LinkStats, AppError> {
        let link = store_call(
            self.settings.store_timeout,
            "find_latest_by_code",
            self.repository.find_latest_by_code(code),
        )
        .await?
        .ok_or_else(|| not_found(code))?;

        Ok(LinkStats::from_link(link, Utc::now()))
    }

    /// Marks the active link for a code inactive and drops its cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active link owns the code.
    pub async fn deactivate(&self, code: &str) -> Result<(), AppError> {
        let deactivated = store_call(
            self.settings.store_timeout,
            "deactivate",
            self.repository.deactivate(code),
        )
        .await?;

        if !deactivated {
            return Err(not_found(code));
        }

        info!(code, "Short link deactivated");

        if let Err(e) = cache_call(self.settings.cache_timeout, self.cache.delete(code)).await {
            warn!(code, error = %e, "Failed to evict deactivated link from cache");
        }

        Ok(())
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), code)
    }

    fn shortened(&self, link: Link) -> ShortenedLink {
        ShortenedLink {
            short_url: self.short_url(&link.code),
            link,
        }
    }

    async fn claim_custom_code(&self, code: String) -> Result<String, AppError> {
        if !CodeGenerator::is_valid(&code) {
            return Err(AppError::bad_request(
                "Invalid custom code",
                json!({
                    "code": code,
                    "reason": "must be 4-12 characters from [0-9A-Za-z]",
                }),
            ));
        }

        let taken = store_call(
            self.settings.store_timeout,
            "exists_active_code",
            self.repository.exists_active_code(&code),
        )
        .await?;

        if taken {
            return Err(AppError::CodeTaken { code });
        }

        Ok(code)
    }

    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for attempt in 1..=MAX_COLLISION_RETRIES {
            let candidate = self.next_candidate().await?;

            let taken = store_call(
                self.settings.store_timeout,
                "exists_active_code",
                self.repository.exists_active_code(&candidate),
            )
            .await?;

            if !taken {
                return Ok(candidate);
            }

            debug!(attempt, code = %candidate, "Generated code already in use");
        }

        error!(
            attempts = MAX_COLLISION_RETRIES,
            length = self.generator.length(),
            "Short code generation exhausted"
        );

        Err(AppError::GenerationExhausted {
            attempts: MAX_COLLISION_RETRIES,
        })
    }

    async fn next_candidate(&self) -> Result<String, AppError> {
        match self.settings.strategy {
            CodeStrategy::Random => Ok(self.generator.generate()),
            CodeStrategy::Sequential => {
                let id = store_call(
                    self.settings.store_timeout,
                    "next_sequence",
                    self.repository.next_sequence(),
                )
                .await?;
                Ok(self.generator.from_id(id))
            }
        }
    }

    fn expires_at(
        &self,
        override_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        let Some(days) = override_days
            .filter(|days| *days > 0)
            .or(Some(self.settings.default_expiration_days).filter(|days| *days > 0))
        else {
            return Ok(None);
        };

        let invalid = || {
            AppError::bad_request(
                "Invalid expiry",
                json!({
                    "expiry_days": days,
                    "reason": format!("must be at most {} days", MAX_EXPIRATION_DAYS),
                }),
            )
        };

        if days > MAX_EXPIRATION_DAYS {
            return Err(invalid());
        }

        ChronoDuration::try_days(i64::from(days))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .map(Some)
            .ok_or_else(invalid)
    }

    async fn seed_cache(&self, link: &Link) {
        let Some(ttl) = cache_ttl_for(link.expires_at, Utc::now(), self.settings.cache_ttl) else {
            return;
        };

        if let Err(e) = cache_call(
            self.settings.cache_timeout,
            self.cache.set(&link.code, &link.target, ttl),
        )
        .await
        {
            warn!(code = %link.code, error = %e, "Failed to seed cache for new link");
        }
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}
