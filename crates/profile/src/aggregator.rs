//! Profile aggregation with a time-bounded cache for the external block.
//!
//! Local documents are re-read on every call. The GitHub block is fetched at
//! most once per cache window; concurrent misses share a single fetch.

use alterego_core::event::{DomainEvent, EventBus};
use alterego_core::PersonaConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::github::ExternalProfileFetcher;
use crate::source::ProfileSource;

/// Separator between profile sections.
const SECTION_SEPARATOR: &str = "\n\n";

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    content: String,
    fetched_at: DateTime<Utc>,
}

/// Assembles the grounding profile for the system prompt.
pub struct ProfileAggregator {
    persona: PersonaConfig,
    source: ProfileSource,
    fetcher: Arc<dyn ExternalProfileFetcher>,
    clock: Arc<dyn Clock>,
    event_bus: Option<Arc<EventBus>>,
    cache: RwLock<Option<CacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl ProfileAggregator {
    pub fn new(
        persona: PersonaConfig,
        source: ProfileSource,
        fetcher: Arc<dyn ExternalProfileFetcher>,
    ) -> Self {
        Self {
            persona,
            source,
            fetcher,
            clock: Arc::new(SystemClock),
            event_bus: None,
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    /// The combined profile: summary, resume, then the external block when
    /// requested and configured. Empty sections are omitted.
    pub async fn get_profile(&self, include_external: bool) -> String {
        let mut sections = Vec::with_capacity(3);

        let summary = self.source.load_summary();
        if !summary.is_empty() {
            sections.push(format!("## Summary\n{summary}"));
        }

        let resume = self.source.load_resume();
        if !resume.is_empty() {
            sections.push(format!("## Resume\n{resume}"));
        }

        if include_external {
            if let Some(external) = self.external_section().await {
                sections.push(external);
            }
        }

        sections.join(SECTION_SEPARATOR)
    }

    /// Drop the cached external block; the next `get_profile` refetches.
    pub async fn force_refresh(&self) {
        *self.cache.write().await = None;
        info!("Profile cache cleared");
    }

    /// Clear the cache and rebuild the full profile immediately.
    pub async fn refresh_now(&self) -> String {
        self.force_refresh().await;
        self.get_profile(true).await
    }

    /// When the external block was last fetched, if it is cached.
    pub async fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.cache.read().await.as_ref().map(|entry| entry.fetched_at)
    }

    async fn external_section(&self) -> Option<String> {
        let username = self
            .persona
            .github_username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())?;

        if let Some(content) = self.cached().await {
            debug!("Using cached external profile");
            return non_empty(content);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(content) = self.cached().await {
            return non_empty(content);
        }

        let started = Instant::now();
        match self.fetcher.fetch(username).await {
            Ok(content) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                info!(
                    source = self.fetcher.source(),
                    bytes = content.len(),
                    duration_ms,
                    "External profile fetched"
                );
                *self.cache.write().await = Some(CacheEntry {
                    content: content.clone(),
                    fetched_at: self.clock.now(),
                });
                self.publish(DomainEvent::ProfileFetched {
                    source: self.fetcher.source().to_string(),
                    bytes: content.len(),
                    duration_ms,
                    timestamp: Utc::now(),
                });
                non_empty(content)
            }
            Err(e) => {
                warn!(source = self.fetcher.source(), error = %e, "External profile fetch failed");
                self.publish(DomainEvent::ErrorOccurred {
                    context: format!("profile:{}", self.fetcher.source()),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                None
            }
        }
    }

    async fn cached(&self) -> Option<String> {
        let cache = self.cache.read().await;
        let entry = cache.as_ref()?;
        let window = chrono::Duration::seconds(
            i64::try_from(self.persona.cache_duration_secs).unwrap_or(i64::MAX),
        );
        (self.clock.now() - entry.fetched_at < window).then(|| entry.content.clone())
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

fn non_empty(content: String) -> Option<String> {
    (!content.is_empty()).then_some(content)
}
