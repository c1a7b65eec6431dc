//! GitHub activity as grounding context.
//!
//! [`GitHubClient`] talks to the REST API; [`GitHubFetcher`] turns the raw
//! records into a [`GitHubReport`] and renders it as markdown for the prompt.
//! Individual request failures degrade to empty values; only a missing user
//! record makes the whole report unavailable.

use alterego_core::error::ProfileError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Repositories requested per fetch.
const REPOS_PER_PAGE: u32 = 30;
/// Events requested per fetch.
const EVENTS_PER_PAGE: u32 = 10;
const MAX_FEATURED: usize = 10;
const MAX_RECENT: usize = 5;
const MAX_EVENTS: usize = 5;
const RENDERED_LANGUAGES: usize = 5;
const RENDERED_PROJECTS: usize = 5;

const UNAVAILABLE_REASON: &str = "Could not fetch GitHub profile";

// --- API records ---

/// A GitHub user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubUser {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub twitter_username: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub html_url: String,
}

/// A repository as listed by `/users/{u}/repos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubRepo {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    pub updated_at: Option<String>,
    pub topics: Vec<String>,
    pub fork: bool,
}

impl GitHubRepo {
    fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// A public activity event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: EventRepo,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRepo {
    pub name: String,
}

/// Byte counts per language, in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageBytes(pub Vec<(String, u64)>);

impl<'de> Deserialize<'de> for LanguageBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = LanguageBytes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language names to byte counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((lang, bytes)) = map.next_entry::<String, u64>()? {
                    entries.push((lang, bytes));
                }
                Ok(LanguageBytes(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// The four read operations the fetcher needs.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn user(&self, username: &str) -> Result<GitHubUser, ProfileError>;

    /// Owned repositories, most recently updated first.
    async fn repositories(&self, username: &str) -> Result<Vec<GitHubRepo>, ProfileError>;

    async fn languages(&self, username: &str, repo: &str) -> Result<LanguageBytes, ProfileError>;

    async fn recent_events(&self, username: &str) -> Result<Vec<GitHubEvent>, ProfileError>;
}

/// `reqwest` client for the GitHub REST API.
pub struct GitHubClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client; a token raises the rate limit.
    pub fn new(token: Option<String>) -> Self {
        Self {
            base_url: GITHUB_API_URL.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at another API root (GitHub Enterprise, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProfileError> {
        let url = format!("{}{path}", self.base_url);
        let failed = |reason: String| ProfileError::RemoteFetchFailed {
            endpoint: path.to_string(),
            reason,
        };

        let mut request = self
            .client
            .get(&url)
            .query(query)
            .timeout(Duration::from_secs(15))
            .header("Accept", "application/vnd.github.v3+json")
            .header(
                "User-Agent",
                concat!("alterego/", env!("CARGO_PKG_VERSION")),
            );
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request.send().await.map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status.as_u16())));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| failed(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn user(&self, username: &str) -> Result<GitHubUser, ProfileError> {
        self.get_json(&format!("/users/{username}"), &[]).await
    }

    async fn repositories(&self, username: &str) -> Result<Vec<GitHubRepo>, ProfileError> {
        let query = [
            ("sort", "updated".to_string()),
            ("per_page", REPOS_PER_PAGE.to_string()),
            ("type", "owner".to_string()),
        ];
        self.get_json(&format!("/users/{username}/repos"), &query)
            .await
    }

    async fn languages(&self, username: &str, repo: &str) -> Result<LanguageBytes, ProfileError> {
        self.get_json(&format!("/repos/{username}/{repo}/languages"), &[])
            .await
    }

    async fn recent_events(&self, username: &str) -> Result<Vec<GitHubEvent>, ProfileError> {
        let query = [("per_page", EVENTS_PER_PAGE.to_string())];
        self.get_json(&format!("/users/{username}/events/public"), &query)
            .await
    }
}

// --- Report ---

/// Share of one language across all owned, non-fork repositories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub language: String,
    /// Percentage rounded to one decimal
    pub percent: f64,
}

/// Everything gathered about a GitHub account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GitHubSummary {
    pub profile: GitHubUser,
    /// Display name; the login when the account has none
    pub display_name: String,
    pub total_repos: usize,
    pub featured: Vec<GitHubRepo>,
    pub recent: Vec<GitHubRepo>,
    pub languages: Vec<LanguageShare>,
    pub top_languages: Vec<LanguageShare>,
    pub recent_events: Vec<GitHubEvent>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GitHubReport {
    Available(Box<GitHubSummary>),
    Unavailable { reason: String },
}

impl GitHubReport {
    /// Render the report as prompt-ready markdown.
    pub fn render(&self) -> String {
        match self {
            Self::Available(summary) => render_summary(summary),
            Self::Unavailable { reason } => format!("GitHub data unavailable: {reason}"),
        }
    }
}

/// Source of the external profile block.
#[async_trait]
pub trait ExternalProfileFetcher: Send + Sync {
    /// Label used in logs and events.
    fn source(&self) -> &str;

    async fn fetch(&self, username: &str) -> Result<String, ProfileError>;
}

/// Builds [`GitHubReport`]s from a [`GitHubApi`].
pub struct GitHubFetcher {
    api: Arc<dyn GitHubApi>,
}

impl GitHubFetcher {
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self { api }
    }

    /// Gather the full report for `username`.
    pub async fn report(&self, username: &str) -> GitHubReport {
        info!(username, "Fetching GitHub profile data");

        let profile = match self.api.user(username).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(username, error = %e, "GitHub profile unavailable");
                return GitHubReport::Unavailable {
                    reason: UNAVAILABLE_REASON.into(),
                };
            }
        };

        let repos = self.api.repositories(username).await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not list repositories");
            Vec::new()
        });

        let owned: Vec<&GitHubRepo> = repos.iter().filter(|r| !r.fork).collect();
        let per_repo = futures::future::join_all(
            owned
                .iter()
                .map(|repo| self.api.languages(username, &repo.name)),
        )
        .await;

        let mut totals: Vec<(String, u64)> = Vec::new();
        for (repo, result) in owned.iter().zip(per_repo) {
            match result {
                Ok(LanguageBytes(entries)) => accumulate(&mut totals, entries),
                Err(e) => debug!(repo = %repo.name, error = %e, "No language data"),
            }
        }
        let languages = language_percentages(&totals);

        let recent_events = match self.api.recent_events(username).await {
            Ok(mut events) => {
                events.truncate(MAX_EVENTS);
                events
            }
            Err(e) => {
                warn!(error = %e, "Could not fetch recent activity");
                Vec::new()
            }
        };

        let display_name = profile
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| username.to_string());

        GitHubReport::Available(Box::new(GitHubSummary {
            display_name,
            total_repos: repos.len(),
            featured: rank_featured(owned.into_iter().cloned().collect()),
            recent: repos.iter().take(MAX_RECENT).cloned().collect(),
            top_languages: top_languages(&languages, RENDERED_LANGUAGES),
            languages,
            recent_events,
            last_updated: Utc::now(),
            profile,
        }))
    }
}

#[async_trait]
impl ExternalProfileFetcher for GitHubFetcher {
    fn source(&self) -> &str {
        "github"
    }

    async fn fetch(&self, username: &str) -> Result<String, ProfileError> {
        Ok(self.report(username).await.render())
    }
}

fn accumulate(totals: &mut Vec<(String, u64)>, entries: Vec<(String, u64)>) {
    for (lang, bytes) in entries {
        match totals.iter_mut().find(|(name, _)| *name == lang) {
            Some((_, total)) => *total += bytes,
            None => totals.push((lang, bytes)),
        }
    }
}

/// Per-language share of the total byte count, rounded to one decimal with
/// ties to even.
///
/// Keeps the input order. A zero total yields an empty distribution.
pub fn language_percentages(totals: &[(String, u64)]) -> Vec<LanguageShare> {
    let total: u64 = totals.iter().map(|(_, bytes)| bytes).sum();
    if total == 0 {
        return Vec::new();
    }
    totals
        .iter()
        .map(|(language, bytes)| LanguageShare {
            language: language.clone(),
            percent: (*bytes as f64 / total as f64 * 1000.0).round_ties_even() / 10.0,
        })
        .collect()
}

/// The `limit` largest shares, highest first. Ties keep input order.
pub fn top_languages(shares: &[LanguageShare], limit: usize) -> Vec<LanguageShare> {
    let mut sorted = shares.to_vec();
    sorted.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    sorted.truncate(limit);
    sorted
}

/// Repositories worth showing: starred or described, ordered by stars then
/// `updated_at`, both descending. Ties keep input order.
///
/// `updated_at` is compared as a string, which orders ISO-8601 timestamps
/// correctly as long as they share a format.
pub fn rank_featured(repos: Vec<GitHubRepo>) -> Vec<GitHubRepo> {
    let mut featured: Vec<GitHubRepo> = repos
        .into_iter()
        .filter(|r| r.stargazers_count > 0 || r.has_description())
        .collect();
    featured.sort_by(|a, b| {
        let key = |r: &GitHubRepo| (r.stargazers_count, r.updated_at.clone().unwrap_or_default());
        key(b).cmp(&key(a))
    });
    featured.truncate(MAX_FEATURED);
    featured
}

fn render_summary(summary: &GitHubSummary) -> String {
    let profile = &summary.profile;
    let mut sections = Vec::new();

    let mut block = String::from("## GitHub Profile\n");
    block.push_str(&format!("- **Name**: {}\n", summary.display_name));
    for (label, value) in [
        ("Bio", &profile.bio),
        ("Location", &profile.location),
        ("Company", &profile.company),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            block.push_str(&format!("- **{label}**: {value}\n"));
        }
    }
    block.push_str(&format!("- **Public Repositories**: {}\n", profile.public_repos));
    block.push_str(&format!("- **Followers**: {}\n", profile.followers));
    block.push_str(&format!("- **Profile**: {}\n", profile.html_url));
    sections.push(block);

    if !summary.top_languages.is_empty() {
        let mut block = String::from("## Programming Languages\n");
        for share in &summary.top_languages {
            block.push_str(&format!("- **{}**: {:.1}%\n", share.language, share.percent));
        }
        sections.push(block);
    }

    if !summary.featured.is_empty() {
        let mut block = String::from("## Featured Projects\n");
        for repo in summary.featured.iter().take(RENDERED_PROJECTS) {
            block.push_str(&format!("### {}\n", repo.name));
            if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
                block.push_str(description);
                block.push('\n');
            }
            block.push_str(&format!(
                "- **Language**: {}\n",
                repo.language.as_deref().unwrap_or("N/A")
            ));
            block.push_str(&format!("- **Stars**: {}\n", repo.stargazers_count));
            block.push_str(&format!("- **URL**: {}\n", repo.html_url));
            if !repo.topics.is_empty() {
                block.push_str(&format!("- **Topics**: {}\n", repo.topics.join(", ")));
            }
            block.push('\n');
        }
        sections.push(block);
    }

    sections.join("\n")
}
