//! Grounding data for the persona.
//!
//! Three sources feed the system prompt:
//! - a plain-text summary and a resume document ([`source`])
//! - live GitHub activity ([`github`])
//!
//! [`ProfileAggregator`] combines them in a fixed order and caches the
//! GitHub block for a configurable window.

pub mod aggregator;
pub mod github;
pub mod source;

pub use aggregator::{Clock, ProfileAggregator, SystemClock};
pub use github::{
    ExternalProfileFetcher, GitHubApi, GitHubClient, GitHubFetcher, GitHubReport, GitHubSummary,
};
pub use source::{PlainTextExtractor, ProfileSource, TextExtractor};

#[cfg(feature = "pdf")]
pub use source::PdfTextExtractor;

use alterego_core::PersonaConfig;
use std::sync::Arc;

/// Build the aggregator for a persona, wired to the real GitHub API.
pub fn build_aggregator(persona: &PersonaConfig) -> ProfileAggregator {
    let source = ProfileSource::new(
        persona.summary_path.clone(),
        persona.resume_path.clone(),
        default_extractor(),
    );
    let api: Arc<dyn GitHubApi> = Arc::new(GitHubClient::new(persona.github_token.clone()));
    ProfileAggregator::new(persona.clone(), source, Arc::new(GitHubFetcher::new(api)))
}

/// The resume extractor selected by the enabled cargo features.
pub fn default_extractor() -> Arc<dyn TextExtractor> {
    #[cfg(feature = "pdf")]
    {
        Arc::new(PdfTextExtractor)
    }
    #[cfg(not(feature = "pdf"))]
    {
        Arc::new(PlainTextExtractor)
    }
}
