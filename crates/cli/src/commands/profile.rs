//! `alterego profile`: show what the persona is grounded on.

use alterego_profile::{GitHubApi, GitHubClient, GitHubFetcher};
use std::sync::Arc;

pub async fn run(no_github: bool, json: bool, prompt: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let persona = config.persona_config();

    if json {
        let username = persona
            .github_username
            .as_deref()
            .ok_or("No GitHub username configured (profile.github_username or GITHUB_USERNAME)")?;
        let api: Arc<dyn GitHubApi> = Arc::new(GitHubClient::new(persona.github_token.clone()));
        let report = GitHubFetcher::new(api).report(username).await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let aggregator = alterego_profile::build_aggregator(&persona);
    let profile = aggregator.get_profile(!no_github).await;

    if prompt {
        println!("{}", persona.system_prompt(&profile));
    } else if profile.is_empty() {
        eprintln!("  No profile sources configured. Set summary_path, resume_path or github_username.");
    } else {
        println!("{profile}");
    }

    Ok(())
}
