//! Persona prompt templates.
//!
//! The system prompt for every turn is built as:
//!
//! 1. the persona template for the configured [`PromptStyle`]
//! 2. the aggregated profile (summary, resume, GitHub activity)
//! 3. a closing line that keeps the model in character
//!
//! Each template ends with a lead-in line, so the profile text can be
//! appended directly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tone of the persona prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Career-focused but personable (the default)
    #[default]
    Main,
    /// Formal portfolio assistant
    Professional,
    /// Chatty, first-person storytelling
    Casual,
}

impl PromptStyle {
    /// Parse a style name. Unknown names fall back to [`PromptStyle::Main`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Self::Professional,
            "casual" => Self::Casual,
            _ => Self::Main,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Professional => "professional",
            Self::Casual => "casual",
        }
    }

    /// Render the persona template for `name`.
    pub fn template(&self, name: &str) -> String {
        match self {
            Self::Main => main_prompt(name),
            Self::Professional => professional_prompt(name),
            Self::Casual => casual_prompt(name),
        }
    }
}

impl std::fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and grounding-source locations for one assistant instance.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Display name the assistant speaks as
    pub name: String,

    /// Tone of the persona prompt
    #[serde(default)]
    pub prompt_style: PromptStyle,

    /// Plain-text summary document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_path: Option<PathBuf>,

    /// Resume document (plain text, or PDF with the `pdf` feature)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<PathBuf>,

    /// GitHub login; `None` disables the external source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,

    /// Optional GitHub token for higher rate limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// How long a fetched GitHub block stays valid; 0 = always refetch
    #[serde(default)]
    pub cache_duration_secs: u64,
}

impl PersonaConfig {
    /// A persona with no grounding sources configured.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt_style: PromptStyle::Main,
            summary_path: None,
            resume_path: None,
            github_username: None,
            github_token: None,
            cache_duration_secs: 0,
        }
    }

    /// Whether the external (GitHub) source is enabled.
    pub fn has_external_source(&self) -> bool {
        self.github_username
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty())
    }

    /// The system prompt for this persona given the aggregated profile.
    pub fn system_prompt(&self, profile: &str) -> String {
        system_prompt(&self.name, self.prompt_style, profile)
    }
}

impl std::fmt::Debug for PersonaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaConfig")
            .field("name", &self.name)
            .field("prompt_style", &self.prompt_style)
            .field("summary_path", &self.summary_path)
            .field("resume_path", &self.resume_path)
            .field("github_username", &self.github_username)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_duration_secs", &self.cache_duration_secs)
            .finish()
    }
}

/// Build the full system prompt: template, grounding profile, closing line.
pub fn system_prompt(name: &str, style: PromptStyle, profile: &str) -> String {
    format!(
        "{}{}\n\nWith this context, please chat with the user, always staying in character as {}.",
        style.template(name),
        profile,
        name
    )
}

fn main_prompt(name: &str) -> String {
    format!(
        "You are acting as {name}. You are answering questions on {name}'s website, \
particularly questions related to {name}'s career, background, skills and experience. \
Your responsibility is to represent {name} for interactions on the website as faithfully as possible.

You have access to comprehensive, real-time information about {name} including:
- Personal background and life story
- Professional summary and career journey
- Current GitHub repositories and coding activity
- Detailed work experience
- Skills and technologies used
- Featured projects and their descriptions
- Educational background and certifications

Be professional and engaging, as if talking to a potential client, collaborator, or future employer who came across the website. \
Show personality while maintaining professionalism. \
Use the real-time GitHub data to provide current information about coding projects and activity. \
When discussing technical skills, reference specific repositories and recent work when relevant.

If you don't know the answer to any question, use your record_unknown_question tool to record the question that you couldn't answer, \
even if it's about something trivial or unrelated to career.

If the user is engaging in discussion and shows genuine interest, try to steer them towards getting in touch via email; \
ask for their email and record it using your record_user_details tool. Be natural about this - don't be pushy.

Here is the current profile information:

"
    )
}

fn professional_prompt(name: &str) -> String {
    format!(
        "You are a professional AI assistant representing {name} on their portfolio website. \
Your role is to provide comprehensive information about {name}'s professional background, technical expertise, and career achievements.

Maintain a professional, knowledgeable tone while being approachable and helpful. Focus primarily on:
- Technical skills and project experience
- Professional accomplishments and career progression
- Educational background and certifications
- Industry expertise and specializations

Use the provided profile data to answer questions accurately and encourage meaningful professional discussions.

If you can't answer a question, record it with the record_unknown_question tool. \
If visitors show interest in collaboration or employment opportunities, guide them toward making contact \
and record their details with the record_user_details tool.

Profile information:

"
    )
}

fn casual_prompt(name: &str) -> String {
    format!(
        "Hey! You're chatting with an AI version of {name}. I'm here to share {name}'s story - \
both the professional journey and the fun personal stuff too!

Feel free to ask about anything - from technical projects and career experiences to hobbies and travel. \
The goal is to give you a real sense of who {name} is, both as a professional and as a person.

If I don't know something, I'll note the question with record_unknown_question so {name} can follow up. \
If we hit it off and you're interested in connecting, I'll take your email with record_user_details!

Here's what I know about {name}:

"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_with_main_fallback() {
        assert_eq!(PromptStyle::parse("Professional"), PromptStyle::Professional);
        assert_eq!(PromptStyle::parse(" casual "), PromptStyle::Casual);
        assert_eq!(PromptStyle::parse("main"), PromptStyle::Main);
        assert_eq!(PromptStyle::parse("pirate"), PromptStyle::Main);
    }

    #[test]
    fn templates_mention_the_persona() {
        for style in [PromptStyle::Main, PromptStyle::Professional, PromptStyle::Casual] {
            let prompt = style.template("Ada Lovelace");
            assert!(prompt.contains("Ada Lovelace"), "{style} template lacks name");
        }
    }

    #[test]
    fn system_prompt_appends_profile_and_closing_line() {
        let prompt = system_prompt("Ada", PromptStyle::Main, "## Summary\nMathematician");
        assert!(prompt.contains("## Summary\nMathematician"));
        assert!(prompt.ends_with("always staying in character as Ada."));
        let template_end = prompt.find("## Summary").unwrap();
        assert!(prompt[..template_end].contains("record_unknown_question"));
    }

    #[test]
    fn blank_username_disables_external_source() {
        let mut persona = PersonaConfig::named("Ada");
        assert!(!persona.has_external_source());
        persona.github_username = Some("  ".into());
        assert!(!persona.has_external_source());
        persona.github_username = Some("ada".into());
        assert!(persona.has_external_source());
    }

    #[test]
    fn debug_redacts_token() {
        let persona = PersonaConfig {
            github_token: Some("ghp_secret".into()),
            ..PersonaConfig::named("Ada")
        };
        let dbg = format!("{persona:?}");
        assert!(!dbg.contains("ghp_secret"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn style_serde_is_lowercase() {
        let json = serde_json::to_string(&PromptStyle::Casual).unwrap();
        assert_eq!(json, "\"casual\"");
    }
}
