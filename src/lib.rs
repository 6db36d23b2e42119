//! The policylens library locates a website's privacy policy and terms of service,
//! summarizes them with an LLM, scores the summary and caches the result per origin.

pub mod compose;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod fetch;
pub mod links;
pub mod parse;
pub mod pipeline;
pub mod protocol;
pub mod sanitize;
pub mod score;
pub mod sitemap;
pub mod storage;
pub mod summarize;

use constants::{PRIVACY_POLICY_KEYWORDS, TERMS_OF_SERVICE_KEYWORDS};

/// Enum representing the kind of legal document being processed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DocumentKind {
    PrivacyPolicy,
    TermsOfService,
}

impl DocumentKind {
    /// Both kinds, in the order a site scan processes them.
    pub const ALL: [DocumentKind; 2] = [DocumentKind::PrivacyPolicy, DocumentKind::TermsOfService];

    /// Keywords used to spot links and sitemap entries of this kind.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            DocumentKind::PrivacyPolicy => PRIVACY_POLICY_KEYWORDS,
            DocumentKind::TermsOfService => TERMS_OF_SERVICE_KEYWORDS,
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::PrivacyPolicy => "privacy policy",
            DocumentKind::TermsOfService => "terms of service",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.label())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "privacy" | "policy" | "privacy_policy" => Ok(DocumentKind::PrivacyPolicy),
            "terms" | "tos" | "terms_of_service" => Ok(DocumentKind::TermsOfService),
            _ => Err(format!("Invalid document kind: {}", input)),
        }
    }
}

/// Enum representing the text extraction method.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ExtractBy {
    /// Use the prioritized main-content selectors
    #[default]
    Selectors,
    /// Use dom_smoothie for readability extraction
    DomSmoothie,
    /// Use fast_html2md for markdown conversion
    FastHtml2Md,
}

impl std::str::FromStr for ExtractBy {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "selectors" => Ok(ExtractBy::Selectors),
            "dom_smoothie" => Ok(ExtractBy::DomSmoothie),
            "fast_html2md" => Ok(ExtractBy::FastHtml2Md),
            _ => Err(format!("Invalid text extraction method: {}", input)),
        }
    }
}

pub use error::PipelineError;
pub use parse::{extract_text, find_main_content};
pub use pipeline::Orchestrator;
pub use sanitize::sanitize;
pub use score::privacy_score;
pub use summarize::Summarizer;
