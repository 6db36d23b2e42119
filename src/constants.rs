pub const MODEL_API_KEY_ENV_NAME: &str = "POLICYLENS_API_KEY";

pub const FALLBACK_API_KEY_ENV_NAME: &str = "OPENAI_API_KEY";

pub const DEFAULT_MODEL: &str = "openai://gpt-4-turbo";

pub const DEFAULT_MAX_TOKENS: u32 = 500;

pub const USER_AGENT: &str = "PolicyLens Bot";

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";

pub(crate) const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub(crate) const SUMMARY_PROMPT_PREFIX: &str = "Summarize the following text:\n";

pub const PRIVACY_POLICY_KEYWORDS: &[&str] = &[
    "privacy",
    "policy",
    "data protection",
    "cookie",
    "gdpr",
    "ccpa",
    "california consumer privacy act",
    "personal information",
    "confidentiality",
    "data privacy",
];

pub const TERMS_OF_SERVICE_KEYWORDS: &[&str] = &[
    "terms",
    "conditions",
    "use",
    "service",
    "agreement",
    "license",
    "terms of use",
    "terms of service",
    "legal",
    "user agreement",
    "acceptable use",
];

/// Main content selectors, highest priority first.
pub(crate) const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "section",
    r#"div[class*="content"]"#,
    r#"div[class*="main"]"#,
    r#"div[id*="content"]"#,
    r#"div[id*="main"]"#,
];

pub(crate) const TEXT_HEAVY_SELECTOR: &str = "p, h1, h2, h3, li";

/// Pages with more elements skip readability extraction.
pub const READABILITY_MAX_ELEMENTS: usize = 10_000;

pub(crate) const POLICY_KEY_PREFIX: &str = "summarizedPolicy_";

pub(crate) const TERMS_KEY_PREFIX: &str = "summarizedTerms_";

pub(crate) const SCORE_KEY_PREFIX: &str = "privacyScore_";

pub(crate) const USER_CONSENTS_KEY: &str = "userConsents";
