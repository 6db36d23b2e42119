//! The pipeline module ties link discovery, extraction, summarization, scoring and
//! the cache together. Every operation checks the cache before touching the network.

use log::{info, warn};
use url::Url;

use crate::error::{PipelineError, Result};
use crate::fetch::{Fetcher, origin_of};
use crate::links::{collect_anchors, find_link};
use crate::parse::{ExtractedText, PolicyDocument};
use crate::score::privacy_score;
use crate::sitemap::find_in_sitemap;
use crate::storage::Storage;
use crate::summarize::Summarizer;
use crate::{DocumentKind, ExtractBy};

/// Summary and score of one document kind for one origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub origin: String,
    pub kind: DocumentKind,
    pub summary: String,
    /// Latest score stored for the origin, absent only for legacy cache entries
    pub score: Option<u32>,
    /// Whether the result came from the cache
    pub cached: bool,
}

/// Outcome of scanning one document kind of a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentReport {
    Analyzed(Analysis),
    /// No link, no sitemap entry or no text: nothing to summarize
    NotFound,
    Failed(String),
}

/// Outcome of scanning a site for both document kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScan {
    pub origin: String,
    pub policy: DocumentReport,
    pub terms: DocumentReport,
}

impl SiteScan {
    pub fn report(&self, kind: DocumentKind) -> &DocumentReport {
        match kind {
            DocumentKind::PrivacyPolicy => &self.policy,
            DocumentKind::TermsOfService => &self.terms,
        }
    }
}

/// Runs pipeline requests against a shared cache.
///
/// Concurrent requests for the same origin are not de-duplicated: two misses racing
/// each other both call the summarizer and the last write wins.
pub struct Orchestrator {
    storage: Storage,
    summarizer: Summarizer,
    fetcher: Fetcher,
    extract_by: ExtractBy,
}

impl Orchestrator {
    pub fn new(storage: Storage, summarizer: Summarizer, fetcher: Fetcher) -> Self {
        Self {
            storage,
            summarizer,
            fetcher,
            extract_by: ExtractBy::default(),
        }
    }

    pub fn with_extract_by(mut self, extract_by: ExtractBy) -> Self {
        self.extract_by = extract_by;
        self
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Returns the cached analysis of a document kind, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read.
    pub fn cached(&self, origin: &str, kind: DocumentKind) -> Result<Option<Analysis>> {
        let Some(summary) = self.storage.cached_summary(origin, kind)? else {
            return Ok(None);
        };

        Ok(Some(Analysis {
            origin: origin.to_string(),
            kind,
            summary,
            score: self.storage.cached_score(origin)?,
            cached: true,
        }))
    }

    /// Summarizes and scores policy text unless the origin already has a cached result.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be accessed, the text is blank or the
    /// summarization fails.
    pub async fn analyze_text(
        &self,
        origin: &str,
        kind: DocumentKind,
        text: &str,
    ) -> Result<Analysis> {
        if let Some(analysis) = self.cached(origin, kind)? {
            info!("Loaded cached {kind} of {origin}");
            return Ok(analysis);
        }

        self.resummarize(origin, kind, text).await
    }

    /// Summarizes and scores policy text, overwriting any cached result.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank, the summarization fails or the result
    /// cannot be stored.
    pub async fn resummarize(
        &self,
        origin: &str,
        kind: DocumentKind,
        text: &str,
    ) -> Result<Analysis> {
        if text.trim().is_empty() {
            return Err(PipelineError::NotFound(format!("no {kind} text found")));
        }

        let summary = self.summarizer.summarize(text).await?;
        let score = privacy_score(&summary);
        self.storage.store_analysis(origin, kind, &summary, score)?;
        info!("Stored {kind} summary of {origin} with privacy score {score}");

        Ok(Analysis {
            origin: origin.to_string(),
            kind,
            summary,
            score: Some(score),
            cached: false,
        })
    }

    /// Fetches a policy page and derives its sanitized text.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched.
    pub async fn extract_from_url(
        &self,
        url: &Url,
        origin: &str,
        kind: DocumentKind,
    ) -> Result<ExtractedText> {
        let document = PolicyDocument {
            source_url: url.clone(),
            kind,
            raw_html: self.fetcher.fetch_text(url).await?,
        };

        Ok(document.into_text(origin.to_string(), self.extract_by))
    }

    /// Re-summarizes a document kind of a site from a user supplied URL, replacing
    /// whatever was cached for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched, has no text, or the
    /// summarization fails.
    pub async fn override_url(
        &self,
        origin: &str,
        kind: DocumentKind,
        url: &Url,
    ) -> Result<Analysis> {
        info!("Summarizing {kind} of {origin} from {url}");
        let extracted = self.extract_from_url(url, origin, kind).await?;
        self.resummarize(&extracted.origin, kind, &extracted.text).await
    }

    /// Finds the URL of a document kind: first among the page links, then in the sitemap.
    ///
    /// # Errors
    ///
    /// Returns an error if the sitemap request fails or the sitemap is malformed.
    /// A missing link and a missing sitemap both yield `Ok(None)`.
    pub async fn locate(
        &self,
        page_url: &Url,
        page_html: &str,
        kind: DocumentKind,
    ) -> Result<Option<Url>> {
        let anchors = collect_anchors(page_html, page_url);
        if let Some(anchor) = find_link(&anchors, kind.keywords()) {
            info!("Found {kind} link: {}", anchor.href);
            return Ok(Some(anchor.href.clone()));
        }

        info!("{kind} not found in HTML. Trying sitemap...");
        match find_in_sitemap(&self.fetcher, page_url, kind.keywords()).await {
            Ok(url) => Ok(Some(url)),
            Err(error) if error.is_not_found() => {
                info!("{kind} not found in sitemap: {error}");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Scans the site of a page for its privacy policy and terms of service.
    ///
    /// The page itself is only fetched when at least one kind is missing from the cache.
    /// Failures while handling one kind do not affect the other.
    ///
    /// # Errors
    ///
    /// Returns an error if the page has no origin, the cache cannot be read or the
    /// page cannot be fetched.
    pub async fn scan_site(&self, page_url: &Url) -> Result<SiteScan> {
        let origin = origin_of(page_url)?;
        let policy = self.cached(&origin, DocumentKind::PrivacyPolicy)?;
        let terms = self.cached(&origin, DocumentKind::TermsOfService)?;

        let page_html = if policy.is_none() || terms.is_none() {
            self.fetcher.fetch_text(page_url).await?
        } else {
            info!("Loaded cached documents of {origin}");
            String::new()
        };

        let policy = match policy {
            Some(analysis) => DocumentReport::Analyzed(analysis),
            None => {
                self.scan_document(page_url, &page_html, &origin, DocumentKind::PrivacyPolicy)
                    .await
            }
        };
        let terms = match terms {
            Some(analysis) => DocumentReport::Analyzed(analysis),
            None => {
                self.scan_document(page_url, &page_html, &origin, DocumentKind::TermsOfService)
                    .await
            }
        };

        Ok(SiteScan {
            origin,
            policy,
            terms,
        })
    }

    async fn scan_document(
        &self,
        page_url: &Url,
        page_html: &str,
        origin: &str,
        kind: DocumentKind,
    ) -> DocumentReport {
        let result: Result<Option<Analysis>> = async {
            let Some(url) = self.locate(page_url, page_html, kind).await? else {
                return Ok(None);
            };
            let extracted = self.extract_from_url(&url, origin, kind).await?;
            if extracted.text.trim().is_empty() {
                info!("{url} holds no {kind} text");
                return Ok(None);
            }

            self.analyze_text(origin, kind, &extracted.text)
                .await
                .map(Some)
        }
        .await;

        match result {
            Ok(Some(analysis)) => DocumentReport::Analyzed(analysis),
            Ok(None) => DocumentReport::NotFound,
            Err(error) if error.is_not_found() => DocumentReport::NotFound,
            Err(error) => {
                warn!("Error processing {kind} of {origin}: {error}");
                DocumentReport::Failed(error.to_string())
            }
        }
    }

    /// Fetches the raw HTML of a URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the request fails.
    pub async fn fetch_url_content(&self, url: &str) -> Result<String> {
        let url = Url::parse(url)?;
        self.fetcher.fetch_text(&url).await
    }
}
