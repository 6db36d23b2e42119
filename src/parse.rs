use crate::{DocumentKind, ExtractBy, sanitize::sanitize};

use dom_smoothie::{Article, CandidateSelectMode, Config, Readability, TextMode};
use html2md;
use log::{debug, warn};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector as ScraperSelector};
use url::Url;

use crate::constants::{MAIN_CONTENT_SELECTORS, READABILITY_MAX_ELEMENTS, TEXT_HEAVY_SELECTOR};
use crate::error::{PipelineError, Result};

static MAIN_CONTENT: Lazy<Vec<ScraperSelector>> = Lazy::new(|| {
    MAIN_CONTENT_SELECTORS
        .iter()
        .filter_map(|query| ScraperSelector::parse(query).ok())
        .collect()
});

static TEXT_HEAVY: Lazy<Option<ScraperSelector>> =
    Lazy::new(|| ScraperSelector::parse(TEXT_HEAVY_SELECTOR).ok());

static BODY: Lazy<Option<ScraperSelector>> = Lazy::new(|| ScraperSelector::parse("body").ok());

/// Elements whose content never shows up as rendered text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements rendered on their own lines.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "td",
    "th", "tr", "ul",
];

/// A fetched policy page. The raw HTML only lives until its text is derived.
#[derive(Debug)]
pub struct PolicyDocument {
    pub source_url: Url,
    pub kind: DocumentKind,
    pub raw_html: String,
}

/// Sanitized text of a policy page, attributed to the origin it is cached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub kind: DocumentKind,
    pub origin: String,
    pub text: String,
}

impl PolicyDocument {
    /// Extracts and sanitizes the document text, dropping the raw HTML.
    pub fn into_text(self, origin: String, extract_by: ExtractBy) -> ExtractedText {
        let text = sanitize(&extract_text(&self.raw_html, extract_by));
        debug!(
            "Extracted {} characters of {} from {}",
            text.len(),
            self.kind,
            self.source_url
        );

        ExtractedText {
            kind: self.kind,
            origin,
            text,
        }
    }
}

/// Extracts the text of an HTML document with the given method. Never fails.
pub fn extract_text(html: &str, extract_by: ExtractBy) -> String {
    match extract_by {
        ExtractBy::Selectors => find_main_content(html),
        ExtractBy::DomSmoothie => match readability_text(html) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                debug!("Readability extraction found no text, using content selectors");
                find_main_content(html)
            }
            Err(error) => {
                warn!("Readability extraction failed ({error}), using content selectors");
                find_main_content(html)
            }
        },
        ExtractBy::FastHtml2Md => html2md::parse_html(html, false),
    }
}

/// Locates the main content region of an HTML document and returns its text.
///
/// Tries the main content selectors in priority order and returns the inner text
/// of the first match. Without a match, concatenates paragraphs, headings and list
/// items in document order, one per line. A blank result falls back to the body text.
pub fn find_main_content(html: &str) -> String {
    let document = Html::parse_document(html);

    let text = match MAIN_CONTENT
        .iter()
        .find_map(|selector| document.select(selector).next())
    {
        Some(element) => inner_text(element),
        None => text_heavy_content(&document),
    };

    if text.trim().is_empty()
        && let Some(selector) = BODY.as_ref()
        && let Some(body) = document.select(selector).next()
    {
        return inner_text(body);
    }

    text
}

fn text_heavy_content(document: &Html) -> String {
    let mut text = String::new();
    if let Some(selector) = TEXT_HEAVY.as_ref() {
        for element in document.select(selector) {
            text.push_str(&inner_text(element));
            text.push('\n');
        }
    }

    text
}

/// Approximates the rendered text of an element: whitespace is collapsed, block
/// elements start new lines, invisible elements are skipped and blank lines dropped.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }
    if name == "br" {
        out.push('\n');
        return;
    }

    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        out.push('\n');
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            push_collapsed(out, text);
        }
    }

    if block {
        out.push('\n');
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    let mut last_was_space = false;
    for character in text.chars() {
        if character.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(character);
            last_was_space = false;
        }
    }
}

fn readability_text(html: &str) -> Result<String> {
    let config = Config {
        text_mode: TextMode::Markdown,
        candidate_select_mode: CandidateSelectMode::DomSmoothie,
        max_elements_to_parse: READABILITY_MAX_ELEMENTS,
        ..Default::default()
    };

    let mut readability = Readability::new(html, None, Some(config))
        .map_err(|e| PipelineError::Parse(format!("readability setup failed: {e}")))?;
    let article: Article = readability
        .parse()
        .map_err(|e| PipelineError::Parse(format!("readability extraction failed: {e}")))?;

    Ok(article.text_content.to_string())
}
