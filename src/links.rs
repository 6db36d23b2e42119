//! Discovery of policy links among a page's anchors.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::parse::inner_text;

static ANCHORS: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("a[href]").ok());

/// An anchor element as the browser exposes it: visible text and resolved href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub text: String,
    pub href: Url,
}

/// Collects the anchors of a page in document order, resolving each href against
/// the page URL. Anchors with unresolvable hrefs are skipped.
pub fn collect_anchors(html: &str, page_url: &Url) -> Vec<Anchor> {
    let Some(selector) = ANCHORS.as_ref() else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(selector)
        .filter_map(|element| {
            let href = page_url.join(element.value().attr("href")?.trim()).ok()?;
            Some(Anchor {
                text: inner_text(element),
                href,
            })
        })
        .collect()
}

/// Returns the first anchor whose text or href contains any keyword, ignoring case.
pub fn find_link<'a>(anchors: &'a [Anchor], keywords: &[&str]) -> Option<&'a Anchor> {
    anchors.iter().find(|anchor| {
        let text = anchor.text.to_lowercase();
        let href = anchor.href.as_str().to_lowercase();

        keywords
            .iter()
            .any(|keyword| text.contains(keyword) || href.contains(keyword))
    })
}
