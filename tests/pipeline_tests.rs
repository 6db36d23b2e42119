use crate::extras::{StubLlmProvider, call_count, orchestrator};
use httpmock::{Method::GET, MockServer};
use policylens::pipeline::{Analysis, DocumentReport};
use policylens::{DocumentKind, PipelineError};
use spectral::prelude::*;
use url::Url;

mod extras;

const ORIGIN: &str = "https://example.com";
const SUMMARY: &str = "We may sell your data to third-party advertisers";

#[tokio::test]
async fn cache_hit_skips_summarizer() {
    let provider = StubLlmProvider::new(SUMMARY);
    let calls = provider.calls();
    let orchestrator = orchestrator(provider);
    orchestrator
        .storage()
        .store_analysis(ORIGIN, DocumentKind::PrivacyPolicy, "Cached summary", 42)
        .expect("stored");

    let analysis = orchestrator
        .analyze_text(ORIGIN, DocumentKind::PrivacyPolicy, "Fresh policy text")
        .await
        .expect("analysis");

    assert_that(&call_count(&calls)).is_equal_to(0);
    assert_that(&analysis).is_equal_to(Analysis {
        origin: ORIGIN.to_string(),
        kind: DocumentKind::PrivacyPolicy,
        summary: "Cached summary".to_string(),
        score: Some(42),
        cached: true,
    });
}

#[tokio::test]
async fn cache_miss_summarizes_scores_and_stores() {
    let provider = StubLlmProvider::new(SUMMARY);
    let calls = provider.calls();
    let orchestrator = orchestrator(provider);

    let first = orchestrator
        .analyze_text(ORIGIN, DocumentKind::TermsOfService, "Terms text")
        .await
        .expect("analysis");
    let second = orchestrator
        .analyze_text(ORIGIN, DocumentKind::TermsOfService, "Terms text")
        .await
        .expect("analysis");

    assert_that(&call_count(&calls)).is_equal_to(1);
    assert_that(&first.cached).is_false();
    assert_that(&first.score).is_equal_to(Some(80));
    assert_that(&second.cached).is_true();
    assert_that(&second.summary.as_str()).is_equal_to(SUMMARY);
    assert_that(
        &orchestrator
            .storage()
            .cached_summary(ORIGIN, DocumentKind::TermsOfService)
            .expect("read"),
    )
    .is_equal_to(Some(SUMMARY.to_string()));
    assert_that(&orchestrator.storage().cached_score(ORIGIN).expect("read")).is_equal_to(Some(80));
}

#[tokio::test]
async fn blank_text_is_not_summarized() {
    let provider = StubLlmProvider::new(SUMMARY);
    let calls = provider.calls();
    let orchestrator = orchestrator(provider);

    let result = orchestrator
        .analyze_text(ORIGIN, DocumentKind::PrivacyPolicy, "  \n ")
        .await;

    assert!(matches!(result, Err(PipelineError::NotFound(_))));
    assert_that(&call_count(&calls)).is_equal_to(0);
}

#[tokio::test]
async fn summarization_failure_leaves_cache_untouched() {
    let orchestrator = orchestrator(StubLlmProvider::failing("invalid api key"));

    let result = orchestrator
        .analyze_text(ORIGIN, DocumentKind::PrivacyPolicy, "Policy text")
        .await;

    assert!(matches!(result, Err(PipelineError::Summarization(_))));
    assert_that(&orchestrator.storage().site_record(ORIGIN).expect("read"))
        .is_equal_to(policylens::storage::SiteRecord::default());
}

#[tokio::test]
async fn manual_override_replaces_cached_entry() {
    let server = MockServer::start_async().await;
    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/new-policy");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body><main><p>Data is encrypted and anonymized.</p></main></body></html>");
        })
        .await;

    let provider = StubLlmProvider::new("Data is encrypted and anonymized.");
    let calls = provider.calls();
    let prompts = provider.prompts();
    let orchestrator = orchestrator(provider);
    orchestrator
        .storage()
        .store_analysis(ORIGIN, DocumentKind::PrivacyPolicy, "Old summary", 10)
        .expect("stored");

    let url = Url::parse(&server.url("/new-policy")).expect("valid url");
    let analysis = orchestrator
        .override_url(ORIGIN, DocumentKind::PrivacyPolicy, &url)
        .await
        .expect("analysis");

    page.assert_async().await;
    assert_that(&call_count(&calls)).is_equal_to(1);
    assert_that(&prompts.lock().expect("prompts lock").clone()).is_equal_to(vec![
        "Summarize the following text:\nData is encrypted and anonymized.".to_string(),
    ]);
    assert_that(&analysis.score).is_equal_to(Some(110));
    assert_that(&analysis.cached).is_false();
    assert_that(
        &orchestrator
            .storage()
            .cached_summary(ORIGIN, DocumentKind::PrivacyPolicy)
            .expect("read"),
    )
    .is_equal_to(Some("Data is encrypted and anonymized.".to_string()));
    assert_that(&orchestrator.storage().cached_score(ORIGIN).expect("read"))
        .is_equal_to(Some(110));
}

#[tokio::test]
async fn override_with_failing_fetch_keeps_cache() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gone");
            then.status(500);
        })
        .await;

    let orchestrator = orchestrator(StubLlmProvider::new(SUMMARY));
    orchestrator
        .storage()
        .store_analysis(ORIGIN, DocumentKind::PrivacyPolicy, "Old summary", 10)
        .expect("stored");

    let url = Url::parse(&server.url("/gone")).expect("valid url");
    let result = orchestrator
        .override_url(ORIGIN, DocumentKind::PrivacyPolicy, &url)
        .await;

    assert!(matches!(
        result,
        Err(PipelineError::HttpStatus { status: 500, .. })
    ));
    assert_that(&orchestrator.storage().cached_score(ORIGIN).expect("read")).is_equal_to(Some(10));
}

#[tokio::test]
async fn scan_finds_link_and_sitemap_entry() {
    let server = MockServer::start_async().await;
    let sitemap_body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
         <url><loc>{}</loc></url>\n<url><loc>{}</loc></url>\n</urlset>\n",
        server.url("/about"),
        server.url("/legal/terms")
    );
    let home = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).header("content-type", "text/html").body(
                r#"<html><body><nav><a href="/about">About us</a><a href="/privacy">Privacy Policy</a></nav><p>Welcome</p></body></html>"#,
            );
        })
        .await;
    let sitemap = server
        .mock_async(|when, then| {
            when.method(GET).path("/sitemap.xml");
            then.status(200)
                .header("content-type", "application/xml")
                .body(sitemap_body);
        })
        .await;
    let privacy = server
        .mock_async(|when, then| {
            when.method(GET).path("/privacy");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body><main><h1>Privacy</h1><p>We collect data.</p></main></body></html>");
        })
        .await;
    let terms = server
        .mock_async(|when, then| {
            when.method(GET).path("/legal/terms");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body><article><p>Terms apply.</p></article></body></html>");
        })
        .await;

    let provider = StubLlmProvider::new(SUMMARY);
    let calls = provider.calls();
    let prompts = provider.prompts();
    let orchestrator = orchestrator(provider);
    let page_url = Url::parse(&server.url("/")).expect("valid url");

    let scan = orchestrator.scan_site(&page_url).await.expect("scan");

    home.assert_async().await;
    sitemap.assert_async().await;
    privacy.assert_async().await;
    terms.assert_async().await;
    assert_that(&call_count(&calls)).is_equal_to(2);
    assert_that(&prompts.lock().expect("prompts lock").clone()).is_equal_to(vec![
        "Summarize the following text:\nPrivacy\nWe collect data.".to_string(),
        "Summarize the following text:\nTerms apply.".to_string(),
    ]);
    for kind in DocumentKind::ALL {
        match scan.report(kind) {
            DocumentReport::Analyzed(analysis) => {
                assert_that(&analysis.summary.as_str()).is_equal_to(SUMMARY);
                assert_that(&analysis.score).is_equal_to(Some(80));
                assert_that(&analysis.cached).is_false();
            }
            other => panic!("unexpected {kind} report: {other:?}"),
        }
    }

    let rescan = orchestrator.scan_site(&page_url).await.expect("scan");

    assert_that(&home.hits_async().await).is_equal_to(1);
    assert_that(&call_count(&calls)).is_equal_to(2);
    assert!(matches!(rescan.report(DocumentKind::PrivacyPolicy), DocumentReport::Analyzed(analysis) if analysis.cached));
    assert!(matches!(rescan.report(DocumentKind::TermsOfService), DocumentReport::Analyzed(analysis) if analysis.cached));
}

#[tokio::test]
async fn scan_without_links_or_sitemap_finds_nothing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("content-type", "text/html")
                .body(r#"<html><body><a href="/blog">Blog</a></body></html>"#);
        })
        .await;
    let sitemap = server
        .mock_async(|when, then| {
            when.method(GET).path("/sitemap.xml");
            then.status(404);
        })
        .await;

    let provider = StubLlmProvider::new(SUMMARY);
    let calls = provider.calls();
    let orchestrator = orchestrator(provider);
    let page_url = Url::parse(&server.url("/")).expect("valid url");

    let scan = orchestrator.scan_site(&page_url).await.expect("scan");

    sitemap.assert_hits_async(2).await;
    assert_that(&call_count(&calls)).is_equal_to(0);
    assert_that(&scan.policy).is_equal_to(DocumentReport::NotFound);
    assert_that(&scan.terms).is_equal_to(DocumentReport::NotFound);
}

#[tokio::test]
async fn scan_failure_is_scoped_to_one_kind() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).header("content-type", "text/html").body(
                r#"<html><body><a href="/privacy">Privacy</a><a href="/terms">Terms</a></body></html>"#,
            );
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/privacy");
            then.status(503);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/terms");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body><main><p>Be nice.</p></main></body></html>");
        })
        .await;

    let orchestrator = orchestrator(StubLlmProvider::new(SUMMARY));
    let page_url = Url::parse(&server.url("/")).expect("valid url");

    let scan = orchestrator.scan_site(&page_url).await.expect("scan");

    assert!(matches!(scan.policy, DocumentReport::Failed(_)));
    assert!(matches!(scan.terms, DocumentReport::Analyzed(_)));
    assert_that(&scan.origin).is_equal_to(policylens::fetch::origin_of(&page_url).expect("origin"));
}
