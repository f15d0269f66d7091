use super::*;
use crate::fetch::FakeFetcher;
use crate::link_extractor::FakeLinkExtractor;
use crawl_core::Reference;

fn ctx() -> PipelineContext {
    PipelineContext::new("crawler-1")
}

#[tokio::test]
async fn default_importer_surfaces_extracted_links_as_nested_responses() {
    let fetcher = FakeFetcher::new().with_response(
        "https://a",
        crate::fetch::FetchResponse {
            status: 200,
            document: Document::with_content(b"page".to_vec(), "text/html"),
        },
    );
    let extractor = FakeLinkExtractor::new(vec!["https://a/1", "https://a/2"]);
    let importer = DefaultImporter::new(fetcher, extractor);
    let reference = Reference::seed("https://a");

    let response = importer
        .import(&ctx(), &reference, None, Document::new_empty())
        .await
        .expect("importer should not filter");

    assert!(response.success);
    assert_eq!(response.nested.len(), 2);
    assert_eq!(response.nested[0].0, "https://a/1");
}

#[tokio::test]
async fn default_importer_reports_not_found_as_failure() {
    let fetcher = FakeFetcher::new();
    let extractor = FakeLinkExtractor::new(vec![]);
    let importer = DefaultImporter::new(fetcher, extractor);
    let reference = Reference::seed("https://missing");

    let response = importer
        .import(&ctx(), &reference, None, Document::new_empty())
        .await
        .expect("importer should not filter");

    assert!(!response.success);
    assert!(response.status_description.starts_with("not_found"));
}

#[tokio::test]
async fn fake_importer_records_calls_and_returns_canned_response() {
    let importer = FakeImporter::new().with_response(
        "https://a",
        ImporterResponse::success(Document::with_content(b"x".to_vec(), "text/plain")),
    );
    let reference = Reference::seed("https://a");

    let response = importer
        .import(&ctx(), &reference, None, Document::new_empty())
        .await;

    assert!(response.is_some());
    assert_eq!(importer.calls(), vec!["https://a".to_string()]);
}

#[tokio::test]
async fn fake_importer_honors_filtered_registration() {
    let importer = FakeImporter::new().with_filtered("https://skip");
    let reference = Reference::seed("https://skip");

    let response = importer
        .import(&ctx(), &reference, None, Document::new_empty())
        .await;

    assert!(response.is_none());
}
