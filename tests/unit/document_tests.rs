/*!
 * Tests for the document model, text collection and merging
 */

use std::collections::BTreeSet;

use locsync::document::{Collector, Document, IgnoreSelectors, Merger, get_node_attr, inner_html, text_content};
use locsync::errors::DocumentError;

use crate::common;

fn ignore(selectors: &[&str]) -> IgnoreSelectors {
    IgnoreSelectors::parse(&selectors.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
}

fn merger(target: &str, lang: &str) -> Merger {
    Merger {
        region_id: "content".to_string(),
        source_prefix: "/kor/".to_string(),
        target_prefix: format!("/{}/", target),
        target_marker: target.to_string(),
        target_lang: lang.to_string(),
        known_markers: ["kor", "eng", "chn"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
    }
}

#[test]
fn test_document_load_and_save_shouldPreserveOutsideContent() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::write_file(dir.path(), "page.html", common::TARGET_PAGE).unwrap();

    let document = Document::load(&path).unwrap();
    document.save(&dir.path().join("copy.html")).unwrap();

    let copy = common::read(dir.path(), "copy.html");
    assert!(copy.contains("<header><a href=\"/eng/index.html\">Home</a></header>"));
    assert!(copy.contains("<footer>Footer</footer>"));
    assert!(copy.contains("<title>About</title>"));
}

#[test]
fn test_document_load_withMissingFile_shouldFailWithIo() {
    let dir = common::create_temp_dir().unwrap();
    assert!(matches!(Document::load(&dir.path().join("nope.html")), Err(DocumentError::Io { .. })));
}

#[test]
fn test_content_region_withoutRegion_shouldFail() {
    let document = Document::parse("<html><body><p>No region</p></body></html>");
    assert!(matches!(
        document.content_region("content"),
        Err(DocumentError::MissingContentRegion { .. })
    ));
}

#[test]
fn test_collector_onSourcePage_shouldFollowDocumentOrder() {
    let document = Document::parse(common::SOURCE_PAGE);
    let region = document.content_region("content").unwrap();
    let selectors = IgnoreSelectors::default();

    let units: Vec<String> = Collector::new(&selectors)
        .collect(&region)
        .into_iter()
        .map(|unit| unit.normalized)
        .collect();

    assert_eq!(units, common::SOURCE_UNITS);
}

#[test]
fn test_collector_withIgnoreSelectors_shouldSkipSubtrees() {
    let document = Document::parse(common::SOURCE_PAGE);
    let region = document.content_region("content").unwrap();
    let selectors = ignore(&["p b", "a[href]"]);

    let units: Vec<String> = Collector::new(&selectors)
        .collect(&region)
        .into_iter()
        .map(|unit| unit.normalized)
        .collect();

    assert_eq!(units, vec!["회사 소개", "우리는", "를 만듭니다."]);
}

#[test]
fn test_collector_shouldIgnoreTextOutsideRegion() {
    let document = Document::parse(common::SOURCE_PAGE);
    let region = document.content_region("content").unwrap();
    let selectors = IgnoreSelectors::default();
    let units = Collector::new(&selectors).collect(&region);

    assert!(units.iter().all(|unit| unit.normalized != "홈" && unit.normalized != "푸터"));
}

#[test]
fn test_merge_onExistingTarget_shouldReplaceRegionAndKeepChrome() {
    let source = Document::parse(common::SOURCE_PAGE);
    let target = Document::parse(common::TARGET_PAGE);
    let selectors = IgnoreSelectors::default();
    let units = Collector::new(&selectors).collect(&source.content_region("content").unwrap());
    let translations: Vec<String> = ["About us", "We", "build.", "data", "Report"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let report = merger("eng", "en").merge(source, &units, &translations, &target).unwrap();
    assert_eq!(report.units_written, 5);
    assert_eq!(report.links_rewritten, 1);
    assert!(!report.region_created);

    let region = target.content_region("content").unwrap();
    assert_eq!(text_content(&region).replace("var x = 1;", ""), "About usWe databuild.Report");
    let html = inner_html(&region).unwrap();
    assert!(html.contains(r#"<a href="/eng/esg/report.html">Report</a>"#));
    assert!(!html.contains("Outdated"));

    let page = target.to_html().unwrap();
    assert!(page.contains(r#"<header><a href="/eng/index.html">Home</a></header>"#));

    let root = target.html_element().unwrap();
    assert_eq!(get_node_attr(&root, "class").as_deref(), Some("eng"));
    assert_eq!(get_node_attr(&root, "lang").as_deref(), Some("en"));
}

#[test]
fn test_merge_withTranslationCountMismatch_shouldFail() {
    let source = Document::parse(common::SOURCE_PAGE);
    let target = Document::parse(common::TARGET_PAGE);
    let selectors = IgnoreSelectors::default();
    let units = Collector::new(&selectors).collect(&source.content_region("content").unwrap());

    let result = merger("eng", "en").merge(source, &units, &["only one".to_string()], &target);
    assert!(matches!(result, Err(DocumentError::UnitCountMismatch { expected: 5, actual: 1 })));
}

#[test]
fn test_merge_intoSkeletonWithoutRegion_shouldCreateRegion() {
    let source = Document::parse(&common::page_with_content("<p>하나</p>"));
    let target = Document::parse("<p>Skeleton</p>");
    let selectors = IgnoreSelectors::default();
    let units = Collector::new(&selectors).collect(&source.content_region("content").unwrap());

    let report = merger("chn", "zh").merge(source, &units, &["一".to_string()], &target).unwrap();

    assert!(report.region_created);
    let region = target.content_region("content").unwrap();
    assert_eq!(inner_html(&region).unwrap(), "<p>一</p>");
}
