/*!
 * End-to-end synchronization runs against temporary site trees.
 *
 * Every run uses the in-crate mock provider, whose output is
 * `[TRANSLATED to <code>] <text>`, so written documents can be checked
 * exactly and provider calls can be counted.
 */

use locsync::document::{Document, get_node_attr, inner_html};
use locsync::providers::MockProvider;
use locsync::providers::mock::BatchMode;
use locsync::translation::{TranslationCache, fingerprint};
use locsync::{Controller, DocumentStatus};

use crate::common;

#[tokio::test]
async fn test_sync_withExistingTarget_shouldTranslateRegionOnly() {
    common::init_logging();
    let site = common::create_site(true).unwrap();
    let mock = MockProvider::working();

    let controller = Controller::with_options(common::sync_options(site.path(), &["eng"])).unwrap();
    let report = controller.run_with_provider(common::as_provider(&mock)).await.unwrap();

    assert_eq!(report.summary.documents, 1);
    assert_eq!(report.summary.processed, 1);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.summary.units, 5);
    assert_eq!(report.documents[0].status, DocumentStatus::Synced);

    let target = Document::load(&site.path().join("eng/esg/index.html")).unwrap();
    let region = inner_html(&target.content_region("content").unwrap()).unwrap();
    assert!(region.starts_with("<h1>[TRANSLATED to en] 회사 소개</h1>"));
    assert!(region.contains("<p>[TRANSLATED to en] 우리는 <b>[TRANSLATED to en] 데이터</b>[TRANSLATED to en] 를 만듭니다.</p>"));
    assert!(region.contains(r#"<a href="/eng/esg/report.html">[TRANSLATED to en] 보고서</a>"#));
    assert!(region.contains("<script>var x = 1;</script>"));
    assert!(!region.contains("Outdated"));

    let page = target.to_html().unwrap();
    assert!(page.contains(r#"<header><a href="/eng/index.html">Home</a></header>"#));
    assert!(page.contains("<footer>Footer</footer>"));

    let root = target.html_element().unwrap();
    assert_eq!(get_node_attr(&root, "class").as_deref(), Some("eng"));
    assert_eq!(get_node_attr(&root, "lang").as_deref(), Some("en"));
}

#[tokio::test]
async fn test_sync_runTwice_shouldServeSecondRunFromCache() {
    let site = common::create_site(true).unwrap();
    let options = common::sync_options(site.path(), &["eng"]);

    let first_mock = MockProvider::working();
    let controller = Controller::with_options(options.clone()).unwrap();
    let first = controller.run_with_provider(common::as_provider(&first_mock)).await.unwrap();
    let first_output = common::read(site.path(), "eng/esg/index.html");

    assert_eq!(first.summary.provider_calls, 5);
    assert!(site.path().join(".translation-cache/eng.json").exists());

    let second_mock = MockProvider::working();
    let second = Controller::with_options(options)
        .unwrap()
        .run_with_provider(common::as_provider(&second_mock))
        .await
        .unwrap();

    assert_eq!(second_mock.total_calls(), 0);
    assert_eq!(second.summary.cache_hits, 5);
    assert_eq!(common::read(site.path(), "eng/esg/index.html"), first_output);
}

#[tokio::test]
async fn test_sync_withMultipleTargets_shouldKeepSeparateCaches() {
    let site = common::create_site(false).unwrap();
    let mock = MockProvider::working();

    let controller = Controller::with_options(common::sync_options(site.path(), &["eng", "chn"])).unwrap();
    let report = controller.run_with_provider(common::as_provider(&mock)).await.unwrap();

    assert_eq!(report.summary.processed, 2);
    assert_eq!(mock.total_calls(), 10);

    let chinese = common::read(site.path(), "chn/esg/index.html");
    assert!(chinese.contains("[TRANSLATED to zh-CN] 회사 소개"));
    assert!(chinese.contains(r#"href="/chn/esg/report.html""#));

    let cache_dir = site.path().join(".translation-cache");
    let english_cache = TranslationCache::load(&cache_dir, "eng");
    let chinese_cache = TranslationCache::load(&cache_dir, "chn");
    assert_eq!(english_cache.len(), 5);
    assert_eq!(
        chinese_cache.get(&fingerprint("보고서", "chn")),
        Some("[TRANSLATED to zh-CN] 보고서")
    );
    assert!(english_cache.get(&fingerprint("보고서", "chn")).is_none());
}

#[tokio::test]
async fn test_sync_withoutTarget_shouldBootstrapFromSource() {
    let site = common::create_site(false).unwrap();
    let mock = MockProvider::working();

    let report = Controller::with_options(common::sync_options(site.path(), &["eng"]))
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    assert_eq!(report.documents[0].template, Some(locsync::file_utils::TemplateSource::Source));
    let page = common::read(site.path(), "eng/esg/index.html");
    // The chrome comes from the source page; only the region is translated
    assert!(page.contains(r#"<header><a href="/kor/index.html">홈</a></header>"#));
    assert!(page.contains("[TRANSLATED to en] 회사 소개"));
    assert!(page.contains(r#"class="eng""#));
}

#[tokio::test]
async fn test_sync_withSiblingSkeleton_shouldUseSiblingChrome() {
    let site = common::create_site(false).unwrap();
    common::write_file(
        site.path(),
        "eng/esg/about.html",
        r#"<html class="eng" lang="en"><body><nav>English nav</nav><main id="content">About</main></body></html>"#,
    )
    .unwrap();
    let mock = MockProvider::working();

    Controller::with_options(common::sync_options(site.path(), &["eng"]))
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    let page = common::read(site.path(), "eng/esg/index.html");
    assert!(page.contains("<nav>English nav</nav>"));
    assert!(page.contains(r#"<main id="content"><h1>[TRANSLATED to en] 회사 소개</h1>"#));
    assert!(!page.contains("About</main>"));
}

#[tokio::test]
async fn test_sync_withGlossaryAndBlacklist_shouldFilterTranslations() {
    let site = common::create_site(true).unwrap();
    common::write_file(site.path(), "glossary/eng.csv", "Hello,Hi\n").unwrap();

    let mut options = common::sync_options(site.path(), &["eng"]);
    options.blacklist = vec!["there".to_string()];
    let mock = MockProvider::working().with_custom_response(|_, _| "Hello there".to_string());

    Controller::with_options(options)
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    let page = common::read(site.path(), "eng/esg/index.html");
    assert!(page.contains("<h1>Hi</h1>"));
    assert!(!page.contains("there"));
}

#[tokio::test]
async fn test_sync_withFailingBatch_shouldFallBackToSingleCalls() {
    let site = common::create_site(true).unwrap();
    let mock = MockProvider::working().with_batch(BatchMode::Failing);

    let report = Controller::with_options(common::sync_options(site.path(), &["eng"]))
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    assert_eq!(mock.batch_calls(), 1);
    assert_eq!(mock.single_calls(), 5);
    assert_eq!(report.summary.unit_failures, 0);
    assert!(common::read(site.path(), "eng/esg/index.html").contains("[TRANSLATED to en] 보고서"));
}

#[tokio::test]
async fn test_sync_withFailingUnit_shouldKeepOriginalAndRetryNextRun() {
    let site = common::create_site(true).unwrap();
    let options = common::sync_options(site.path(), &["eng"]);

    let flaky = MockProvider::working().failing_on("데이터");
    let report = Controller::with_options(options.clone())
        .unwrap()
        .run_with_provider(common::as_provider(&flaky))
        .await
        .unwrap();

    assert_eq!(report.summary.unit_failures, 1);
    assert_eq!(report.summary.processed, 1);
    assert!(common::read(site.path(), "eng/esg/index.html").contains("<b>데이터</b>"));

    let healthy = MockProvider::working();
    Controller::with_options(options)
        .unwrap()
        .run_with_provider(common::as_provider(&healthy))
        .await
        .unwrap();

    assert_eq!(healthy.requested_texts(), vec!["데이터"]);
    assert!(common::read(site.path(), "eng/esg/index.html").contains("<b>[TRANSLATED to en] 데이터</b>"));
}

#[tokio::test]
async fn test_sync_withIgnoreSelectors_shouldLeaveIgnoredTextAlone() {
    let site = common::create_site(true).unwrap();
    let mut options = common::sync_options(site.path(), &["eng"]);
    options.ignore_selectors = vec!["#content b".to_string()];
    let mock = MockProvider::working();

    let report = Controller::with_options(options)
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    assert_eq!(report.summary.units, 4);
    assert!(common::read(site.path(), "eng/esg/index.html").contains("<b>데이터</b>"));
}

#[tokio::test]
async fn test_dry_run_shouldWriteNothing() {
    let site = common::create_site(false).unwrap();
    let mut options = common::sync_options(site.path(), &["eng"]);
    options.dry_run = true;

    let report = Controller::with_options(options).unwrap().run().await.unwrap();

    assert_eq!(report.summary.processed, 1);
    assert_eq!(report.summary.units, 5);
    assert_eq!(report.summary.provider_calls, 0);
    assert_eq!(report.documents[0].status, DocumentStatus::Reported);
    assert_eq!(report.documents[0].template, Some(locsync::file_utils::TemplateSource::Source));
    assert!(!site.path().join("eng").exists());
    assert!(!site.path().join(".translation-cache").exists());
}

#[tokio::test]
async fn test_dry_run_shouldReportCachedUnits() {
    let site = common::create_site(true).unwrap();
    let options = common::sync_options(site.path(), &["eng"]);
    let mock = MockProvider::working();
    Controller::with_options(options.clone())
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();
    let synced = common::read(site.path(), "eng/esg/index.html");

    let mut dry = options;
    dry.dry_run = true;
    let report = Controller::with_options(dry).unwrap().run_with_provider(None).await.unwrap();

    assert_eq!(report.documents[0].cached, 5);
    assert_eq!(report.documents[0].template, Some(locsync::file_utils::TemplateSource::Existing));
    assert_eq!(common::read(site.path(), "eng/esg/index.html"), synced);
}

#[tokio::test]
async fn test_sync_withPreformattedText_shouldKeepLineStructure() {
    let site = common::create_temp_dir().unwrap();
    common::write_file(
        site.path(),
        "kor/code.html",
        &common::page_with_content("<pre>line one\nline two\n  indented</pre>"),
    )
    .unwrap();
    let mock = MockProvider::working();

    Controller::with_options(common::sync_options(site.path(), &["eng"]))
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    assert_eq!(mock.requested_texts(), vec!["line one\nline two\n  indented"]);
    assert!(common::read(site.path(), "eng/code.html").contains("<pre>[TRANSLATED to en] line one\nline two\n  indented</pre>"));
}
