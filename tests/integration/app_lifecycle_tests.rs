/*!
 * Controller lifecycle: discovery, failure handling and fatal errors
 */

use locsync::errors::{AppError, ConfigError};
use locsync::providers::MockProvider;
use locsync::{Controller, DocumentStatus};

use crate::common;

#[tokio::test]
async fn test_run_withNoDocuments_shouldFail() {
    let site = common::create_temp_dir().unwrap();
    let controller = Controller::with_options(common::sync_options(site.path(), &["eng"])).unwrap();

    let result = controller.run_with_provider(common::as_provider(&MockProvider::working())).await;
    assert!(matches!(result, Err(AppError::NoDocuments(_))));
}

#[tokio::test]
async fn test_run_withoutProviderOutsideDryRun_shouldFail() {
    let site = common::create_site(true).unwrap();
    let controller = Controller::with_options(common::sync_options(site.path(), &["eng"])).unwrap();

    let result = controller.run_with_provider(None).await;
    assert!(matches!(result, Err(AppError::Config(ConfigError::Invalid(_)))));
}

#[tokio::test]
async fn test_run_withMissingCredentials_shouldFailBeforeProcessing() {
    let site = common::create_site(true).unwrap();
    let mut options = common::sync_options(site.path(), &["eng"]);
    options.provider.kind = locsync::TranslationProvider::Papago;

    let result = Controller::with_options(options).unwrap().run().await;

    assert!(matches!(result, Err(AppError::Config(ConfigError::MissingCredential { .. }))));
    assert!(common::read(site.path(), "eng/esg/index.html").contains("Outdated"));
}

#[test]
fn test_dry_run_withSeveralTargets_shouldReportEachLocale() {
    let site = common::create_site(false).unwrap();
    let mut options = common::sync_options(site.path(), &["eng", "jpn"]);
    options.dry_run = true;
    let controller = Controller::with_options(options).unwrap();

    let report = tokio_test::block_on(async { controller.run_with_provider(None).await }).unwrap();

    let locales: Vec<_> = report.documents.iter().map(|d| d.locale.clone()).collect();
    assert_eq!(locales, vec!["eng", "jpn"]);
    assert_eq!(report.summary.units, 10);
    assert!(report.documents.iter().all(|d| d.status == DocumentStatus::Reported));
    assert!(!site.path().join("jpn").exists());
}

#[test]
fn test_with_options_withEmptyBlacklistPhrase_shouldFail() {
    let site = common::create_temp_dir().unwrap();
    let mut options = common::sync_options(site.path(), &["eng"]);
    options.blacklist = vec![String::new()];

    assert!(matches!(
        Controller::with_options(options),
        Err(AppError::Config(ConfigError::InvalidBlacklist { .. }))
    ));
}

#[tokio::test]
async fn test_run_withMissingRegion_shouldCountFailureAndContinue() {
    let site = common::create_site(false).unwrap();
    common::write_file(site.path(), "kor/esg/broken.html", "<html><body><p>영역 없음</p></body></html>").unwrap();
    let mock = MockProvider::working();

    let report = Controller::with_options(common::sync_options(site.path(), &["eng"]))
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    assert_eq!(report.summary.documents, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.processed, 1);
    assert!(matches!(report.documents[0].status, DocumentStatus::Failed(_)));
    assert_eq!(report.documents[1].status, DocumentStatus::Synced);
    assert!(!site.path().join("eng/esg/broken.html").exists());
    assert!(site.path().join("eng/esg/index.html").exists());
}

#[tokio::test]
async fn test_run_withSourceAmongTargets_shouldSkipIt() {
    let site = common::create_site(true).unwrap();
    let mock = MockProvider::working();

    let report = Controller::with_options(common::sync_options(site.path(), &["kor", "eng"]))
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.processed, 1);
    assert!(matches!(report.documents[0].status, DocumentStatus::Skipped(_)));
    assert_eq!(common::read(site.path(), "kor/esg/index.html"), common::SOURCE_PAGE);
}

#[tokio::test]
async fn test_run_withScope_shouldOnlyTouchScopedDocuments() {
    let site = common::create_site(false).unwrap();
    common::write_file(site.path(), "kor/ir/index.html", &common::page_with_content("<p>투자</p>")).unwrap();
    let mut options = common::sync_options(site.path(), &["eng"]);
    options.scope = Some("ir".to_string());
    let mock = MockProvider::working();

    let report = Controller::with_options(options)
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    assert_eq!(report.summary.documents, 1);
    assert_eq!(mock.requested_texts(), vec!["투자"]);
    assert!(site.path().join("eng/ir/index.html").exists());
    assert!(!site.path().join("eng/esg/index.html").exists());
}

#[tokio::test]
async fn test_run_withExplicitInputs_shouldProcessInSortedOrder() {
    let site = common::create_site(false).unwrap();
    common::write_file(site.path(), "kor/b.html", &common::page_with_content("<p>비</p>")).unwrap();
    common::write_file(site.path(), "kor/a.html", &common::page_with_content("<p>에이</p>")).unwrap();
    let base = site.path().to_string_lossy().to_string();

    let mut options = common::sync_options(site.path(), &["eng"]);
    options.inputs = vec![format!("{}/kor/b.html", base), format!("{}/kor/*.html", base)];
    let mock = MockProvider::working();

    let report = Controller::with_options(options)
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    let sources: Vec<_> = report.documents.iter().map(|d| d.source.clone()).collect();
    assert_eq!(sources, vec![site.path().join("kor/a.html"), site.path().join("kor/b.html")]);
    assert_eq!(mock.requested_texts(), vec!["에이", "비"]);
}

#[tokio::test]
async fn test_run_withDuplicateTextAcrossDocuments_shouldTranslateOnce() {
    let site = common::create_temp_dir().unwrap();
    common::write_file(site.path(), "kor/one.html", &common::page_with_content("<p>공통 문구</p>")).unwrap();
    common::write_file(site.path(), "kor/two.html", &common::page_with_content("<p>공통  문구</p>")).unwrap();
    let mock = MockProvider::working();

    let report = Controller::with_options(common::sync_options(site.path(), &["eng"]))
        .unwrap()
        .run_with_provider(common::as_provider(&mock))
        .await
        .unwrap();

    assert_eq!(mock.total_calls(), 1);
    assert_eq!(report.summary.cache_hits, 1);
    assert!(common::read(site.path(), "eng/two.html").contains("[TRANSLATED to en] 공통 문구"));
}
