/*!
 * Tests for the cache, the filters and batch translation
 */

use std::sync::Arc;
use std::time::Duration;

use locsync::providers::mock::BatchMode;
use locsync::providers::{LanguagePair, MockProvider};
use locsync::translation::{
    BatchTranslator, Blacklist, Glossary, TranslationCache, TranslationContext, fingerprint, normalize,
};

use crate::common;

struct Fixture {
    languages: LanguagePair,
    glossary: Glossary,
    blacklist: Blacklist,
}

impl Fixture {
    fn new() -> Self {
        Self {
            languages: LanguagePair::new("ko", "en"),
            glossary: Glossary::new(),
            blacklist: Blacklist::default(),
        }
    }

    fn ctx(&self) -> TranslationContext<'_> {
        TranslationContext {
            languages: &self.languages,
            target_locale: "eng",
            glossary: &self.glossary,
            blacklist: &self.blacklist,
        }
    }
}

#[test]
fn test_fingerprint_shouldBeStableHex() {
    let a = fingerprint(&normalize("  회사   소개 "), "eng");
    let b = fingerprint("회사 소개", "eng");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, fingerprint("회사 소개", "chn"));
}

#[test]
fn test_cache_file_shouldBePerLocaleJson() {
    let dir = common::create_temp_dir().unwrap();
    let mut cache = TranslationCache::load(dir.path(), "eng");
    cache.put(fingerprint("안녕", "eng"), "Hello");
    cache.save().unwrap();

    let raw = common::read(dir.path(), "eng.json");
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed[fingerprint("안녕", "eng")], "Hello");
    assert!(!dir.path().join("chn.json").exists());
}

#[test]
fn test_glossary_load_fromCsv_shouldApplyInFileOrder() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::write_file(
        dir.path(),
        "eng.csv",
        "# company terms\nSamsung Electronics,Samsung\n\"Samsung\",\"SEC\"\nbroken line\n",
    )
    .unwrap();

    let glossary = Glossary::load(&path).unwrap();
    assert_eq!(glossary.len(), 2);
    assert_eq!(glossary.apply("Samsung Electronics reported"), "SEC reported");
}

#[test]
fn test_glossary_load_withMissingFile_shouldBeEmpty() {
    let dir = common::create_temp_dir().unwrap();
    assert!(Glossary::load(&dir.path().join("none.csv")).unwrap().is_empty());
}

#[tokio::test]
async fn test_translate_texts_shouldPreserveOrderAndFillCache() {
    common::init_logging();
    let fixture = Fixture::new();
    let mock = MockProvider::working();
    let translator = BatchTranslator::new(Arc::new(mock.clone()), 2);
    let mut cache = TranslationCache::in_memory("eng");

    let outcome = translator.translate_texts(&["하나", "둘", "셋"], fixture.ctx(), &mut cache).await;

    assert_eq!(
        outcome.translations,
        vec!["[TRANSLATED to en] 하나", "[TRANSLATED to en] 둘", "[TRANSLATED to en] 셋"]
    );
    assert_eq!(outcome.provider_calls, 3);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get(&fingerprint("둘", "eng")), Some("[TRANSLATED to en] 둘"));
}

#[tokio::test]
async fn test_translate_texts_withWarmCache_shouldNotCallProvider() {
    let fixture = Fixture::new();
    let mock = MockProvider::working();
    let translator = BatchTranslator::new(Arc::new(mock.clone()), 1);
    let mut cache = TranslationCache::in_memory("eng");
    cache.put(fingerprint("하나", "eng"), "One");

    let outcome = translator.translate_texts(&[" 하나\n"], fixture.ctx(), &mut cache).await;

    assert_eq!(outcome.translations, vec!["One"]);
    assert_eq!(outcome.cache_hits, 1);
    assert_eq!(mock.total_calls(), 0);
}

#[tokio::test]
async fn test_translate_texts_shouldSendOriginalTextToProvider() {
    let fixture = Fixture::new();
    let mock = MockProvider::working();
    let translator = BatchTranslator::new(Arc::new(mock.clone()), 1);
    let mut cache = TranslationCache::in_memory("eng");

    let outcome = translator
        .translate_texts(&["\n첫 줄\n  둘째 줄\n", "첫 줄 둘째 줄"], fixture.ctx(), &mut cache)
        .await;

    // Both texts share a fingerprint; the first original goes out, trimmed
    assert_eq!(mock.requested_texts(), vec!["첫 줄\n  둘째 줄"]);
    assert_eq!(outcome.translations[0], "[TRANSLATED to en] 첫 줄\n  둘째 줄");
    assert_eq!(outcome.translations[1], outcome.translations[0]);
    assert!(cache.contains(&fingerprint("첫 줄 둘째 줄", "eng")));
}

#[tokio::test(start_paused = true)]
async fn test_translate_texts_withSlowProvider_shouldBoundConcurrency() {
    let fixture = Fixture::new();
    let texts = ["가", "나", "다", "라"];

    for (concurrency, expected_ms) in [(2, 200), (1, 400)] {
        let mock = MockProvider::slow(100).with_batch(BatchMode::Failing);
        let translator = BatchTranslator::new(Arc::new(mock.clone()), concurrency);
        let mut cache = TranslationCache::in_memory("eng");
        let start = tokio::time::Instant::now();

        let outcome = translator.translate_texts(&texts, fixture.ctx(), &mut cache).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(expected_ms));
        assert!(elapsed < Duration::from_millis(expected_ms + 100));
        assert_eq!(mock.single_calls(), 4);
        assert_eq!(
            outcome.translations,
            texts.iter().map(|t| format!("[TRANSLATED to en] {}", t)).collect::<Vec<_>>()
        );
    }
}

#[tokio::test]
async fn test_translate_texts_withBatchProvider_shouldMakeOneCall() {
    let fixture = Fixture::new();
    let mock = MockProvider::working().with_batch(BatchMode::Supported);
    let translator = BatchTranslator::new(Arc::new(mock.clone()), 1);
    let mut cache = TranslationCache::in_memory("eng");

    let outcome = translator.translate_texts(&["하나", "둘", "하나"], fixture.ctx(), &mut cache).await;

    assert_eq!(mock.batch_calls(), 1);
    assert_eq!(mock.single_calls(), 0);
    assert_eq!(mock.requested_texts(), vec!["하나", "둘"]);
    assert_eq!(outcome.translations[0], outcome.translations[2]);
}

#[tokio::test]
async fn test_translate_texts_withFailingBatch_shouldFallBackPerText() {
    let fixture = Fixture::new();
    let mock = MockProvider::working().with_batch(BatchMode::Failing);
    let translator = BatchTranslator::new(Arc::new(mock.clone()), 3);
    let mut cache = TranslationCache::in_memory("eng");

    let outcome = translator.translate_texts(&["하나", "둘"], fixture.ctx(), &mut cache).await;

    assert_eq!(mock.batch_calls(), 1);
    assert_eq!(mock.single_calls(), 2);
    assert_eq!(outcome.provider_calls, 3);
    assert_eq!(outcome.failures, 0);
    assert_eq!(outcome.translations, vec!["[TRANSLATED to en] 하나", "[TRANSLATED to en] 둘"]);
}

#[tokio::test]
async fn test_translate_texts_withFailingText_shouldKeepOriginalAndNotCache() {
    let fixture = Fixture::new();
    let mock = MockProvider::working().failing_on("둘");
    let translator = BatchTranslator::new(Arc::new(mock.clone()), 1);
    let mut cache = TranslationCache::in_memory("eng");

    let outcome = translator.translate_texts(&["하나", " 둘 "], fixture.ctx(), &mut cache).await;

    assert_eq!(outcome.translations, vec!["[TRANSLATED to en] 하나".to_string(), " 둘 ".to_string()]);
    assert_eq!(outcome.failures, 1);
    assert!(!cache.contains(&fingerprint("둘", "eng")));
}

#[tokio::test]
async fn test_translate_texts_shouldFilterBeforeCaching() {
    let mut fixture = Fixture::new();
    fixture.glossary.add_term("Hello", "Hi");
    fixture.blacklist = Blacklist::new(&["there".to_string()]).unwrap();

    let mock = MockProvider::working().with_custom_response(|_, _| "Hello there".to_string());
    let translator = BatchTranslator::new(Arc::new(mock), 1);
    let mut cache = TranslationCache::in_memory("eng");

    let outcome = translator.translate_texts(&["안녕"], fixture.ctx(), &mut cache).await;

    assert_eq!(outcome.translations, vec!["Hi"]);
    assert_eq!(cache.get(&fingerprint("안녕", "eng")), Some("Hi"));
}

#[tokio::test]
async fn test_translate_texts_acrossRuns_shouldReuseSavedCache() {
    let dir = common::create_temp_dir().unwrap();
    let fixture = Fixture::new();
    let mock = MockProvider::working();
    let translator = BatchTranslator::new(Arc::new(mock.clone()), 1);

    let mut cache = TranslationCache::load(dir.path(), "eng");
    let first = translator.translate_texts(&["하나", "둘"], fixture.ctx(), &mut cache).await;
    cache.save().unwrap();

    let mut reloaded = TranslationCache::load(dir.path(), "eng");
    let second = translator.translate_texts(&["하나", "둘"], fixture.ctx(), &mut reloaded).await;

    assert_eq!(first.translations, second.translations);
    assert_eq!(second.cache_hits, 2);
    assert_eq!(mock.total_calls(), 2);
}
