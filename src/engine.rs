//! The engine facade: active-language state, key translation with
//! interpolation and plural suffixes, and wiring between the catalog,
//! formatter, directionality engine and validator.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::catalog::CatalogStore;
use crate::direction::DirectionalityEngine;
use crate::error::I18nError;
use crate::formatter::LocaleFormatter;
use crate::language::Language;
use crate::missing::MissingReport;
use crate::validator::{BundleValidator, ValidationReport};

/// State-store key under which the active language code is persisted.
pub const LANGUAGE_STATE_KEY: &str = "l10n.language";

/// Key/value persistence for UI state that survives restarts.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), I18nError>;
}

/// In-memory state store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), I18nError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// State store backed by one JSON object file.
///
/// Reads are forgiving (a missing or corrupt file is just empty state);
/// writes rewrite the whole file.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default()
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), I18nError> {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        let data = serde_json::to_string_pretty(&map).map_err(|e| I18nError::InvalidValue {
            kind: "state file",
            message: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| I18nError::InvalidValue {
                kind: "state file",
                message: e.to_string(),
            })?;
        }
        std::fs::write(&self.path, data).map_err(|e| I18nError::InvalidValue {
            kind: "state file",
            message: e.to_string(),
        })
    }
}

/// Per-call options for `translate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateOptions<'a> {
    /// Namespace to look in; defaults to `common`.
    pub namespace: Option<&'a str>,
    /// Rendered when the key resolves nowhere; defaults to the key itself.
    pub fallback: Option<&'a str>,
    /// Selects a plural variant and binds `{{count}}`.
    pub count: Option<i64>,
    /// Interpolation bindings for `{{name}}` tokens.
    pub args: &'a [(&'a str, &'a str)],
}

/// Facade over the whole localization stack for one UI session.
pub struct I18nEngine {
    catalog: Arc<CatalogStore>,
    formatter: LocaleFormatter,
    state: Arc<dyn StateStore>,
    validator: BundleValidator,
    reference: Language,
    active: Mutex<Language>,
}

impl I18nEngine {
    /// Build an engine, restoring the persisted language when there is one
    /// and it is still supported.
    pub fn new(
        catalog: Arc<CatalogStore>,
        state: Arc<dyn StateStore>,
        default_language: Language,
    ) -> Self {
        let active = state
            .get(LANGUAGE_STATE_KEY)
            .and_then(|code| match Language::from_code(&code) {
                Ok(language) => Some(language),
                Err(_) => {
                    warn!(%code, "Persisted language no longer supported, using default");
                    None
                }
            })
            .unwrap_or(default_language);

        Self {
            catalog,
            formatter: LocaleFormatter::new(active),
            state,
            validator: BundleValidator::default(),
            reference: Language::ENGLISH,
            active: Mutex::new(active),
        }
    }

    pub fn with_validator(mut self, validator: BundleValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn language(&self) -> Language {
        *self.active.lock().unwrap()
    }

    /// Switch the active language.
    ///
    /// An unsupported code fails without touching any state. On success the
    /// formatter follows and the choice is persisted; a persistence failure
    /// is logged but does not undo the in-memory switch.
    pub fn set_language(&self, code: &str) -> Result<Language, I18nError> {
        let language = match Language::from_code(code) {
            Ok(language) => language,
            Err(e) => {
                warn!(code, "Rejected language switch");
                return Err(e);
            }
        };

        *self.active.lock().unwrap() = language;
        self.formatter.set_language(language);
        if let Err(e) = self.state.set(LANGUAGE_STATE_KEY, code) {
            warn!(error = %e, "Failed to persist language selection");
        }
        info!(code, "Switched active language");
        Ok(language)
    }

    /// Load every namespace of the active language into the catalog.
    pub async fn load_active(&self) -> Result<(), I18nError> {
        let language = self.language();
        self.catalog.load_language(language.code()).await?;
        Ok(())
    }

    /// Resolve a key in the active language with English fallback.
    ///
    /// With a count, the plural variant `{key}.{category}` is preferred and
    /// `{{count}}` becomes available for interpolation. A key that resolves
    /// nowhere renders as the fallback string, or the key itself.
    pub fn translate(&self, key: &str, options: &TranslateOptions<'_>) -> String {
        let language = self.language();
        let namespace = options.namespace.unwrap_or("common");
        let fallback_language = self.reference.code();

        let resolved = match options.count {
            Some(count) => {
                let category = self.formatter.plural_form(count);
                let plural_key = format!("{key}.{}", category.as_str());
                // The plural variant is tried quietly so a full miss is
                // tracked once, under the base key.
                self.catalog
                    .peek(
                        language.code(),
                        namespace,
                        &plural_key,
                        Some(fallback_language),
                    )
                    .or_else(|| {
                        self.catalog
                            .get(language.code(), namespace, key, Some(fallback_language))
                    })
            }
            None => self
                .catalog
                .get(language.code(), namespace, key, Some(fallback_language)),
        };

        let template = match resolved {
            Some(template) => template,
            None => options.fallback.unwrap_or(key).to_string(),
        };

        let mut rendered = template;
        if let Some(count) = options.count {
            rendered = rendered.replace("{{count}}", &count.to_string());
        }
        for (name, value) in options.args {
            rendered = rendered.replace(&format!("{{{{{name}}}}}"), value);
        }
        rendered
    }

    /// Layout helper for the active language's direction.
    pub fn direction(&self) -> DirectionalityEngine {
        DirectionalityEngine::new(self.language().is_rtl())
    }

    pub fn formatter(&self) -> &LocaleFormatter {
        &self.formatter
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Validate a language's cached bundles against the reference language.
    pub fn validate(&self, language: &str) -> ValidationReport {
        self.catalog
            .validate(language, self.reference.code(), &self.validator)
    }

    pub fn missing_report(&self) -> MissingReport {
        self.catalog.missing_report()
    }

    pub fn submit_missing(&self) -> MissingReport {
        self.catalog.submit_missing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use serde_json::json;

    use crate::catalog::BundleSource;
    use crate::registry::Direction;
    use crate::validator::IssueKind;

    struct NullSource;

    impl BundleSource for NullSource {
        fn fetch(
            &self,
            language: &str,
            namespace: &str,
        ) -> BoxFuture<'static, Result<serde_json::Value, I18nError>> {
            let err = I18nError::load_failure(language, namespace, "no source in tests");
            async move { Err(err) }.boxed()
        }
    }

    fn seeded_engine() -> I18nEngine {
        let catalog = Arc::new(CatalogStore::new(Arc::new(NullSource)));
        catalog
            .import_all(&json!({
                "en": {
                    "common": {
                        "save": "Save",
                        "greeting": "Hello, {{name}}!",
                        "items": {
                            "one": "{{count}} item",
                            "other": "{{count}} items"
                        },
                        "english_only": "Only in English"
                    }
                },
                "tr": {
                    "common": {
                        "save": "Kaydet",
                        "greeting": "Merhaba, {{name}}!"
                    }
                },
                "ar": {
                    "common": {
                        "save": "حفظ"
                    }
                }
            }))
            .unwrap();
        I18nEngine::new(catalog, Arc::new(MemoryStateStore::new()), Language::ENGLISH)
    }

    #[test]
    fn test_translate_basic() {
        let engine = seeded_engine();
        assert_eq!(
            engine.translate("save", &TranslateOptions::default()),
            "Save"
        );
    }

    #[test]
    fn test_translate_interpolation() {
        let engine = seeded_engine();
        let rendered = engine.translate(
            "greeting",
            &TranslateOptions {
                args: &[("name", "Ada")],
                ..Default::default()
            },
        );
        assert_eq!(rendered, "Hello, Ada!");
    }

    #[test]
    fn test_translate_plural_variants() {
        let engine = seeded_engine();
        let one = engine.translate(
            "items",
            &TranslateOptions {
                count: Some(1),
                ..Default::default()
            },
        );
        let many = engine.translate(
            "items",
            &TranslateOptions {
                count: Some(5),
                ..Default::default()
            },
        );
        assert_eq!(one, "1 item");
        assert_eq!(many, "5 items");
    }

    #[test]
    fn test_translate_unresolved_plural_records_one_miss_under_base_key() {
        let engine = seeded_engine();
        let rendered = engine.translate(
            "no.such.counter",
            &TranslateOptions {
                count: Some(3),
                ..Default::default()
            },
        );
        assert_eq!(rendered, "no.such.counter");

        let report = engine.missing_report();
        assert_eq!(report.total(), 1);
        assert_eq!(report.entries[0].key, "no.such.counter");
    }

    #[test]
    fn test_translate_resolved_plural_records_no_miss() {
        let engine = seeded_engine();
        engine.translate(
            "items",
            &TranslateOptions {
                count: Some(5),
                ..Default::default()
            },
        );
        assert_eq!(engine.missing_report().total(), 0);
    }

    #[test]
    fn test_translate_falls_back_to_reference_language() {
        let engine = seeded_engine();
        engine.set_language("tr").unwrap();
        assert_eq!(
            engine.translate("save", &TranslateOptions::default()),
            "Kaydet"
        );
        assert_eq!(
            engine.translate("english_only", &TranslateOptions::default()),
            "Only in English"
        );
    }

    #[test]
    fn test_translate_unresolved_key_renders_fallback_string() {
        let engine = seeded_engine();
        assert_eq!(
            engine.translate("no.such.key", &TranslateOptions::default()),
            "no.such.key"
        );
        assert_eq!(
            engine.translate(
                "no.such.key",
                &TranslateOptions {
                    fallback: Some("placeholder"),
                    ..Default::default()
                }
            ),
            "placeholder"
        );
        // Both misses were recorded.
        assert_eq!(engine.missing_report().total(), 2);
    }

    #[test]
    fn test_set_language_updates_formatter_and_direction() {
        let engine = seeded_engine();
        engine.set_language("ar").unwrap();
        assert_eq!(engine.language().code(), "ar");
        assert_eq!(engine.formatter().language().code(), "ar");
        assert!(engine.direction().is_rtl());
        assert_eq!(engine.language().direction(), Direction::Rtl);
    }

    #[test]
    fn test_set_language_rejects_unsupported_without_side_effects() {
        let engine = seeded_engine();
        let before = engine.language();
        let err = engine.set_language("xx").unwrap_err();
        assert_eq!(err, I18nError::UnsupportedLocale("xx".to_string()));
        assert_eq!(engine.language(), before);
        assert_eq!(engine.formatter().language(), before);
    }

    #[test]
    fn test_language_persists_across_engines() {
        let state = Arc::new(MemoryStateStore::new());
        let catalog = Arc::new(CatalogStore::new(Arc::new(NullSource)));
        let engine = I18nEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&state) as Arc<dyn StateStore>,
            Language::ENGLISH,
        );
        engine.set_language("tr").unwrap();
        drop(engine);

        let restored = I18nEngine::new(catalog, state, Language::ENGLISH);
        assert_eq!(restored.language().code(), "tr");
    }

    #[test]
    fn test_corrupt_persisted_language_falls_back_to_default() {
        let state = Arc::new(MemoryStateStore::new());
        state.set(LANGUAGE_STATE_KEY, "zz").unwrap();
        let catalog = Arc::new(CatalogStore::new(Arc::new(NullSource)));
        let engine = I18nEngine::new(catalog, state, Language::ENGLISH);
        assert_eq!(engine.language(), Language::ENGLISH);
    }

    #[test]
    fn test_validate_wiring() {
        let engine = seeded_engine();
        let report = engine.validate("tr");
        assert!(!report.valid);
        assert!(report.count(IssueKind::Missing) >= 1);
        assert_eq!(report.reference_language, "en");
    }

    #[test]
    fn test_file_state_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStateStore::new(&path);

        assert_eq!(store.get(LANGUAGE_STATE_KEY), None);
        store.set(LANGUAGE_STATE_KEY, "ar").unwrap();
        store.set("theme", "dark").unwrap();

        let reopened = FileStateStore::new(&path);
        assert_eq!(reopened.get(LANGUAGE_STATE_KEY), Some("ar".to_string()));
        assert_eq!(reopened.get("theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_file_state_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStateStore::new(&path);
        assert_eq!(store.get(LANGUAGE_STATE_KEY), None);
        // Writing replaces the corrupt file.
        store.set(LANGUAGE_STATE_KEY, "de").unwrap();
        assert_eq!(store.get(LANGUAGE_STATE_KEY), Some("de".to_string()));
    }
}
