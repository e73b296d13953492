//! Localization engine for multi-language applications.
//!
//! This crate provides a centralized architecture for the whole
//! localization stack: locale metadata, locale-aware formatting, RTL
//! layout support, catalog loading, translation quality validation and an
//! editing workflow for database-backed content.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported locales and their metadata
//! - `language`: Type-safe Language handle validated against the registry
//! - `formatter`: Locale-aware dates, numbers, currencies, lists and plurals
//! - `direction`: RTL/LTR layout transforms
//! - `catalog`: Async bundle store with request deduplication
//! - `validator`: Cross-language catalog validation
//! - `missing`: Missing-translation tracking
//! - `dynamic`: Per-entity translation editing with debounced autosave
//! - `engine`: Facade tying the pieces together for one UI session
//!
//! # Example
//!
//! ```rust,ignore
//! use l10n_engine::{CatalogStore, HttpBundleSource, I18nEngine, Language, MemoryStateStore};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(CatalogStore::new(Arc::new(HttpBundleSource::new(
//!     "https://cdn.example.com",
//! ))));
//! let engine = I18nEngine::new(catalog, Arc::new(MemoryStateStore::new()), Language::ENGLISH);
//! engine.load_active().await?;
//! let title = engine.translate("dashboard.title", &Default::default());
//! ```

pub mod bundle;
pub mod catalog;
pub mod config;
pub mod direction;
pub mod dynamic;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod language;
pub mod missing;
pub mod plural;
pub mod registry;
pub mod retry;
pub mod validator;

pub use bundle::TranslationBundle;
pub use catalog::{BundleSource, CatalogStore, HttpBundleSource, DEFAULT_NAMESPACES};
pub use config::Config;
pub use direction::{DirectionalityEngine, PhysicalStyle, Side, SideValues, TextAlign};
pub use dynamic::{
    ContentPersistence, DynamicContentTranslator, FieldTranslation, HttpContentApi,
    HttpMachineTranslator, MachineTranslator, TranslatorOptions,
};
pub use engine::{
    FileStateStore, I18nEngine, MemoryStateStore, StateStore, TranslateOptions,
    LANGUAGE_STATE_KEY,
};
pub use error::I18nError;
pub use formatter::{DateStyle, DurationUnit, ListStyle, ListType, LocaleFormatter};
pub use language::Language;
pub use missing::{MissingReport, MissingTracker, MissingTranslationRecord};
pub use plural::PluralCategory;
pub use registry::{Direction, Locale, LocaleRegistry};
pub use validator::{BundleValidator, IssueKind, ValidationIssue, ValidationReport};

/// Install the default tracing subscriber, honoring `RUST_LOG`.
///
/// Intended for binaries and examples embedding the engine; libraries and
/// tests should leave subscriber setup to their host.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
