use thiserror::Error;

/// Error taxonomy for the localization engine.
///
/// Nothing in this crate is fatal to the process: formatter input problems
/// degrade to empty output, validation findings are collected into reports,
/// and load/flush failures are surfaced to the caller which owns the retry
/// policy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum I18nError {
    /// A translation bundle could not be fetched from the bundle source.
    #[error("failed to load bundle {language}/{namespace}: {message}")]
    LoadFailure {
        language: String,
        namespace: String,
        message: String,
    },

    /// The requested locale code is not present in the registry.
    #[error("unsupported locale: '{0}'")]
    UnsupportedLocale(String),

    /// A formatter or parser received input it could not make sense of.
    #[error("invalid {kind} value: {message}")]
    InvalidValue { kind: &'static str, message: String },

    /// A batched persistence write failed; the affected updates have been
    /// re-queued and the dirty flag is still set.
    #[error("failed to flush {count} pending update(s): {message}")]
    FlushFailure { count: usize, message: String },

    /// The machine-translation collaborator failed or returned an
    /// unusable response.
    #[error("machine translation failed: {0}")]
    TranslationFailure(String),
}

impl I18nError {
    pub fn load_failure(
        language: impl Into<String>,
        namespace: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::LoadFailure {
            language: language.into(),
            namespace: namespace.into(),
            message: message.into(),
        }
    }
}
