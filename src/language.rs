//! Language type: a registry-validated language handle.
//!
//! A `Language` can only be constructed for codes present in the locale
//! registry, so every downstream accessor can rely on the lookup succeeding.

use crate::error::I18nError;
use crate::registry::{Direction, Locale, LocaleRegistry};

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    /// English, the reference language all catalogs are validated against.
    pub const ENGLISH: Language = Language { code: "en" };

    /// Create a Language from a language code string.
    ///
    /// Fails with `UnsupportedLocale` if the code is not in the registry.
    pub fn from_code(code: &str) -> Result<Language, I18nError> {
        match LocaleRegistry::get().get_by_code(code) {
            Some(locale) => Ok(Language { code: locale.code }),
            None => Err(I18nError::UnsupportedLocale(code.to_string())),
        }
    }

    /// ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Full locale configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for a `Language` constructed through `from_code` or the constants.
    pub fn locale(&self) -> &'static Locale {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn direction(&self) -> Direction {
        self.locale().direction
    }

    pub fn is_rtl(&self) -> bool {
        self.locale().direction.is_rtl()
    }

    pub fn display_name(&self) -> &'static str {
        self.locale().display_name
    }

    pub fn native_name(&self) -> &'static str {
        self.locale().native_name
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_english() {
        let language = Language::from_code("en").expect("Should succeed");
        assert_eq!(language.code(), "en");
        assert_eq!(language.display_name(), "English");
        assert!(!language.is_rtl());
    }

    #[test]
    fn test_from_code_arabic() {
        let language = Language::from_code("ar").expect("Should succeed");
        assert_eq!(language.code(), "ar");
        assert_eq!(language.direction(), Direction::Rtl);
        assert!(language.is_rtl());
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("xx");
        assert_eq!(
            result.unwrap_err(),
            I18nError::UnsupportedLocale("xx".to_string())
        );
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_english_constant_matches_from_code() {
        assert_eq!(Language::ENGLISH, Language::from_code("en").unwrap());
    }

    #[test]
    fn test_language_is_copy() {
        let lang1 = Language::ENGLISH;
        let lang2 = lang1;
        assert_eq!(lang1, lang2);
    }

    #[test]
    fn test_locale_access() {
        let lang = Language::from_code("tr").unwrap();
        let locale = lang.locale();
        assert_eq!(locale.code, "tr");
        assert_eq!(locale.native_name, "Türkçe");
        assert_eq!(locale.currency_code, "TRY");
    }

    #[test]
    fn test_display() {
        assert_eq!(Language::from_code("he").unwrap().to_string(), "he");
    }
}
