//! Locale registry: single source of truth for all supported locales.
//!
//! The registry is a static table initialized once behind an `OnceLock`.
//! Every locale carries its writing direction and the date/number/currency
//! conventions the formatter and directionality engine derive from.

use std::sync::OnceLock;

/// Writing direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Direction::Rtl)
    }
}

/// Configuration for a supported locale.
///
/// Immutable, defined at process start. The formatter never invents
/// conventions of its own; everything locale-sensitive comes from here.
#[derive(Debug, Clone)]
pub struct Locale {
    /// ISO 639-1 language code (e.g., "en", "ar")
    pub code: &'static str,

    /// English name of the language (e.g., "Arabic")
    pub display_name: &'static str,

    /// Native name of the language (e.g., "العربية")
    pub native_name: &'static str,

    /// Writing direction
    pub direction: Direction,

    /// Full BCP 47 tag (e.g., "ar-SA")
    pub locale_tag: &'static str,

    /// ISO 4217 currency code used when none is supplied to `format_currency`
    pub currency_code: &'static str,

    /// Currency symbol for the default currency
    pub currency_symbol: &'static str,

    /// Whether the currency symbol precedes the amount
    pub currency_prefix: bool,

    /// chrono pattern for the `medium` date preset
    pub date_format: &'static str,

    /// chrono pattern for the `medium` time preset
    pub time_format: &'static str,

    /// Decimal separator (e.g., '.' for en, ',' for de)
    pub decimal_separator: char,

    /// Digit group separator (e.g., ',' for en, '.' for de)
    pub group_separator: char,

    /// Default fraction digits for numbers and currency
    pub precision: usize,
}

/// Global locale registry.
///
/// Pure lookups only: no side effects, and "not found" is `None`/`false`,
/// never an error.
pub struct LocaleRegistry {
    locales: Vec<Locale>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global registry instance, initializing it on first access.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: supported_locales(),
        })
    }

    /// Look up a locale by its language code.
    pub fn get_by_code(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// All supported locales, in registry order.
    pub fn list_all(&self) -> &[Locale] {
        &self.locales
    }

    /// Whether a language code is present in the registry.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// Whether a language code names a right-to-left locale.
    /// Unknown codes are treated as LTR.
    pub fn is_rtl(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|locale| locale.direction.is_rtl())
            .unwrap_or(false)
    }
}

fn supported_locales() -> Vec<Locale> {
    vec![
        Locale {
            code: "en",
            display_name: "English",
            native_name: "English",
            direction: Direction::Ltr,
            locale_tag: "en-US",
            currency_code: "USD",
            currency_symbol: "$",
            currency_prefix: true,
            date_format: "%b %-d, %Y",
            time_format: "%-I:%M %p",
            decimal_separator: '.',
            group_separator: ',',
            precision: 2,
        },
        Locale {
            code: "es",
            display_name: "Spanish",
            native_name: "Español",
            direction: Direction::Ltr,
            locale_tag: "es-ES",
            currency_code: "EUR",
            currency_symbol: "€",
            currency_prefix: false,
            date_format: "%-d %b %Y",
            time_format: "%H:%M",
            decimal_separator: ',',
            group_separator: '.',
            precision: 2,
        },
        Locale {
            code: "fr",
            display_name: "French",
            native_name: "Français",
            direction: Direction::Ltr,
            locale_tag: "fr-FR",
            currency_code: "EUR",
            currency_symbol: "€",
            currency_prefix: false,
            date_format: "%-d %b %Y",
            time_format: "%H:%M",
            decimal_separator: ',',
            group_separator: ' ',
            precision: 2,
        },
        Locale {
            code: "de",
            display_name: "German",
            native_name: "Deutsch",
            direction: Direction::Ltr,
            locale_tag: "de-DE",
            currency_code: "EUR",
            currency_symbol: "€",
            currency_prefix: false,
            date_format: "%d.%m.%Y",
            time_format: "%H:%M",
            decimal_separator: ',',
            group_separator: '.',
            precision: 2,
        },
        Locale {
            code: "ar",
            display_name: "Arabic",
            native_name: "العربية",
            direction: Direction::Rtl,
            locale_tag: "ar-SA",
            currency_code: "SAR",
            currency_symbol: "ر.س",
            currency_prefix: false,
            date_format: "%d/%m/%Y",
            time_format: "%H:%M",
            decimal_separator: '.',
            group_separator: ',',
            precision: 2,
        },
        Locale {
            code: "he",
            display_name: "Hebrew",
            native_name: "עברית",
            direction: Direction::Rtl,
            locale_tag: "he-IL",
            currency_code: "ILS",
            currency_symbol: "₪",
            currency_prefix: false,
            date_format: "%d.%m.%Y",
            time_format: "%H:%M",
            decimal_separator: '.',
            group_separator: ',',
            precision: 2,
        },
        Locale {
            code: "tr",
            display_name: "Turkish",
            native_name: "Türkçe",
            direction: Direction::Ltr,
            locale_tag: "tr-TR",
            currency_code: "TRY",
            currency_symbol: "₺",
            currency_prefix: false,
            date_format: "%d.%m.%Y",
            time_format: "%H:%M",
            decimal_separator: ',',
            group_separator: '.',
            precision: 2,
        },
        Locale {
            code: "ru",
            display_name: "Russian",
            native_name: "Русский",
            direction: Direction::Ltr,
            locale_tag: "ru-RU",
            currency_code: "RUB",
            currency_symbol: "₽",
            currency_prefix: false,
            date_format: "%d.%m.%Y",
            time_format: "%H:%M",
            decimal_separator: ',',
            group_separator: ' ',
            precision: 2,
        },
        Locale {
            code: "zh",
            display_name: "Chinese",
            native_name: "中文",
            direction: Direction::Ltr,
            locale_tag: "zh-CN",
            currency_code: "CNY",
            currency_symbol: "¥",
            currency_prefix: true,
            date_format: "%Y年%m月%d日",
            time_format: "%H:%M",
            decimal_separator: '.',
            group_separator: ',',
            precision: 2,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LocaleRegistry::get();
        let registry2 = LocaleRegistry::get();
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_english() {
        let locale = LocaleRegistry::get().get_by_code("en").unwrap();
        assert_eq!(locale.code, "en");
        assert_eq!(locale.display_name, "English");
        assert_eq!(locale.locale_tag, "en-US");
        assert_eq!(locale.currency_code, "USD");
        assert_eq!(locale.direction, Direction::Ltr);
    }

    #[test]
    fn test_get_by_code_arabic_is_rtl() {
        let locale = LocaleRegistry::get().get_by_code("ar").unwrap();
        assert_eq!(locale.direction, Direction::Rtl);
        assert_eq!(locale.native_name, "العربية");
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LocaleRegistry::get().get_by_code("xx").is_none());
    }

    #[test]
    fn test_list_all_has_unique_codes() {
        let all = LocaleRegistry::get().list_all();
        let mut codes: Vec<_> = all.iter().map(|locale| locale.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_is_supported() {
        let registry = LocaleRegistry::get();
        assert!(registry.is_supported("en"));
        assert!(registry.is_supported("tr"));
        assert!(!registry.is_supported("xx"));
        assert!(!registry.is_supported(""));
    }

    #[test]
    fn test_is_rtl() {
        let registry = LocaleRegistry::get();
        assert!(registry.is_rtl("ar"));
        assert!(registry.is_rtl("he"));
        assert!(!registry.is_rtl("en"));
        // Unknown codes default to LTR rather than erroring.
        assert!(!registry.is_rtl("xx"));
    }

    #[test]
    fn test_direction_as_str() {
        assert_eq!(Direction::Ltr.as_str(), "ltr");
        assert_eq!(Direction::Rtl.as_str(), "rtl");
    }

    #[test]
    fn test_separator_conventions_differ() {
        let registry = LocaleRegistry::get();
        let en = registry.get_by_code("en").unwrap();
        let de = registry.get_by_code("de").unwrap();
        assert_eq!(en.decimal_separator, '.');
        assert_eq!(en.group_separator, ',');
        assert_eq!(de.decimal_separator, ',');
        assert_eq!(de.group_separator, '.');
    }
}
