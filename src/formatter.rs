//! Locale-sensitive formatting bound to the currently active language.
//!
//! All operations are synchronous and infallible: unparseable input yields
//! an empty string and a log line, never an error. Derived formatting state
//! (resolved date patterns, number specs) is cached per
//! `(kind, serialized options)` and the whole cache is dropped on language
//! change, since every cached entry is locale-bound.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use crate::language::Language;
use crate::plural::{self, PluralCategory};

/// Date/time rendering style: a named preset or an explicit chrono pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStyle {
    Short,
    Medium,
    Long,
    Full,
    /// Render as a relative phrase against the current time.
    Relative,
    Pattern(String),
}

impl DateStyle {
    fn cache_key(&self) -> String {
        match self {
            DateStyle::Short => "short".to_string(),
            DateStyle::Medium => "medium".to_string(),
            DateStyle::Long => "long".to_string(),
            DateStyle::Full => "full".to_string(),
            DateStyle::Relative => "relative".to_string(),
            DateStyle::Pattern(p) => format!("pattern:{p}"),
        }
    }
}

/// Conjunction ("A, B, and C") or disjunction ("A, B, or C") list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Conjunction,
    Disjunction,
}

/// Full rendering with a connective word, or a bare comma join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Long,
    Narrow,
}

/// Units accepted by `format_duration`, largest first.
///
/// The seconds table is a deliberate approximation: fixed 365-day years and
/// 30-day months, no calendar awareness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DurationUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl DurationUnit {
    fn seconds(&self) -> u64 {
        match self {
            DurationUnit::Year => 31_536_000,
            DurationUnit::Month => 2_592_000,
            DurationUnit::Week => 604_800,
            DurationUnit::Day => 86_400,
            DurationUnit::Hour => 3_600,
            DurationUnit::Minute => 60,
            DurationUnit::Second => 1,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DurationUnit::Year => "year",
            DurationUnit::Month => "month",
            DurationUnit::Week => "week",
            DurationUnit::Day => "day",
            DurationUnit::Hour => "hour",
            DurationUnit::Minute => "minute",
            DurationUnit::Second => "second",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FormatterKind {
    Date,
    Time,
    DateTime,
    Number,
}

#[derive(Clone)]
enum Compiled {
    Pattern(String),
    Number(NumberSpec),
}

#[derive(Debug, Clone, Copy)]
struct NumberSpec {
    decimal: char,
    group: char,
    precision: usize,
}

struct FormatterInner {
    language: Language,
    cache: HashMap<(FormatterKind, String), Compiled>,
}

/// Stateful formatter facade.
///
/// Holds the active language and the formatter cache behind a mutex so the
/// engine can share one instance across call sites.
pub struct LocaleFormatter {
    inner: Mutex<FormatterInner>,
}

impl LocaleFormatter {
    pub fn new(language: Language) -> Self {
        Self {
            inner: Mutex::new(FormatterInner {
                language,
                cache: HashMap::new(),
            }),
        }
    }

    /// The currently active language.
    pub fn language(&self) -> Language {
        self.inner.lock().unwrap().language
    }

    /// Switch the active language, dropping every cached formatter.
    ///
    /// The clear is deliberately unscoped: cached entries for locales not
    /// involved in the switch are discarded too, matching the simple
    /// clear-all policy the cache was designed with.
    pub fn set_language(&self, language: Language) {
        let mut inner = self.inner.lock().unwrap();
        if inner.language != language {
            inner.language = language;
            inner.cache.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_entry_count(&self) -> usize {
        self.inner.lock().unwrap().cache.len()
    }

    fn with_compiled<F, B>(&self, kind: FormatterKind, key: String, build: B, use_it: F) -> String
    where
        B: FnOnce(&Language) -> Compiled,
        F: FnOnce(&Compiled, Language) -> String,
    {
        let mut inner = self.inner.lock().unwrap();
        let language = inner.language;
        let compiled = inner
            .cache
            .entry((kind, key))
            .or_insert_with(|| build(&language))
            .clone();
        drop(inner);
        use_it(&compiled, language)
    }

    // ==================== Dates ====================

    /// Format a date according to the active locale.
    pub fn format_date(&self, date: &DateTime<Utc>, style: &DateStyle) -> String {
        if matches!(style, DateStyle::Relative) {
            return self.format_relative_time(date, None);
        }
        self.with_compiled(
            FormatterKind::Date,
            style.cache_key(),
            |language| Compiled::Pattern(date_pattern(language.code(), style)),
            |compiled, _| match compiled {
                Compiled::Pattern(p) => date.format(p).to_string(),
                _ => String::new(),
            },
        )
    }

    /// Format a time of day according to the active locale.
    pub fn format_time(&self, date: &DateTime<Utc>, style: &DateStyle) -> String {
        if matches!(style, DateStyle::Relative) {
            return self.format_relative_time(date, None);
        }
        self.with_compiled(
            FormatterKind::Time,
            style.cache_key(),
            |language| Compiled::Pattern(time_pattern(language.locale().time_format, style)),
            |compiled, _| match compiled {
                Compiled::Pattern(p) => date.format(p).to_string(),
                _ => String::new(),
            },
        )
    }

    /// Format date and time together.
    pub fn format_date_time(&self, date: &DateTime<Utc>, style: &DateStyle) -> String {
        if matches!(style, DateStyle::Relative) {
            return self.format_relative_time(date, None);
        }
        if let DateStyle::Pattern(p) = style {
            return date.format(p).to_string();
        }
        self.with_compiled(
            FormatterKind::DateTime,
            style.cache_key(),
            |language| {
                Compiled::Pattern(format!(
                    "{}, {}",
                    date_pattern(language.code(), style),
                    time_pattern(language.locale().time_format, style)
                ))
            },
            |compiled, _| match compiled {
                Compiled::Pattern(p) => date.format(p).to_string(),
                _ => String::new(),
            },
        )
    }

    /// Parse-and-format entry point for string-typed date input.
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD`.
    /// Unparseable input yields an empty string.
    pub fn format_date_str(&self, value: &str, style: &DateStyle) -> String {
        match parse_date_input(value) {
            Some(date) => self.format_date(&date, style),
            None => {
                warn!("unparseable date input: {value:?}");
                String::new()
            }
        }
    }

    /// Render a relative phrase like "3 days ago" or "in 2 hours".
    ///
    /// Walks seconds, minutes, hours, days, weeks, months, years and picks
    /// the first unit whose scaled magnitude is below 60 (weeks, months and
    /// years use the fixed 7/30/365-day approximations). A zero difference
    /// renders as the locale's "just now".
    pub fn format_relative_time(
        &self,
        date: &DateTime<Utc>,
        base: Option<DateTime<Utc>>,
    ) -> String {
        let base = base.unwrap_or_else(Utc::now);
        let diff = (*date - base).num_seconds();
        let labels = relative_labels(self.language().code());

        if diff == 0 {
            return labels.just_now.to_string();
        }

        const UNIT_SECONDS: [i64; 7] = [1, 60, 3_600, 86_400, 604_800, 2_592_000, 31_536_000];
        let mut index = UNIT_SECONDS.len() - 1;
        for (i, secs) in UNIT_SECONDS.iter().enumerate() {
            if (diff / secs).abs() < 60 {
                index = i;
                break;
            }
        }

        let n = (diff / UNIT_SECONDS[index]).abs();
        if n == 0 {
            return labels.just_now.to_string();
        }
        let (singular, plural_label) = labels.units[index];
        let unit = if n == 1 { singular } else { plural_label };
        let template = if diff < 0 { labels.past } else { labels.future };
        template
            .replace("{n}", &n.to_string())
            .replace("{unit}", unit)
    }

    // ==================== Numbers ====================

    /// Format a number with the locale's grouping and decimal conventions.
    pub fn format_number(&self, value: f64, precision: Option<usize>) -> String {
        if !value.is_finite() {
            warn!("non-finite number input: {value}");
            return String::new();
        }
        self.with_compiled(
            FormatterKind::Number,
            format!("number:p={precision:?}"),
            |language| {
                let locale = language.locale();
                Compiled::Number(NumberSpec {
                    decimal: locale.decimal_separator,
                    group: locale.group_separator,
                    precision: precision.unwrap_or(locale.precision),
                })
            },
            |compiled, _| match compiled {
                Compiled::Number(spec) => render_number(value, spec),
                _ => String::new(),
            },
        )
    }

    /// Format a monetary amount. Falls back to the active locale's
    /// configured currency when no code is supplied.
    pub fn format_currency(&self, value: f64, currency: Option<&str>) -> String {
        if !value.is_finite() {
            warn!("non-finite currency input: {value}");
            return String::new();
        }
        let language = self.language();
        let locale = language.locale();
        let code = currency.unwrap_or(locale.currency_code);
        let symbol = if code == locale.currency_code {
            locale.currency_symbol
        } else {
            currency_symbol(code)
        };
        let amount = self.format_number(value, Some(locale.precision));
        if locale.currency_prefix {
            format!("{symbol}{amount}")
        } else {
            format!("{amount} {symbol}")
        }
    }

    /// Format a ratio as a percentage: `0.42` renders as `42%`.
    pub fn format_percent(&self, ratio: f64, precision: Option<usize>) -> String {
        if !ratio.is_finite() {
            warn!("non-finite percent input: {ratio}");
            return String::new();
        }
        let amount = self.format_number(ratio * 100.0, Some(precision.unwrap_or(0)));
        format!("{amount}%")
    }

    /// Inverse of `format_number`.
    ///
    /// The active locale's separators are determined by formatting a known
    /// sample value and inspecting its parts, then group separators are
    /// stripped and the decimal separator normalized before parsing.
    pub fn parse_number(&self, input: &str) -> Option<f64> {
        let sample = self.format_number(1234.5, Some(1));
        let mut chars = sample.chars();
        let group = chars.nth(1)?;
        let decimal = sample.chars().rev().nth(1)?;

        let normalized: String = input
            .trim()
            .chars()
            .filter(|c| *c != group)
            .map(|c| if c == decimal { '.' } else { c })
            .collect();

        match normalized.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("unparseable localized number: {input:?}");
                None
            }
        }
    }

    // ==================== Lists ====================

    /// Render a natural-language list: `["A", "B", "C"]` becomes
    /// "A, B, and C" under the English conjunction rules.
    pub fn format_list(&self, items: &[&str], list_type: ListType, style: ListStyle) -> String {
        match items {
            [] => String::new(),
            [only] => (*only).to_string(),
            _ => {
                if style == ListStyle::Narrow {
                    return items.join(", ");
                }
                let code = self.language().code();
                let word = connective(code, list_type);
                let (head, last) = items.split_at(items.len() - 1);
                // English keeps the Oxford comma for three or more items.
                let sep = if code == "en" && items.len() > 2 {
                    format!(", {word} ")
                } else {
                    format!(" {word} ")
                };
                format!("{}{}{}", head.join(", "), sep, last[0])
            }
        }
    }

    // ==================== Plurals ====================

    /// The locale's plural category for a count, used as a key suffix.
    pub fn plural_form(&self, count: i64) -> PluralCategory {
        plural::plural_form(self.language().code(), count)
    }

    /// The category set the active locale can produce.
    pub fn plural_categories(&self) -> &'static [PluralCategory] {
        plural::categories(self.language().code())
    }

    // ==================== Sizes and durations ====================

    /// Human-readable byte size with a 1024 divisor. Zero renders as
    /// "0 Bytes" exactly; trailing fraction zeros are trimmed.
    pub fn format_file_size(&self, bytes: u64, decimals: usize) -> String {
        const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
        if bytes == 0 {
            return "0 Bytes".to_string();
        }
        let exponent = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
        let exponent = exponent.min(UNITS.len() - 1);
        let scaled = bytes as f64 / 1024_f64.powi(exponent as i32);

        let mut rendered = format!("{scaled:.decimals$}");
        if rendered.contains('.') {
            rendered = rendered.trim_end_matches('0').trim_end_matches('.').to_string();
        }
        let decimal = self.language().locale().decimal_separator;
        if decimal != '.' {
            rendered = rendered.replace('.', &decimal.to_string());
        }
        format!("{rendered} {}", UNITS[exponent])
    }

    /// Greedy decomposition of a seconds value into the requested units,
    /// consuming the largest unit first and emitting only non-zero
    /// components. An empty decomposition renders as "0 seconds".
    pub fn format_duration(&self, seconds: u64, units: &[DurationUnit]) -> String {
        let mut requested: Vec<DurationUnit> = units.to_vec();
        requested.sort_unstable();
        requested.dedup();

        let mut remaining = seconds;
        let mut parts = Vec::new();
        for unit in requested {
            let count = remaining / unit.seconds();
            remaining %= unit.seconds();
            if count > 0 {
                let label = unit.label();
                if count == 1 {
                    parts.push(format!("1 {label}"));
                } else {
                    parts.push(format!("{count} {label}s"));
                }
            }
        }

        if parts.is_empty() {
            "0 seconds".to_string()
        } else {
            parts.join(", ")
        }
    }
}

// ==================== Locale tables ====================

fn date_pattern(code: &str, style: &DateStyle) -> String {
    if let DateStyle::Pattern(p) = style {
        return p.clone();
    }
    let locale = crate::registry::LocaleRegistry::get()
        .get_by_code(code)
        .expect("formatter language is registry-validated");
    match style {
        DateStyle::Short => match code {
            "en" => "%-m/%-d/%y",
            "zh" => "%y/%-m/%-d",
            "es" | "fr" | "ar" => "%d/%m/%y",
            _ => "%d.%m.%y",
        }
        .to_string(),
        DateStyle::Medium => locale.date_format.to_string(),
        DateStyle::Long => match code {
            "en" => "%B %-d, %Y",
            "zh" => "%Y年%m月%d日",
            _ => "%-d %B %Y",
        }
        .to_string(),
        DateStyle::Full => match code {
            "en" => "%A, %B %-d, %Y",
            "zh" => "%Y年%m月%d日 %A",
            _ => "%A %-d %B %Y",
        }
        .to_string(),
        DateStyle::Relative | DateStyle::Pattern(_) => unreachable!("handled by callers"),
    }
}

fn time_pattern(base: &str, style: &DateStyle) -> String {
    match style {
        DateStyle::Pattern(p) => p.clone(),
        DateStyle::Long | DateStyle::Full => {
            // Append seconds to the locale's minute-precision pattern.
            if base.contains("%p") || base.contains("%P") {
                base.replace(":%M", ":%M:%S")
            } else {
                format!("{base}:%S")
            }
        }
        _ => base.to_string(),
    }
}

fn render_number(value: f64, spec: &NumberSpec) -> String {
    let formatted = format!("{:.*}", spec.precision, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(spec.group);
        }
        grouped.push(*c);
    }

    let mut out = String::new();
    if value.is_sign_negative() && value != 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(spec.decimal);
        out.push_str(frac);
    }
    out
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "TRY" => "₺",
        "SAR" => "ر.س",
        "ILS" => "₪",
        "RUB" => "₽",
        other => other,
    }
}

fn connective(code: &str, list_type: ListType) -> &'static str {
    match (code, list_type) {
        ("es", ListType::Conjunction) => "y",
        ("es", ListType::Disjunction) => "o",
        ("fr", ListType::Conjunction) => "et",
        ("fr", ListType::Disjunction) => "ou",
        ("de", ListType::Conjunction) => "und",
        ("de", ListType::Disjunction) => "oder",
        ("tr", ListType::Conjunction) => "ve",
        ("tr", ListType::Disjunction) => "veya",
        ("ru", ListType::Conjunction) => "и",
        ("ru", ListType::Disjunction) => "или",
        ("ar", ListType::Conjunction) => "و",
        ("ar", ListType::Disjunction) => "أو",
        ("he", ListType::Conjunction) => "ו-",
        ("he", ListType::Disjunction) => "או",
        ("zh", ListType::Conjunction) => "和",
        ("zh", ListType::Disjunction) => "或",
        (_, ListType::Conjunction) => "and",
        (_, ListType::Disjunction) => "or",
    }
}

struct RelativeLabels {
    just_now: &'static str,
    past: &'static str,
    future: &'static str,
    /// (singular, plural) per unit: second, minute, hour, day, week, month, year.
    units: [(&'static str, &'static str); 7],
}

static EN_RELATIVE: RelativeLabels = RelativeLabels {
    just_now: "just now",
    past: "{n} {unit} ago",
    future: "in {n} {unit}",
    units: [
        ("second", "seconds"),
        ("minute", "minutes"),
        ("hour", "hours"),
        ("day", "days"),
        ("week", "weeks"),
        ("month", "months"),
        ("year", "years"),
    ],
};

static ES_RELATIVE: RelativeLabels = RelativeLabels {
    just_now: "ahora mismo",
    past: "hace {n} {unit}",
    future: "en {n} {unit}",
    units: [
        ("segundo", "segundos"),
        ("minuto", "minutos"),
        ("hora", "horas"),
        ("día", "días"),
        ("semana", "semanas"),
        ("mes", "meses"),
        ("año", "años"),
    ],
};

static FR_RELATIVE: RelativeLabels = RelativeLabels {
    just_now: "à l'instant",
    past: "il y a {n} {unit}",
    future: "dans {n} {unit}",
    units: [
        ("seconde", "secondes"),
        ("minute", "minutes"),
        ("heure", "heures"),
        ("jour", "jours"),
        ("semaine", "semaines"),
        ("mois", "mois"),
        ("an", "ans"),
    ],
};

static DE_RELATIVE: RelativeLabels = RelativeLabels {
    just_now: "gerade eben",
    past: "vor {n} {unit}",
    future: "in {n} {unit}",
    units: [
        ("Sekunde", "Sekunden"),
        ("Minute", "Minuten"),
        ("Stunde", "Stunden"),
        ("Tag", "Tagen"),
        ("Woche", "Wochen"),
        ("Monat", "Monaten"),
        ("Jahr", "Jahren"),
    ],
};

static TR_RELATIVE: RelativeLabels = RelativeLabels {
    just_now: "şimdi",
    past: "{n} {unit} önce",
    future: "{n} {unit} sonra",
    units: [
        ("saniye", "saniye"),
        ("dakika", "dakika"),
        ("saat", "saat"),
        ("gün", "gün"),
        ("hafta", "hafta"),
        ("ay", "ay"),
        ("yıl", "yıl"),
    ],
};

static AR_RELATIVE: RelativeLabels = RelativeLabels {
    just_now: "الآن",
    past: "قبل {n} {unit}",
    future: "بعد {n} {unit}",
    units: [
        ("ثانية", "ثوان"),
        ("دقيقة", "دقائق"),
        ("ساعة", "ساعات"),
        ("يوم", "أيام"),
        ("أسبوع", "أسابيع"),
        ("شهر", "أشهر"),
        ("سنة", "سنوات"),
    ],
};

fn relative_labels(code: &str) -> &'static RelativeLabels {
    match code {
        "es" => &ES_RELATIVE,
        "fr" => &FR_RELATIVE,
        "de" => &DE_RELATIVE,
        "tr" => &TR_RELATIVE,
        "ar" => &AR_RELATIVE,
        _ => &EN_RELATIVE,
    }
}

fn parse_date_input(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn formatter(code: &str) -> LocaleFormatter {
        LocaleFormatter::new(Language::from_code(code).unwrap())
    }

    fn sample_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 5, 14, 30, 45).unwrap()
    }

    // ==================== Date Tests ====================

    #[test]
    fn test_format_date_medium_english() {
        let f = formatter("en");
        assert_eq!(f.format_date(&sample_date(), &DateStyle::Medium), "Mar 5, 2026");
    }

    #[test]
    fn test_format_date_short_differs_by_locale() {
        let date = sample_date();
        assert_eq!(formatter("en").format_date(&date, &DateStyle::Short), "3/5/26");
        assert_eq!(formatter("de").format_date(&date, &DateStyle::Short), "05.03.26");
        assert_eq!(formatter("es").format_date(&date, &DateStyle::Short), "05/03/26");
    }

    #[test]
    fn test_format_date_full_includes_weekday() {
        let f = formatter("en");
        let rendered = f.format_date(&sample_date(), &DateStyle::Full);
        assert_eq!(rendered, "Thursday, March 5, 2026");
    }

    #[test]
    fn test_format_date_custom_pattern() {
        let f = formatter("en");
        let rendered = f.format_date(&sample_date(), &DateStyle::Pattern("%Y-%m-%d".to_string()));
        assert_eq!(rendered, "2026-03-05");
    }

    #[test]
    fn test_format_time_presets() {
        let date = sample_date();
        assert_eq!(formatter("en").format_time(&date, &DateStyle::Medium), "2:30 PM");
        assert_eq!(formatter("de").format_time(&date, &DateStyle::Medium), "14:30");
        assert_eq!(formatter("de").format_time(&date, &DateStyle::Long), "14:30:45");
    }

    #[test]
    fn test_format_time_relative_style_renders_relative() {
        let f = formatter("en");
        let recent = Utc::now() - chrono::Duration::hours(2);
        assert_eq!(f.format_time(&recent, &DateStyle::Relative), "2 hours ago");
    }

    #[test]
    fn test_format_date_time() {
        let f = formatter("en");
        let rendered = f.format_date_time(&sample_date(), &DateStyle::Medium);
        assert_eq!(rendered, "Mar 5, 2026, 2:30 PM");
    }

    #[test]
    fn test_format_date_str_valid_inputs() {
        let f = formatter("en");
        assert_eq!(
            f.format_date_str("2026-03-05T14:30:45Z", &DateStyle::Medium),
            "Mar 5, 2026"
        );
        assert_eq!(f.format_date_str("2026-03-05", &DateStyle::Medium), "Mar 5, 2026");
    }

    #[test]
    fn test_format_date_str_invalid_yields_empty() {
        let f = formatter("en");
        assert_eq!(f.format_date_str("not-a-date", &DateStyle::Medium), "");
        assert_eq!(f.format_date_str("", &DateStyle::Short), "");
    }

    // ==================== Relative Time Tests ====================

    #[test]
    fn test_relative_time_zero_is_just_now() {
        let f = formatter("en");
        let base = sample_date();
        assert_eq!(f.format_relative_time(&base, Some(base)), "just now");
    }

    #[test]
    fn test_relative_time_past_and_future() {
        let f = formatter("en");
        let base = sample_date();
        let past = base - chrono::Duration::days(3);
        let future = base + chrono::Duration::days(3);
        assert_eq!(f.format_relative_time(&past, Some(base)), "3 days ago");
        assert_eq!(f.format_relative_time(&future, Some(base)), "in 3 days");
    }

    #[test]
    fn test_relative_time_singular_unit() {
        let f = formatter("en");
        let base = sample_date();
        let past = base - chrono::Duration::hours(1);
        assert_eq!(f.format_relative_time(&past, Some(base)), "1 hour ago");
    }

    #[test]
    fn test_relative_time_unit_walk() {
        let f = formatter("en");
        let base = sample_date();
        // 59 seconds stays in seconds, 60 rolls over to minutes.
        let p59 = base - chrono::Duration::seconds(59);
        let p60 = base - chrono::Duration::seconds(60);
        assert_eq!(f.format_relative_time(&p59, Some(base)), "59 seconds ago");
        assert_eq!(f.format_relative_time(&p60, Some(base)), "1 minute ago");
    }

    #[test]
    fn test_relative_time_localized() {
        let base = sample_date();
        let past = base - chrono::Duration::days(2);
        assert_eq!(
            formatter("es").format_relative_time(&past, Some(base)),
            "hace 2 días"
        );
        assert_eq!(
            formatter("tr").format_relative_time(&past, Some(base)),
            "2 gün önce"
        );
    }

    // ==================== Number Tests ====================

    #[test]
    fn test_format_number_english() {
        let f = formatter("en");
        assert_eq!(f.format_number(1234567.891, None), "1,234,567.89");
        assert_eq!(f.format_number(0.5, Some(1)), "0.5");
        assert_eq!(f.format_number(1000.0, Some(0)), "1,000");
    }

    #[test]
    fn test_format_number_german() {
        let f = formatter("de");
        assert_eq!(f.format_number(1234567.891, None), "1.234.567,89");
    }

    #[test]
    fn test_format_number_negative() {
        let f = formatter("en");
        assert_eq!(f.format_number(-1234.5, Some(1)), "-1,234.5");
    }

    #[test]
    fn test_format_number_non_finite_is_empty() {
        let f = formatter("en");
        assert_eq!(f.format_number(f64::NAN, None), "");
        assert_eq!(f.format_number(f64::INFINITY, None), "");
    }

    #[test]
    fn test_format_currency_default_and_explicit() {
        assert_eq!(formatter("en").format_currency(1234.5, None), "$1,234.50");
        assert_eq!(formatter("de").format_currency(1234.5, None), "1.234,50 €");
        assert_eq!(formatter("en").format_currency(10.0, Some("GBP")), "£10.00");
    }

    #[test]
    fn test_format_currency_unknown_code_uses_code() {
        let f = formatter("en");
        assert_eq!(f.format_currency(5.0, Some("XYZ")), "XYZ5.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(formatter("en").format_percent(0.42, None), "42%");
        assert_eq!(formatter("en").format_percent(0.1234, Some(1)), "12.3%");
    }

    #[test]
    fn test_parse_number_round_trip() {
        for code in ["en", "de", "fr", "tr"] {
            let f = formatter(code);
            let rendered = f.format_number(1234567.89, None);
            let parsed = f.parse_number(&rendered).unwrap();
            assert!((parsed - 1234567.89).abs() < 1e-9, "{code}: {rendered}");
        }
    }

    #[test]
    fn test_parse_number_plain_input() {
        let f = formatter("en");
        assert_eq!(f.parse_number("42"), Some(42.0));
        assert_eq!(f.parse_number(" -3.5 "), Some(-3.5));
    }

    #[test]
    fn test_parse_number_invalid() {
        let f = formatter("en");
        assert_eq!(f.parse_number("abc"), None);
        assert_eq!(f.parse_number(""), None);
    }

    // ==================== List Tests ====================

    #[test]
    fn test_format_list_english_conjunction() {
        let f = formatter("en");
        assert_eq!(
            f.format_list(&["A", "B", "C"], ListType::Conjunction, ListStyle::Long),
            "A, B, and C"
        );
        assert_eq!(
            f.format_list(&["A", "B"], ListType::Conjunction, ListStyle::Long),
            "A and B"
        );
    }

    #[test]
    fn test_format_list_disjunction() {
        let f = formatter("en");
        assert_eq!(
            f.format_list(&["A", "B", "C"], ListType::Disjunction, ListStyle::Long),
            "A, B, or C"
        );
    }

    #[test]
    fn test_format_list_localized_connective() {
        let f = formatter("es");
        assert_eq!(
            f.format_list(&["A", "B", "C"], ListType::Conjunction, ListStyle::Long),
            "A, B y C"
        );
    }

    #[test]
    fn test_format_list_edge_cases() {
        let f = formatter("en");
        assert_eq!(f.format_list(&[], ListType::Conjunction, ListStyle::Long), "");
        assert_eq!(f.format_list(&["A"], ListType::Conjunction, ListStyle::Long), "A");
        assert_eq!(
            f.format_list(&["A", "B", "C"], ListType::Conjunction, ListStyle::Narrow),
            "A, B, C"
        );
    }

    // ==================== Plural Tests ====================

    #[test]
    fn test_plural_form_delegates_to_locale() {
        assert_eq!(formatter("en").plural_form(1), PluralCategory::One);
        assert_eq!(formatter("en").plural_form(0), PluralCategory::Other);
        assert_eq!(formatter("ar").plural_form(2), PluralCategory::Two);
        assert_eq!(formatter("ar").plural_categories().len(), 6);
    }

    // ==================== File Size Tests ====================

    #[test]
    fn test_format_file_size_zero() {
        assert_eq!(formatter("en").format_file_size(0, 2), "0 Bytes");
    }

    #[test]
    fn test_format_file_size_trims_trailing_zeros() {
        let f = formatter("en");
        assert_eq!(f.format_file_size(1536, 2), "1.5 KB");
        assert_eq!(f.format_file_size(1024, 2), "1 KB");
        assert_eq!(f.format_file_size(500, 2), "500 Bytes");
    }

    #[test]
    fn test_format_file_size_large_units() {
        let f = formatter("en");
        assert_eq!(f.format_file_size(1048576, 2), "1 MB");
        assert_eq!(f.format_file_size(5 * 1024 * 1024 * 1024, 1), "5 GB");
    }

    #[test]
    fn test_format_file_size_locale_decimal() {
        assert_eq!(formatter("de").format_file_size(1536, 2), "1,5 KB");
    }

    // ==================== Duration Tests ====================

    #[test]
    fn test_format_duration_mixed_units() {
        let f = formatter("en");
        let units = [DurationUnit::Hour, DurationUnit::Minute, DurationUnit::Second];
        assert_eq!(f.format_duration(3661, &units), "1 hour, 1 minute, 1 second");
    }

    #[test]
    fn test_format_duration_skips_zero_components() {
        let f = formatter("en");
        let units = [DurationUnit::Hour, DurationUnit::Minute, DurationUnit::Second];
        assert_eq!(f.format_duration(3600, &units), "1 hour");
        assert_eq!(f.format_duration(7325, &units), "2 hours, 2 minutes, 5 seconds");
    }

    #[test]
    fn test_format_duration_empty_decomposition() {
        let f = formatter("en");
        assert_eq!(f.format_duration(0, &[DurationUnit::Hour]), "0 seconds");
        // 30 seconds cannot be expressed in minutes.
        assert_eq!(f.format_duration(30, &[DurationUnit::Minute]), "0 seconds");
    }

    #[test]
    fn test_format_duration_fixed_year() {
        let f = formatter("en");
        let units = [DurationUnit::Year, DurationUnit::Day];
        assert_eq!(f.format_duration(31_536_000, &units), "1 year");
        assert_eq!(f.format_duration(31_536_000 + 86_400, &units), "1 year, 1 day");
    }

    #[test]
    fn test_format_duration_unordered_input() {
        let f = formatter("en");
        // Units are consumed largest-first regardless of argument order.
        let units = [DurationUnit::Second, DurationUnit::Hour, DurationUnit::Minute];
        assert_eq!(f.format_duration(3661, &units), "1 hour, 1 minute, 1 second");
    }

    // ==================== Cache Tests ====================

    #[test]
    fn test_cache_populated_and_cleared_on_language_change() {
        let f = formatter("en");
        f.format_date(&sample_date(), &DateStyle::Medium);
        f.format_number(1.0, None);
        assert!(f.cached_entry_count() >= 2);

        f.set_language(Language::from_code("de").unwrap());
        assert_eq!(f.cached_entry_count(), 0);

        // Same language again is a no-op and keeps the cache.
        f.format_number(1.0, None);
        let count = f.cached_entry_count();
        f.set_language(Language::from_code("de").unwrap());
        assert_eq!(f.cached_entry_count(), count);
    }

    #[test]
    fn test_cache_key_varies_by_options() {
        let f = formatter("en");
        f.format_number(1.0, None);
        f.format_number(1.0, Some(4));
        assert_eq!(f.cached_entry_count(), 2);
    }

    #[test]
    fn test_output_follows_active_language_after_switch() {
        let f = formatter("en");
        assert_eq!(f.format_number(1234.5, Some(1)), "1,234.5");
        f.set_language(Language::from_code("de").unwrap());
        assert_eq!(f.format_number(1234.5, Some(1)), "1.234,5");
    }
}
