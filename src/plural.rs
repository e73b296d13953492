//! Plural category selection per locale.
//!
//! Categories follow the CLDR cardinal rules for whole-number counts. The
//! selected category is used as a translation-key suffix, e.g.
//! `items.one` / `items.other`.

/// A CLDR plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// The key-suffix form of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }
}

/// Select the plural category for a count under a locale's rules.
///
/// Unknown codes fall back to the English one/other split.
pub fn plural_form(code: &str, count: i64) -> PluralCategory {
    let n = count.abs();
    match code {
        // Six-category set
        "ar" => match n {
            0 => PluralCategory::Zero,
            1 => PluralCategory::One,
            2 => PluralCategory::Two,
            _ if (3..=10).contains(&(n % 100)) => PluralCategory::Few,
            _ if (11..=99).contains(&(n % 100)) => PluralCategory::Many,
            _ => PluralCategory::Other,
        },
        // Slavic one/few/many
        "ru" => {
            let m10 = n % 10;
            let m100 = n % 100;
            if m10 == 1 && m100 != 11 {
                PluralCategory::One
            } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
                PluralCategory::Few
            } else {
                PluralCategory::Many
            }
        }
        // 0 and 1 are both singular in French
        "fr" => {
            if n <= 1 {
                PluralCategory::One
            } else {
                PluralCategory::Other
            }
        }
        // No plural distinction
        "zh" => PluralCategory::Other,
        _ => {
            if n == 1 {
                PluralCategory::One
            } else {
                PluralCategory::Other
            }
        }
    }
}

/// The category set a locale can produce, in CLDR order.
pub fn categories(code: &str) -> &'static [PluralCategory] {
    match code {
        "ar" => &[
            PluralCategory::Zero,
            PluralCategory::One,
            PluralCategory::Two,
            PluralCategory::Few,
            PluralCategory::Many,
            PluralCategory::Other,
        ],
        "ru" => &[
            PluralCategory::One,
            PluralCategory::Few,
            PluralCategory::Many,
            PluralCategory::Other,
        ],
        "zh" => &[PluralCategory::Other],
        _ => &[PluralCategory::One, PluralCategory::Other],
    }
}
