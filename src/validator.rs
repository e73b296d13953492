//! Cross-language validation: structural diff of a target language's
//! bundles against a reference language.
//!
//! Missing, Empty and Placeholder findings make a language invalid; tag,
//! length and formatting findings are advisory only.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Classification of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueKind {
    Missing,
    Extra,
    Empty,
    Placeholder,
    HtmlTag,
    Length,
    Formatting,
}

/// One finding for one key in one namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationIssue {
    /// Key present in the reference, absent in the target.
    Missing { namespace: String, key: String },
    /// Key present in the target, absent in the reference.
    Extra { namespace: String, key: String },
    /// Target leaf is empty or whitespace-only.
    Empty { namespace: String, key: String },
    /// The sorted `{{...}}` token sets differ between languages.
    Placeholder {
        namespace: String,
        key: String,
        reference: Vec<String>,
        target: Vec<String>,
    },
    /// The sorted `<...>` token sets differ between languages.
    HtmlTag {
        namespace: String,
        key: String,
        reference: Vec<String>,
        target: Vec<String>,
    },
    /// Target/reference length ratio outside the accepted band.
    Length {
        namespace: String,
        key: String,
        ratio: f64,
    },
    /// Trailing punctuation or leading capitalization disagreement.
    Formatting {
        namespace: String,
        key: String,
        detail: String,
    },
}

impl ValidationIssue {
    pub fn kind(&self) -> IssueKind {
        match self {
            ValidationIssue::Missing { .. } => IssueKind::Missing,
            ValidationIssue::Extra { .. } => IssueKind::Extra,
            ValidationIssue::Empty { .. } => IssueKind::Empty,
            ValidationIssue::Placeholder { .. } => IssueKind::Placeholder,
            ValidationIssue::HtmlTag { .. } => IssueKind::HtmlTag,
            ValidationIssue::Length { .. } => IssueKind::Length,
            ValidationIssue::Formatting { .. } => IssueKind::Formatting,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ValidationIssue::Missing { key, .. }
            | ValidationIssue::Extra { key, .. }
            | ValidationIssue::Empty { key, .. }
            | ValidationIssue::Placeholder { key, .. }
            | ValidationIssue::HtmlTag { key, .. }
            | ValidationIssue::Length { key, .. }
            | ValidationIssue::Formatting { key, .. } => key,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            ValidationIssue::Missing { namespace, .. }
            | ValidationIssue::Extra { namespace, .. }
            | ValidationIssue::Empty { namespace, .. }
            | ValidationIssue::Placeholder { namespace, .. }
            | ValidationIssue::HtmlTag { namespace, .. }
            | ValidationIssue::Length { namespace, .. }
            | ValidationIssue::Formatting { namespace, .. } => namespace,
        }
    }
}

/// Outcome of validating one language against a reference.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub language: String,
    pub reference_language: String,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub coverage_percent: f64,
}

impl ValidationReport {
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind() == kind).count()
    }

    pub fn by_kind(&self) -> HashMap<IssueKind, Vec<&ValidationIssue>> {
        let mut grouped: HashMap<IssueKind, Vec<&ValidationIssue>> = HashMap::new();
        for issue in &self.issues {
            grouped.entry(issue.kind()).or_default().push(issue);
        }
        grouped
    }
}

/// Flattened bundles for one language: `namespace -> (key -> value)`.
pub type FlatBundles = BTreeMap<String, BTreeMap<String, String>>;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Structural comparator for two languages' flattened bundles.
pub struct BundleValidator {
    length_ratio_threshold: f64,
}

impl Default for BundleValidator {
    fn default() -> Self {
        Self {
            length_ratio_threshold: 2.0,
        }
    }
}

impl BundleValidator {
    pub fn new(length_ratio_threshold: f64) -> Self {
        Self {
            length_ratio_threshold,
        }
    }

    /// Diff `target` against `reference` and produce the full report.
    ///
    /// `valid` holds iff no Missing, Empty or Placeholder issues exist.
    /// Coverage counts reference keys that are present and non-empty in
    /// the target.
    pub fn validate(
        &self,
        language: &str,
        reference_language: &str,
        reference: &FlatBundles,
        target: &FlatBundles,
    ) -> ValidationReport {
        let mut issues = Vec::new();
        let mut total_keys = 0usize;

        static EMPTY: OnceLock<BTreeMap<String, String>> = OnceLock::new();
        let empty = EMPTY.get_or_init(BTreeMap::new);

        for (namespace, reference_keys) in reference {
            let target_keys = target.get(namespace).unwrap_or(empty);
            total_keys += reference_keys.len();

            for (key, reference_value) in reference_keys {
                match target_keys.get(key) {
                    None => issues.push(ValidationIssue::Missing {
                        namespace: namespace.clone(),
                        key: key.clone(),
                    }),
                    Some(target_value) => {
                        self.check_value(
                            namespace,
                            key,
                            reference_value,
                            target_value,
                            &mut issues,
                        );
                    }
                }
            }

            for key in target_keys.keys() {
                if !reference_keys.contains_key(key) {
                    issues.push(ValidationIssue::Extra {
                        namespace: namespace.clone(),
                        key: key.clone(),
                    });
                }
            }
        }

        // Namespaces only present in the target are all extra keys.
        for (namespace, target_keys) in target {
            if !reference.contains_key(namespace) {
                for key in target_keys.keys() {
                    issues.push(ValidationIssue::Extra {
                        namespace: namespace.clone(),
                        key: key.clone(),
                    });
                }
            }
        }

        let missing = issues
            .iter()
            .filter(|i| i.kind() == IssueKind::Missing)
            .count();
        let empty_count = issues
            .iter()
            .filter(|i| i.kind() == IssueKind::Empty)
            .count();
        let placeholder = issues
            .iter()
            .filter(|i| i.kind() == IssueKind::Placeholder)
            .count();

        let coverage_percent = if total_keys == 0 {
            100.0
        } else {
            (total_keys - missing - empty_count) as f64 / total_keys as f64 * 100.0
        };

        ValidationReport {
            language: language.to_string(),
            reference_language: reference_language.to_string(),
            valid: missing == 0 && empty_count == 0 && placeholder == 0,
            issues,
            coverage_percent,
        }
    }

    fn check_value(
        &self,
        namespace: &str,
        key: &str,
        reference_value: &str,
        target_value: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        if target_value.trim().is_empty() {
            issues.push(ValidationIssue::Empty {
                namespace: namespace.to_string(),
                key: key.to_string(),
            });
            // An empty value would trip every other check as well; one
            // finding is enough.
            return;
        }

        let reference_placeholders = extract_placeholders(reference_value);
        let target_placeholders = extract_placeholders(target_value);
        if reference_placeholders != target_placeholders {
            issues.push(ValidationIssue::Placeholder {
                namespace: namespace.to_string(),
                key: key.to_string(),
                reference: reference_placeholders,
                target: target_placeholders,
            });
        }

        let reference_tags = extract_tags(reference_value);
        let target_tags = extract_tags(target_value);
        if reference_tags != target_tags {
            issues.push(ValidationIssue::HtmlTag {
                namespace: namespace.to_string(),
                key: key.to_string(),
                reference: reference_tags,
                target: target_tags,
            });
        }

        let reference_len = reference_value.chars().count();
        if reference_len > 0 {
            let ratio = target_value.chars().count() as f64 / reference_len as f64;
            if ratio > self.length_ratio_threshold || ratio < 1.0 / self.length_ratio_threshold {
                issues.push(ValidationIssue::Length {
                    namespace: namespace.to_string(),
                    key: key.to_string(),
                    ratio,
                });
            }
        }

        if let Some(detail) = formatting_mismatch(reference_value, target_value) {
            issues.push(ValidationIssue::Formatting {
                namespace: namespace.to_string(),
                key: key.to_string(),
                detail,
            });
        }
    }
}

/// Extract the sorted set of `{{...}}` interpolation tokens.
fn extract_placeholders(value: &str) -> Vec<String> {
    let regex = PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{\{[^}]*\}\}").unwrap());
    let mut tokens: Vec<String> = regex
        .find_iter(value)
        .map(|m| m.as_str().to_string())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

/// Extract the sorted set of `<...>` tag tokens.
fn extract_tags(value: &str) -> Vec<String> {
    let regex = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").unwrap());
    let mut tokens: Vec<String> = regex
        .find_iter(value)
        .map(|m| m.as_str().to_string())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

const TRAILING_PUNCTUATION: [char; 6] = ['.', '!', '?', ':', ';', ','];

fn formatting_mismatch(reference_value: &str, target_value: &str) -> Option<String> {
    let reference_trailing = reference_value
        .trim_end()
        .chars()
        .last()
        .map(|c| TRAILING_PUNCTUATION.contains(&c))
        .unwrap_or(false);
    let target_trailing = target_value
        .trim_end()
        .chars()
        .last()
        .map(|c| TRAILING_PUNCTUATION.contains(&c))
        .unwrap_or(false);
    if reference_trailing != target_trailing {
        return Some("trailing punctuation differs".to_string());
    }

    let reference_first = reference_value.trim_start().chars().next();
    let target_first = target_value.trim_start().chars().next();
    if let (Some(r), Some(t)) = (reference_first, target_first) {
        // Only compare when both scripts are bicameral; Arabic and Hebrew
        // letters carry no case and must not be flagged.
        let r_cased = r.is_uppercase() || r.is_lowercase();
        let t_cased = t.is_uppercase() || t.is_lowercase();
        if r_cased && t_cased && r.is_uppercase() != t.is_uppercase() {
            return Some("leading capitalization differs".to_string());
        }
    }
    None
}
