use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Bundle source
    pub bundle_base_url: String,

    // Dynamic content persistence
    pub content_api_url: String,

    // Machine translation
    pub translation_api_url: String,
    pub translation_api_key: String,
    pub translation_model: String,

    // Locale defaults
    pub default_language: String,

    // Autosave
    pub autosave_debounce_ms: u64,

    // Validation
    pub length_ratio_threshold: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env if present; real environment variables win.
        dotenvy::dotenv().ok();

        Ok(Self {
            // Bundle source
            bundle_base_url: std::env::var("BUNDLE_BASE_URL")
                .context("BUNDLE_BASE_URL not set")?,

            // Dynamic content persistence
            content_api_url: std::env::var("CONTENT_API_URL")
                .context("CONTENT_API_URL not set")?,

            // Machine translation
            translation_api_url: std::env::var("TRANSLATION_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            translation_api_key: std::env::var("TRANSLATION_API_KEY")
                .context("TRANSLATION_API_KEY not set")?,
            translation_model: std::env::var("TRANSLATION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),

            // Locale defaults
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),

            // Autosave
            autosave_debounce_ms: std::env::var("AUTOSAVE_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),

            // Validation
            length_ratio_threshold: std::env::var("LENGTH_RATIO_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2.0),
        })
    }
}
