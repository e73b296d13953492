//! Editing workflow for database-backed translations: per-field edits with
//! optimistic local state, a debounced batched autosave, and optional
//! machine translation of a source field into many languages.
//!
//! Edits apply locally at once and are queued last-write-wins per
//! `(field, language)`. Each edit restarts the debounce timer; when it
//! fires, every queued update is persisted in one batch. `close()` cancels
//! the timer and flushes whatever is left.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::I18nError;
use crate::retry::{is_retryable_error, with_retry_if, RetryConfig};

/// One queued edit: the value of one field in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTranslation {
    pub field_name: String,
    pub language: String,
    pub value: String,
    #[serde(default)]
    pub deleted: bool,
}

/// Backing store for dynamic content translations.
pub trait ContentPersistence: Send + Sync {
    /// Fetch every translated field of one entity in one language.
    fn load(
        &self,
        entity_type: &str,
        entity_id: &str,
        language: &str,
    ) -> BoxFuture<'static, Result<HashMap<String, String>, I18nError>>;

    /// Persist a batch of edits atomically.
    fn save(
        &self,
        entity_type: &str,
        entity_id: &str,
        updates: Vec<FieldTranslation>,
    ) -> BoxFuture<'static, Result<(), I18nError>>;
}

/// Persistence over the content HTTP API.
///
/// Loads are `GET {base}/content/{type}/{id}?language={l}`; saves are
/// `POST {base}/content/{type}/{id}` with a `{"translations": [...]}` body
/// and retry on transient failures.
pub struct HttpContentApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn entity_url(&self, entity_type: &str, entity_id: &str) -> String {
        format!(
            "{}/content/{}/{}",
            self.base_url.trim_end_matches('/'),
            entity_type,
            entity_id
        )
    }
}

#[derive(Serialize)]
struct SaveRequest {
    translations: Vec<FieldTranslation>,
}

// The content API wraps both directions in the same envelope: saves post
// a `translations` list, loads return a `translations` map.
#[derive(Deserialize)]
struct LoadResponse {
    translations: HashMap<String, String>,
}

impl ContentPersistence for HttpContentApi {
    fn load(
        &self,
        entity_type: &str,
        entity_id: &str,
        language: &str,
    ) -> BoxFuture<'static, Result<HashMap<String, String>, I18nError>> {
        let client = self.client.clone();
        let url = self.entity_url(entity_type, entity_id);
        let entity_type = entity_type.to_string();
        let language = language.to_string();

        async move {
            let response = client
                .get(&url)
                .query(&[("language", language.as_str())])
                .send()
                .await
                .map_err(|e| I18nError::load_failure(&language, &entity_type, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(I18nError::load_failure(
                    &language,
                    &entity_type,
                    format!("HTTP {status}"),
                ));
            }

            response
                .json::<LoadResponse>()
                .await
                .map(|body| body.translations)
                .map_err(|e| I18nError::load_failure(&language, &entity_type, e.to_string()))
        }
        .boxed()
    }

    fn save(
        &self,
        entity_type: &str,
        entity_id: &str,
        updates: Vec<FieldTranslation>,
    ) -> BoxFuture<'static, Result<(), I18nError>> {
        let client = self.client.clone();
        let url = self.entity_url(entity_type, entity_id);

        async move {
            let body = SaveRequest {
                translations: updates,
            };
            with_retry_if(
                &RetryConfig::persistence(),
                "Content save",
                || async {
                    let response = client
                        .post(&url)
                        .json(&body)
                        .send()
                        .await
                        .map_err(|e| I18nError::FlushFailure {
                            count: body.translations.len(),
                            message: e.to_string(),
                        })?;

                    let status = response.status();
                    if !status.is_success() {
                        return Err(I18nError::FlushFailure {
                            count: body.translations.len(),
                            message: format!("HTTP {status}"),
                        });
                    }
                    Ok(())
                },
                |e: &I18nError| is_retryable_error(&e.to_string()),
            )
            .await
        }
        .boxed()
    }
}

/// Translates one text into several target languages at once.
pub trait MachineTranslator: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_languages: &[String],
    ) -> BoxFuture<'static, Result<HashMap<String, String>, I18nError>>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_completion_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Machine translation through an OpenAI-compatible chat completion API.
pub struct HttpMachineTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpMachineTranslator {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

fn build_translation_system_prompt(source_language: &str, target_languages: &[String]) -> String {
    format!(
        r#"You are a professional translator for a management application.
Translate the user's text from {} into each of these languages: {}.

Rules:
- Preserve {{{{placeholder}}}} tokens exactly as written
- Preserve HTML tags exactly as written
- Keep trailing punctuation consistent with the source
- Do not add explanations

Respond with a single JSON object mapping each target language code to its translation, and nothing else."#,
        source_language,
        target_languages.join(", ")
    )
}

/// Strip an optional markdown code fence around a JSON payload.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

impl MachineTranslator for HttpMachineTranslator {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_languages: &[String],
    ) -> BoxFuture<'static, Result<HashMap<String, String>, I18nError>> {
        let client = self.client.clone();
        let api_url = self.api_url.clone();
        let api_key = self.api_key.clone();
        let model = self.model.clone();
        let text = text.to_string();
        let source_language = source_language.to_string();
        let target_languages = target_languages.to_vec();

        async move {
            let request = ChatRequest {
                model,
                messages: vec![
                    ChatMessage {
                        role: "system".to_string(),
                        content: build_translation_system_prompt(
                            &source_language,
                            &target_languages,
                        ),
                    },
                    ChatMessage {
                        role: "user".to_string(),
                        content: text,
                    },
                ],
                max_completion_tokens: 2000,
                temperature: 0.3,
            };

            let content = with_retry_if(
                &RetryConfig::machine_translation(),
                "Machine translation",
                || async {
                    let response = client
                        .post(&api_url)
                        .header("Authorization", format!("Bearer {api_key}"))
                        .header("Content-Type", "application/json")
                        .json(&request)
                        .send()
                        .await
                        .map_err(|e| I18nError::TranslationFailure(e.to_string()))?;

                    let status = response.status();
                    if !status.is_success() {
                        let body = response
                            .text()
                            .await
                            .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
                        return Err(I18nError::TranslationFailure(format!(
                            "HTTP {status}: {body}"
                        )));
                    }

                    let chat_response: ChatResponse = response
                        .json()
                        .await
                        .map_err(|e| I18nError::TranslationFailure(e.to_string()))?;

                    chat_response
                        .choices
                        .into_iter()
                        .next()
                        .map(|choice| choice.message.content)
                        .ok_or_else(|| {
                            I18nError::TranslationFailure("response contained no choices".into())
                        })
                },
                |e: &I18nError| is_retryable_error(&e.to_string()),
            )
            .await?;

            let translations: HashMap<String, String> =
                serde_json::from_str(extract_json(&content)).map_err(|e| {
                    I18nError::TranslationFailure(format!("unparseable response: {e}"))
                })?;
            Ok(translations)
        }
        .boxed()
    }
}

/// Knobs for the editing session.
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    pub autosave: bool,
    pub debounce: Duration,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            autosave: true,
            debounce: Duration::from_millis(2000),
        }
    }
}

#[derive(Default)]
struct TranslatorState {
    /// field -> language -> current value (local edits included).
    fields: HashMap<String, HashMap<String, String>>,
    /// Queued edits, last-write-wins per `field:language`.
    pending: HashMap<String, FieldTranslation>,
    dirty: bool,
    loaded_languages: HashSet<String>,
}

fn pending_key(field: &str, language: &str) -> String {
    format!("{field}:{language}")
}

/// One editing session over the translated fields of one entity.
///
/// With autosave on, `update_field` must run inside a tokio runtime since
/// the debounce timer is a spawned task.
pub struct DynamicContentTranslator {
    entity_type: String,
    entity_id: String,
    persistence: Arc<dyn ContentPersistence>,
    machine: Option<Arc<dyn MachineTranslator>>,
    options: TranslatorOptions,
    inner: Arc<Mutex<TranslatorState>>,
    flush_task: Mutex<Option<JoinHandle<()>>>,
}

impl DynamicContentTranslator {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        persistence: Arc<dyn ContentPersistence>,
        options: TranslatorOptions,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            persistence,
            machine: None,
            options,
            inner: Arc::new(Mutex::new(TranslatorState::default())),
            flush_task: Mutex::new(None),
        }
    }

    pub fn with_machine_translator(mut self, machine: Arc<dyn MachineTranslator>) -> Self {
        self.machine = Some(machine);
        self
    }

    /// Fetch an entity's fields in one language into local state. Local
    /// edits made before the load completes win over server values.
    pub async fn load_language(&self, language: &str) -> Result<(), I18nError> {
        {
            let state = self.inner.lock().unwrap();
            if state.loaded_languages.contains(language) {
                return Ok(());
            }
        }

        let fields = self
            .persistence
            .load(&self.entity_type, &self.entity_id, language)
            .await?;

        let mut state = self.inner.lock().unwrap();
        for (field, value) in fields {
            state
                .fields
                .entry(field)
                .or_default()
                .entry(language.to_string())
                .or_insert(value);
        }
        state.loaded_languages.insert(language.to_string());
        Ok(())
    }

    pub fn get_field(&self, field: &str, language: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .fields
            .get(field)
            .and_then(|per_language| per_language.get(language))
            .cloned()
    }

    /// Apply an edit locally and queue it for the next flush. With autosave
    /// on, the debounce timer restarts.
    pub fn update_field(&self, field: &str, language: &str, value: &str) {
        {
            let mut state = self.inner.lock().unwrap();
            state
                .fields
                .entry(field.to_string())
                .or_default()
                .insert(language.to_string(), value.to_string());
            state.pending.insert(
                pending_key(field, language),
                FieldTranslation {
                    field_name: field.to_string(),
                    language: language.to_string(),
                    value: value.to_string(),
                    deleted: false,
                },
            );
            state.dirty = true;
        }
        if self.options.autosave {
            self.schedule_flush();
        }
    }

    /// Remove one language's value of a field, locally and (on flush) in
    /// the backing store.
    pub fn delete_field(&self, field: &str, language: &str) {
        {
            let mut state = self.inner.lock().unwrap();
            if let Some(per_language) = state.fields.get_mut(field) {
                per_language.remove(language);
            }
            state.pending.insert(
                pending_key(field, language),
                FieldTranslation {
                    field_name: field.to_string(),
                    language: language.to_string(),
                    value: String::new(),
                    deleted: true,
                },
            );
            state.dirty = true;
        }
        if self.options.autosave {
            self.schedule_flush();
        }
    }

    /// Translate a field's source-language value into every target language
    /// and queue the results as edits (one flush for the whole fan-out).
    pub async fn machine_translate(
        &self,
        field: &str,
        source_language: &str,
        target_languages: &[String],
    ) -> Result<HashMap<String, String>, I18nError> {
        let machine = self.machine.as_ref().ok_or_else(|| {
            I18nError::TranslationFailure("no machine translator configured".to_string())
        })?;
        let source_value = self.get_field(field, source_language).ok_or_else(|| {
            I18nError::TranslationFailure(format!(
                "field '{field}' has no {source_language} value to translate"
            ))
        })?;

        let translations = machine
            .translate(&source_value, source_language, target_languages)
            .await?;

        if !translations.is_empty() {
            {
                let mut state = self.inner.lock().unwrap();
                for (language, value) in &translations {
                    state
                        .fields
                        .entry(field.to_string())
                        .or_default()
                        .insert(language.clone(), value.clone());
                    state.pending.insert(
                        pending_key(field, language),
                        FieldTranslation {
                            field_name: field.to_string(),
                            language: language.clone(),
                            value: value.clone(),
                            deleted: false,
                        },
                    );
                }
                state.dirty = true;
            }
            if self.options.autosave {
                self.schedule_flush();
            }
        }
        Ok(translations)
    }

    fn schedule_flush(&self) {
        let persistence = Arc::clone(&self.persistence);
        let entity_type = self.entity_type.clone();
        let entity_id = self.entity_id.clone();
        let inner = Arc::clone(&self.inner);
        let debounce = self.options.debounce;

        let mut task = self.flush_task.lock().unwrap();
        if let Some(handle) = task.take() {
            handle.abort();
        }
        *task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Err(e) = Self::flush_now(persistence, &entity_type, &entity_id, inner).await {
                warn!(%entity_type, %entity_id, error = %e, "Autosave flush failed");
            }
        }));
    }

    /// Persist everything queued right now. Returns how many updates were
    /// written. On failure the updates are re-queued (newer edits win) and
    /// the session stays dirty.
    pub async fn flush(&self) -> Result<usize, I18nError> {
        Self::flush_now(
            Arc::clone(&self.persistence),
            &self.entity_type,
            &self.entity_id,
            Arc::clone(&self.inner),
        )
        .await
    }

    async fn flush_now(
        persistence: Arc<dyn ContentPersistence>,
        entity_type: &str,
        entity_id: &str,
        inner: Arc<Mutex<TranslatorState>>,
    ) -> Result<usize, I18nError> {
        let drained: Vec<FieldTranslation> = {
            let mut state = inner.lock().unwrap();
            if state.pending.is_empty() {
                state.dirty = false;
                return Ok(0);
            }
            state.pending.drain().map(|(_, update)| update).collect()
        };
        let count = drained.len();

        match persistence
            .save(entity_type, entity_id, drained.clone())
            .await
        {
            Ok(()) => {
                let mut state = inner.lock().unwrap();
                // Edits made while the save was in flight keep us dirty.
                state.dirty = !state.pending.is_empty();
                debug!(entity_type, entity_id, count, "Flushed translation edits");
                Ok(count)
            }
            Err(e) => {
                let mut state = inner.lock().unwrap();
                for update in drained {
                    let key = pending_key(&update.field_name, &update.language);
                    // A newer edit queued during the save wins over the
                    // re-queued one.
                    state.pending.entry(key).or_insert(update);
                }
                state.dirty = true;
                Err(I18nError::FlushFailure {
                    count,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Cancel the debounce timer and flush whatever is still queued.
    pub async fn close(&self) -> Result<usize, I18nError> {
        if let Some(handle) = self.flush_task.lock().unwrap().take() {
            handle.abort();
        }
        self.flush().await
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.lock().unwrap().dirty
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }
}

impl Drop for DynamicContentTranslator {
    fn drop(&mut self) {
        if let Some(handle) = self.flush_task.lock().unwrap().take() {
            handle.abort();
        }
        if self.inner.lock().unwrap().dirty {
            warn!(
                entity_type = %self.entity_type,
                entity_id = %self.entity_id,
                "Translator dropped with unsaved edits; call close() to flush"
            );
        }
    }
}
