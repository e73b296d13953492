//! Async catalog store: fetches, caches and mutates translation bundles.
//!
//! Loads are deduplicated per `(language, namespace)`: concurrent requests
//! for the same bundle attach to one shared in-flight future, and every
//! caller observes the same result. The cache is the single source of truth
//! for lookups, updates, validation and export.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{try_join_all, BoxFuture, Shared};
use futures::FutureExt;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::bundle::TranslationBundle;
use crate::error::I18nError;
use crate::missing::{MissingReport, MissingTracker};
use crate::validator::{BundleValidator, FlatBundles, ValidationReport};

/// Namespaces fetched by `load_language`.
pub const DEFAULT_NAMESPACES: [&str; 8] = [
    "common",
    "dashboard",
    "evaluations",
    "beneficiaries",
    "programs",
    "notifications",
    "errors",
    "validation",
];

/// Where raw bundle trees come from.
///
/// Implementations return `'static` futures so in-flight loads can be
/// shared across callers.
pub trait BundleSource: Send + Sync {
    fn fetch(&self, language: &str, namespace: &str)
        -> BoxFuture<'static, Result<Value, I18nError>>;
}

/// Fetches bundles over HTTP from `{base}/locales/{language}/{namespace}.json`.
pub struct HttpBundleSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBundleSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl BundleSource for HttpBundleSource {
    fn fetch(
        &self,
        language: &str,
        namespace: &str,
    ) -> BoxFuture<'static, Result<Value, I18nError>> {
        let client = self.client.clone();
        let url = format!(
            "{}/locales/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            language,
            namespace
        );
        let language = language.to_string();
        let namespace = namespace.to_string();

        async move {
            debug!(%url, "Fetching translation bundle");
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| I18nError::load_failure(&language, &namespace, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(I18nError::load_failure(
                    &language,
                    &namespace,
                    format!("HTTP {status}"),
                ));
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| I18nError::load_failure(&language, &namespace, e.to_string()))
        }
        .boxed()
    }
}

type BundleKey = (String, String);
type SharedLoad = Shared<BoxFuture<'static, Result<Arc<TranslationBundle>, I18nError>>>;

#[derive(Default)]
struct StoreState {
    bundles: HashMap<BundleKey, Arc<TranslationBundle>>,
    pending: HashMap<BundleKey, SharedLoad>,
}

type ChangeListener = Box<dyn Fn(&str, &str) + Send + Sync>;

/// The bundle cache plus everything hanging off it: load dedup, missing-key
/// tracking, change listeners, validation and export.
pub struct CatalogStore {
    source: Arc<dyn BundleSource>,
    state: Arc<Mutex<StoreState>>,
    missing: MissingTracker,
    listeners: Mutex<Vec<(u64, ChangeListener)>>,
    next_listener_id: Mutex<u64>,
    namespaces: Vec<String>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn BundleSource>) -> Self {
        Self::with_namespaces(source, DEFAULT_NAMESPACES.iter().map(|s| s.to_string()))
    }

    pub fn with_namespaces(
        source: Arc<dyn BundleSource>,
        namespaces: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(StoreState::default())),
            missing: MissingTracker::new(),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: Mutex::new(0),
            namespaces: namespaces.into_iter().collect(),
        }
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Load one bundle, deduplicating concurrent requests.
    ///
    /// A cached bundle returns immediately. Otherwise the caller either
    /// starts a new fetch or attaches to the in-flight one; all attached
    /// callers receive the same `Arc` (or the same error). A failed load
    /// leaves nothing behind, so the next call retries from scratch.
    pub async fn load(
        &self,
        language: &str,
        namespace: &str,
    ) -> Result<Arc<TranslationBundle>, I18nError> {
        let key = (language.to_string(), namespace.to_string());

        let shared = {
            let mut state = self.state.lock().unwrap();
            if let Some(bundle) = state.bundles.get(&key) {
                return Ok(Arc::clone(bundle));
            }
            if let Some(pending) = state.pending.get(&key) {
                pending.clone()
            } else {
                let shared = self.start_load(&key);
                state.pending.insert(key.clone(), shared.clone());
                shared
            }
        };

        shared.await
    }

    fn start_load(&self, key: &BundleKey) -> SharedLoad {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let (language, namespace) = key.clone();
        let key = key.clone();

        async move {
            let result = source.fetch(&language, &namespace).await;
            let mut locked = state.lock().unwrap();
            locked.pending.remove(&key);
            match result {
                Ok(tree) => {
                    let bundle = Arc::new(TranslationBundle::new(&language, &namespace, tree));
                    debug!(
                        %language,
                        %namespace,
                        keys = bundle.key_count(),
                        "Cached translation bundle"
                    );
                    locked.bundles.insert(key, Arc::clone(&bundle));
                    Ok(bundle)
                }
                Err(e) => {
                    warn!(%language, %namespace, error = %e, "Bundle load failed");
                    Err(e)
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Load every configured namespace for a language concurrently.
    ///
    /// Fails if any namespace fails; bundles that did load stay cached.
    pub async fn load_language(
        &self,
        language: &str,
    ) -> Result<Vec<Arc<TranslationBundle>>, I18nError> {
        let loads = self
            .namespaces
            .iter()
            .map(|namespace| self.load(language, namespace));
        let bundles = try_join_all(loads).await?;
        info!(
            language,
            namespaces = bundles.len(),
            "Loaded all namespaces"
        );
        Ok(bundles)
    }

    /// Look up a key in the cached bundle for `language`, falling back to
    /// `fallback_language`'s bundle when the primary misses.
    ///
    /// A primary miss is recorded in the missing tracker even when the
    /// fallback resolves. Returns `None` when both miss; the caller decides
    /// how to render an untranslated key.
    pub fn get(
        &self,
        language: &str,
        namespace: &str,
        key: &str,
        fallback_language: Option<&str>,
    ) -> Option<String> {
        let state = self.state.lock().unwrap();
        if let Some(value) = Self::lookup(&state, language, namespace, key) {
            return Some(value);
        }

        self.missing.record(key, language, namespace);

        let fallback = fallback_language.filter(|f| *f != language)?;
        Self::lookup(&state, fallback, namespace, key)
    }

    /// `get` without the missing-tracker side effect, for callers that
    /// chain several candidate keys and report the miss themselves.
    pub fn peek(
        &self,
        language: &str,
        namespace: &str,
        key: &str,
        fallback_language: Option<&str>,
    ) -> Option<String> {
        let state = self.state.lock().unwrap();
        Self::lookup(&state, language, namespace, key).or_else(|| {
            fallback_language
                .filter(|f| *f != language)
                .and_then(|fallback| Self::lookup(&state, fallback, namespace, key))
        })
    }

    fn lookup(state: &StoreState, language: &str, namespace: &str, key: &str) -> Option<String> {
        state
            .bundles
            .get(&(language.to_string(), namespace.to_string()))
            .and_then(|bundle| bundle.get(key))
            .map(str::to_string)
    }

    /// Write one key into the cached bundle, creating the bundle if it was
    /// never loaded, then notify change listeners.
    pub fn update(&self, language: &str, namespace: &str, key: &str, value: &str) {
        self.apply_updates(language, namespace, &[(key.to_string(), value.to_string())]);
    }

    /// Write several keys into one bundle with a single listener
    /// notification at the end.
    pub fn batch_update(&self, language: &str, namespace: &str, entries: &[(String, String)]) {
        if entries.is_empty() {
            return;
        }
        self.apply_updates(language, namespace, entries);
    }

    fn apply_updates(&self, language: &str, namespace: &str, entries: &[(String, String)]) {
        {
            let mut state = self.state.lock().unwrap();
            let bundle = state
                .bundles
                .entry((language.to_string(), namespace.to_string()))
                .or_insert_with(|| Arc::new(TranslationBundle::empty(language, namespace)));
            let bundle = Arc::make_mut(bundle);
            for (key, value) in entries {
                bundle.set(key, value);
            }
        }
        self.notify(language, namespace);
    }

    /// Drop cached bundles. `None` for a dimension means "all".
    pub fn clear_cache(&self, language: Option<&str>, namespace: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        state.bundles.retain(|(l, n), _| {
            let language_matches = language.map(|want| want == l).unwrap_or(true);
            let namespace_matches = namespace.map(|want| want == n).unwrap_or(true);
            !(language_matches && namespace_matches)
        });
    }

    /// Snapshot every cached bundle as `{language: {namespace: tree}}`.
    pub fn export_all(&self) -> Value {
        let state = self.state.lock().unwrap();
        let mut root = Map::new();
        let mut keys: Vec<&BundleKey> = state.bundles.keys().collect();
        keys.sort();
        for (language, namespace) in keys {
            let bundle = &state.bundles[&(language.clone(), namespace.clone())];
            if let Some(per_language) = root
                .entry(language.clone())
                .or_insert_with(|| json!({}))
                .as_object_mut()
            {
                per_language.insert(namespace.clone(), bundle.tree().clone());
            }
        }
        Value::Object(root)
    }

    /// Merge an `export_all` snapshot into the cache, overwriting any
    /// bundle the snapshot carries and leaving the rest untouched. Returns
    /// the number of bundles imported.
    pub fn import_all(&self, snapshot: &Value) -> Result<usize, I18nError> {
        let languages = snapshot.as_object().ok_or_else(|| I18nError::InvalidValue {
            kind: "catalog snapshot",
            message: "root must be an object keyed by language".to_string(),
        })?;

        let mut imported = HashMap::new();
        for (language, per_language) in languages {
            let namespaces =
                per_language
                    .as_object()
                    .ok_or_else(|| I18nError::InvalidValue {
                        kind: "catalog snapshot",
                        message: format!("entry for '{language}' must be an object"),
                    })?;
            for (namespace, tree) in namespaces {
                imported.insert(
                    (language.clone(), namespace.clone()),
                    Arc::new(TranslationBundle::new(language, namespace, tree.clone())),
                );
            }
        }

        let count = imported.len();
        let keys: Vec<BundleKey> = imported.keys().cloned().collect();
        {
            let mut state = self.state.lock().unwrap();
            state.bundles.extend(imported);
        }
        for (language, namespace) in &keys {
            self.notify(language, namespace);
        }
        info!(bundles = count, "Imported catalog snapshot");
        Ok(count)
    }

    /// Validate the cached bundles of `language` against those of
    /// `reference_language`. Only namespaces present in either cache are
    /// considered; call `load_language` first for a full picture.
    pub fn validate(
        &self,
        language: &str,
        reference_language: &str,
        validator: &BundleValidator,
    ) -> ValidationReport {
        let (reference, target) = {
            let state = self.state.lock().unwrap();
            (
                self.flatten_language(&state, reference_language),
                self.flatten_language(&state, language),
            )
        };
        validator.validate(language, reference_language, &reference, &target)
    }

    fn flatten_language(&self, state: &StoreState, language: &str) -> FlatBundles {
        state
            .bundles
            .iter()
            .filter(|((l, _), _)| l == language)
            .map(|((_, namespace), bundle)| (namespace.clone(), bundle.flatten()))
            .collect()
    }

    /// Register a listener invoked with `(language, namespace)` after every
    /// mutation. Returns a token for `unsubscribe`.
    pub fn subscribe(&self, listener: impl Fn(&str, &str) + Send + Sync + 'static) -> u64 {
        let mut next_id = self.next_listener_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        self.listeners
            .lock()
            .unwrap()
            .push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify(&self, language: &str, namespace: &str) {
        let listeners = self.listeners.lock().unwrap();
        for (_, listener) in listeners.iter() {
            listener(language, namespace);
        }
    }

    pub fn missing_report(&self) -> MissingReport {
        self.missing.report()
    }

    /// Drain the missing tracker as a telemetry batch.
    pub fn submit_missing(&self) -> MissingReport {
        self.missing.submit()
    }

    pub fn is_loaded(&self, language: &str, namespace: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .bundles
            .contains_key(&(language.to_string(), namespace.to_string()))
    }

    #[cfg(test)]
    fn cached_bundle_count(&self) -> usize {
        self.state.lock().unwrap().bundles.len()
    }
}
