use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use sha2::{Digest, Sha256};

use super::llm::LlmClient;
use super::parser::parse_mapping_response;
use super::prompt::{build_normalization_prompt, NORMALIZATION_SYSTEM_PROMPT};
use super::NormalizationError;
use crate::comparison::NameMapping;

/// Distinct name sets remembered before the oldest is evicted.
const DEFAULT_CACHE_CAPACITY: usize = 64;

type MappingFuture = Shared<BoxFuture<'static, Result<NameMapping, NormalizationError>>>;

/// Requests keyed by name-set digest; finished successes stay as cache hits.
struct RequestCache {
    entries: HashMap<String, MappingFuture>,
    order: VecDeque<String>,
    capacity: usize,
}

impl RequestCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn insert(&mut self, key: String, future: MappingFuture) {
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, future);
    }

    /// Remove `key` only if it still refers to `future`.
    fn evict_if_same(&mut self, key: &str, future: &MappingFuture) {
        let same = self
            .entries
            .get(key)
            .map(|current| current.ptr_eq(future))
            .unwrap_or(false);
        if same {
            self.entries.remove(key);
            self.order.retain(|k| k != key);
        }
    }
}

/// Clusters raw test names into canonical names via the language model.
///
/// Concurrent calls for the same name set share one request.
pub struct NameNormalizer {
    llm: Arc<dyn LlmClient>,
    model: String,
    cache: Mutex<RequestCache>,
}

impl NameNormalizer {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self::with_capacity(llm, model, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(llm: Arc<dyn LlmClient>, model: impl Into<String>, capacity: usize) -> Self {
        Self {
            llm,
            model: model.into(),
            cache: Mutex::new(RequestCache::new(capacity)),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn llm(&self) -> Arc<dyn LlmClient> {
        Arc::clone(&self.llm)
    }

    /// Map every name in `names` to a canonical name.
    ///
    /// An empty name set succeeds without a request. Names the model leaves
    /// out are absent from the mapping; `NameMapping::resolve` treats them
    /// as identity.
    pub async fn normalize<I, S>(&self, names: I) -> Result<NameMapping, NormalizationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .filter(|n| !n.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if names.is_empty() {
            return Ok(NameMapping::new());
        }

        let key = cache_key(&names);
        let future = {
            let mut cache = self
                .cache
                .lock()
                .map_err(|_| NormalizationError::LockPoisoned)?;
            match cache.entries.get(&key) {
                Some(existing) => {
                    tracing::debug!(names = names.len(), "Joining existing normalization request");
                    existing.clone()
                }
                None => {
                    let future = self.spawn_request(names);
                    cache.insert(key.clone(), future.clone());
                    future
                }
            }
        };

        let result = future.clone().await;
        if result.is_err() {
            if let Ok(mut cache) = self.cache.lock() {
                cache.evict_if_same(&key, &future);
            }
        }
        result
    }

    fn spawn_request(&self, names: Vec<String>) -> MappingFuture {
        let llm = Arc::clone(&self.llm);
        let model = self.model.clone();

        async move {
            tokio::task::spawn_blocking(move || request_mapping(llm.as_ref(), &model, &names))
                .await
                .map_err(|e| NormalizationError::Task(e.to_string()))?
        }
        .boxed()
        .shared()
    }
}

/// One blocking round-trip to the model for the whole name list.
fn request_mapping(
    llm: &dyn LlmClient,
    model: &str,
    names: &[String],
) -> Result<NameMapping, NormalizationError> {
    let started = Instant::now();
    let prompt = build_normalization_prompt(names);
    let response = llm.generate(model, &prompt, NORMALIZATION_SYSTEM_PROMPT)?;
    let mapping = parse_mapping_response(&response, names)?;

    let canonical: BTreeSet<&str> = mapping.iter().map(|(_, c)| c).collect();
    tracing::info!(
        model,
        names = names.len(),
        mapped = mapping.len(),
        canonical = canonical.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Test names normalized"
    );
    Ok(mapping)
}

/// SHA-256 over the sorted names, NUL-separated.
fn cache_key(names: &[String]) -> String {
    let mut hasher = Sha256::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
