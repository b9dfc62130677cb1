//! Process-wide map from message types to shared codecs.
//!
//! Lookups of constructed entries take only the read lock. A miss inserts an
//! empty per-type slot under a brief write lock, then builds the schema while
//! holding only that slot's build lock. Concurrent first-time callers for the
//! same type observe exactly one construction and all receive the same `Arc`,
//! while lookups of other types proceed. A failed build publishes nothing.

use dyncodec_codec::MessageCodec;
use dyncodec_core::CodecConfig;
use dyncodec_schema::{SchemaAdapter, SchemaError, TypeSupport};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Registry key: DDS-style type name plus typesupport identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    type_name: String,
    identifier: String,
}

impl TypeKey {
    /// Creates a key from its parts.
    #[must_use]
    pub fn new(type_name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            identifier: identifier.into(),
        }
    }

    /// Derives the key of a typesupport handle.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownTypesupport`] or
    /// [`SchemaError::InvalidTypeName`].
    pub fn from_type_support(type_support: &TypeSupport) -> Result<Self, SchemaError> {
        Ok(Self::new(type_support.type_name()?, type_support.identifier()))
    }

    /// Returns the type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the typesupport identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.type_name, self.identifier)
    }
}

/// Registry counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Lookups served from an existing entry.
    pub hits: u64,
    /// Schemas built and published.
    pub constructions: u64,
    /// Builds that failed.
    pub failures: u64,
}

/// One registry slot. Empty until its first successful build.
#[derive(Debug, Default)]
struct Entry {
    codec: OnceLock<Arc<MessageCodec>>,
    build: Mutex<()>,
}

impl Entry {
    fn codec(&self) -> Option<Arc<MessageCodec>> {
        self.codec.get().cloned()
    }
}

/// Thread-safe cache of per-type codecs.
///
/// # Example
/// ```
/// use dyncodec_registry::TypeRegistry;
/// use dyncodec_schema::{INTROSPECTION_C, MembersBuilder, TypeSupport, type_id};
/// use std::sync::Arc;
///
/// let registry = TypeRegistry::new();
/// let members = MembersBuilder::new("std_msgs__msg", "Bool")
///     .field("data", type_id::BOOLEAN)
///     .build();
/// let ts = TypeSupport::new(INTROSPECTION_C, members);
///
/// let first = registry.get_or_create(&ts).unwrap();
/// let again = registry.get_or_create(&ts).unwrap();
/// assert!(Arc::ptr_eq(&first, &again));
/// assert_eq!(first.type_name(), "std_msgs::msg::dps_::Bool_");
/// ```
#[derive(Debug)]
pub struct TypeRegistry {
    entries: RwLock<HashMap<TypeKey, Arc<Entry>>>,
    config: CodecConfig,
    hits: AtomicU64,
    constructions: AtomicU64,
    failures: AtomicU64,
}

impl TypeRegistry {
    /// Creates an empty registry with the default codec configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Creates an empty registry whose codecs use `config`.
    #[must_use]
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            constructions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Returns the configuration handed to every codec.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Returns the codec for `type_support`, building it on first use.
    ///
    /// # Errors
    /// Returns the [`SchemaError`] of a failed build. Nothing is cached in
    /// that case, so a later call retries.
    pub fn get_or_create(
        &self,
        type_support: &TypeSupport,
    ) -> Result<Arc<MessageCodec>, SchemaError> {
        let key = TypeKey::from_type_support(type_support).inspect_err(|e| {
            self.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Rejected typesupport {}: {}", type_support.identifier(), e);
        })?;

        if let Some(hit) = self.lookup(&key) {
            self.record_hit(&key);
            return Ok(hit);
        }

        let entry = self.slot(&key);
        let _building = entry.build.lock();
        if let Some(hit) = entry.codec() {
            self.record_hit(&key);
            return Ok(hit);
        }

        let start = Instant::now();
        let schema = SchemaAdapter::from_config(&self.config)
            .build(type_support)
            .inspect_err(|e| {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Failed to build schema for {}: {}", key, e);
            })?;

        let codec = Arc::new(MessageCodec::with_config(schema, self.config));
        tracing::debug!(
            "Registered {} ({} fields, {} bytes) in {:?}",
            key,
            codec.schema().fields().len(),
            codec.schema().size(),
            start.elapsed()
        );
        let codec = Arc::clone(entry.codec.get_or_init(|| codec));
        self.constructions.fetch_add(1, Ordering::Relaxed);
        Ok(codec)
    }

    /// Returns the codec registered under `type_name` and `identifier`.
    #[must_use]
    pub fn get(&self, type_name: &str, identifier: &str) -> Option<Arc<MessageCodec>> {
        self.lookup(&TypeKey::new(type_name, identifier))
    }

    /// Returns true if an entry exists for `type_name` and `identifier`.
    #[must_use]
    pub fn contains(&self, type_name: &str, identifier: &str) -> bool {
        self.lookup(&TypeKey::new(type_name, identifier)).is_some()
    }

    /// Removes one entry. Holders of the codec keep it alive.
    pub fn remove(&self, type_name: &str, identifier: &str) -> Option<Arc<MessageCodec>> {
        let key = TypeKey::new(type_name, identifier);
        let removed = self.entries.write().remove(&key)?.codec();
        if removed.is_some() {
            tracing::debug!("Unregistered {}", key);
        }
        removed
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let count = entries.values().filter(|e| e.codec.get().is_some()).count();
        entries.clear();
        tracing::debug!("Cleared type registry ({} entries)", count);
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|e| e.codec.get().is_some())
            .count()
    }

    /// Returns true if the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the keys of all entries.
    #[must_use]
    pub fn keys(&self) -> Vec<TypeKey> {
        self.entries
            .read()
            .iter()
            .filter(|(_, e)| e.codec.get().is_some())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            hits: self.hits.load(Ordering::Relaxed),
            constructions: self.constructions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, key: &TypeKey) -> Option<Arc<MessageCodec>> {
        self.entries.read().get(key).and_then(|e| e.codec())
    }

    /// Returns the slot for `key`, inserting an empty one if absent.
    fn slot(&self, key: &TypeKey) -> Arc<Entry> {
        if let Some(entry) = self.entries.read().get(key) {
            return Arc::clone(entry);
        }
        Arc::clone(self.entries.write().entry(key.clone()).or_default())
    }

    fn record_hit(&self, key: &TypeKey) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Registry hit for {}", key);
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
