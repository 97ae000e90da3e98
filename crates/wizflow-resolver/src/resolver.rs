//! Symbolic template resolver
//!
//! Maps `(category, symbolic id)` to one concrete component:
//! 1. Memoized hit (bounded `moka` cache)
//! 2. First pack in priority order exposing the id
//! 3. For flow steps only: strip one suffix and retry once
//!
//! Resolution never fails. A miss yields a [`Resolution`] without component
//! and with a [`MissingTemplate`] diagnostic.

use crate::category::{Category, NodeType};
use crate::config::ResolverConfig;
use crate::error::{MissingTemplate, RegistryError};
use crate::pack::TemplatePack;
use moka::sync::Cache;
use parking_lot::RwLock;
use regex::Regex;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of one resolution
#[derive(Debug, Clone)]
pub struct Resolution<C> {
    /// Category searched
    pub category: Category,
    /// Id as requested
    pub requested: String,
    /// Id that matched (differs from `requested` after a fallback)
    pub resolved_id: Option<String>,
    /// Pack that supplied the component
    pub pack: Option<String>,
    /// Resolved component
    pub component: Option<C>,
    /// Present when nothing matched
    pub diagnostic: Option<MissingTemplate>,
}

impl<C> Resolution<C> {
    /// Check if a component was found
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.component.is_some()
    }

    /// Check if the component came from the suffix fallback
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.resolved_id
            .as_deref()
            .is_some_and(|id| id != self.requested)
    }

    fn found(category: Category, requested: &str, hit: Hit<C>) -> Self {
        Self {
            category,
            requested: requested.to_string(),
            resolved_id: Some(hit.id),
            pack: Some(hit.pack),
            component: Some(hit.component),
            diagnostic: None,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of memoized resolutions
    pub entry_count: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that scanned the packs
    pub misses: u64,
}

#[derive(Clone)]
struct Hit<C> {
    id: String,
    pack: String,
    component: C,
}

type CacheKey = (Category, String);

/// Resolver over an ordered set of template packs
///
/// Share it behind an `Arc`; registration uses interior mutability.
pub struct Resolver<C> {
    packs: RwLock<Vec<TemplatePack<C>>>,
    cache: Cache<CacheKey, Hit<C>>,
    suffix: Regex,
    config: ResolverConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<C> Debug for Resolver<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let packs: Vec<String> = self.packs.read().iter().map(|p| p.name().to_string()).collect();
        f.debug_struct("Resolver")
            .field("packs", &packs)
            .field("suffix", &self.suffix.as_str())
            .finish_non_exhaustive()
    }
}

impl<C: Clone + Send + Sync + 'static> Resolver<C> {
    /// Create resolver with no packs
    ///
    /// # Errors
    /// Returns error if the fallback suffix pattern does not compile.
    pub fn new(config: ResolverConfig) -> Result<Self, RegistryError> {
        let suffix = Regex::new(&config.fallback_suffix_pattern)?;
        Ok(Self {
            packs: RwLock::new(Vec::new()),
            cache: Cache::new(config.cache_capacity),
            suffix,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Create resolver with default configuration and the given packs
    ///
    /// # Errors
    /// Returns error on duplicate pack names.
    pub fn with_packs(
        packs: impl IntoIterator<Item = TemplatePack<C>>,
    ) -> Result<Self, RegistryError> {
        let resolver = Self::new(ResolverConfig::default())?;
        for pack in packs {
            resolver.register(pack)?;
        }
        Ok(resolver)
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Register a pack and invalidate memoized resolutions
    ///
    /// Packs are consulted by descending priority; ties keep registration
    /// order.
    ///
    /// # Errors
    /// Returns error if a pack with the same name is already registered.
    pub fn register(&self, pack: TemplatePack<C>) -> Result<(), RegistryError> {
        let mut packs = self.packs.write();
        if packs.iter().any(|p| p.name() == pack.name()) {
            return Err(RegistryError::DuplicatePack(pack.name().to_string()));
        }

        tracing::debug!(
            pack = pack.name(),
            priority = pack.priority(),
            components = pack.len(),
            "template pack registered"
        );
        packs.push(pack);
        packs.sort_by_key(|p| Reverse(p.priority()));
        self.cache.invalidate_all();
        Ok(())
    }

    /// Remove a pack by name
    pub fn unregister(&self, name: &str) -> bool {
        let mut packs = self.packs.write();
        let before = packs.len();
        packs.retain(|p| p.name() != name);
        let removed = packs.len() != before;
        if removed {
            self.cache.invalidate_all();
            tracing::debug!(pack = name, "template pack removed");
        }
        removed
    }

    /// Resolve `id` in `category`
    ///
    /// A total miss is logged at `warn`.
    pub fn resolve(&self, category: Category, id: &str) -> Resolution<C> {
        let resolution = self.find(category, id);
        if let Some(diagnostic) = &resolution.diagnostic {
            tracing::warn!(%diagnostic, "template not resolved");
        }
        resolution
    }

    /// Same lookup as [`resolve`](Self::resolve), but a miss is only logged
    /// at `debug`
    ///
    /// For callers that try further candidates before giving up.
    pub fn find(&self, category: Category, id: &str) -> Resolution<C> {
        let key = (category, id.to_string());
        if let Some(hit) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%category, id, "template cache hit");
            return Resolution::found(category, id, hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // Insert while holding the read guard so a concurrent register
        // cannot invalidate before this hit lands.
        let packs = self.packs.read();
        if let Some(hit) = lookup(&packs, category, id) {
            self.cache.insert(key, hit.clone());
            return Resolution::found(category, id, hit);
        }

        let fallback = match category {
            Category::FlowStep => self.strip_suffix(id),
            Category::Layout | Category::Widget => None,
        };
        if let Some(fallback_id) = &fallback {
            if let Some(hit) = lookup(&packs, category, fallback_id) {
                tracing::debug!(
                    %category,
                    id,
                    fallback = %fallback_id,
                    "template resolved by fallback"
                );
                self.cache.insert(key, hit.clone());
                return Resolution::found(category, id, hit);
            }
        }

        let diagnostic = MissingTemplate {
            category,
            requested: id.to_string(),
            attempted_fallback: fallback,
            available: collect_ids(&packs),
        };
        drop(packs);

        tracing::debug!(%diagnostic, "template lookup missed");
        Resolution {
            category,
            requested: id.to_string(),
            resolved_id: None,
            pack: None,
            component: None,
            diagnostic: Some(diagnostic),
        }
    }

    /// Resolve the default flow step for a coarse node type
    pub fn resolve_for_node_type(&self, node_type: NodeType) -> Resolution<C> {
        self.resolve(Category::FlowStep, self.config.step_id_for(node_type))
    }

    /// Quiet variant of [`resolve_for_node_type`](Self::resolve_for_node_type)
    pub fn find_for_node_type(&self, node_type: NodeType) -> Resolution<C> {
        self.find(Category::FlowStep, self.config.step_id_for(node_type))
    }

    /// Registered ids per category, sorted and deduplicated
    #[must_use]
    pub fn available_ids(&self) -> BTreeMap<Category, Vec<String>> {
        collect_ids(&self.packs.read())
    }

    /// Pack names in consultation order
    #[must_use]
    pub fn pack_names(&self) -> Vec<String> {
        self.packs
            .read()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Cache statistics
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.run_pending_tasks();
        CacheStats {
            entry_count: self.cache.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn strip_suffix(&self, id: &str) -> Option<String> {
        let stripped = self.suffix.replace(id, "");
        (!stripped.is_empty() && stripped != id).then(|| stripped.into_owned())
    }
}

fn lookup<C: Clone>(packs: &[TemplatePack<C>], category: Category, id: &str) -> Option<Hit<C>> {
    packs.iter().find_map(|pack| {
        pack.get(category, id).map(|component| Hit {
            id: id.to_string(),
            pack: pack.name().to_string(),
            component: component.clone(),
        })
    })
}

fn collect_ids<C>(packs: &[TemplatePack<C>]) -> BTreeMap<Category, Vec<String>> {
    Category::ALL
        .iter()
        .map(|&category| {
            let mut ids: Vec<String> = packs
                .iter()
                .flat_map(|p| p.ids(category))
                .map(str::to_string)
                .collect();
            ids.sort();
            ids.dedup();
            (category, ids)
        })
        .collect()
}
