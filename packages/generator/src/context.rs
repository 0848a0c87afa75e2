//! Semantic Context
//!
//! Owns the handle to the host compilation and memoizes its expensive
//! lookups. All caches populate at most once per key, even under
//! concurrent callers: the semantic-model and type caches go through the
//! concurrent map's entry API (the populating closure runs under the
//! shard lock), the runtime-reference probe through a single-init cell.
//! The cancellation signal is checked before every cache-miss
//! computation.

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use relay_host::{Cancelled, CancellationToken, Compilation, SemanticModel, TypeSymbol};
use std::sync::Arc;

/// Library name of the Relay dispatch runtime.
const RUNTIME_LIBRARY: &str = "Relay";

pub struct SemanticContext {
    compilation: Arc<Compilation>,
    token: CancellationToken,
    models: DashMap<usize, Arc<SemanticModel>>,
    // Negative lookups are cached as None so repeated failing probes of the
    // same name stay O(1).
    types: DashMap<String, Option<TypeSymbol>>,
    has_runtime_reference: OnceCell<bool>,
}

impl SemanticContext {
    pub fn new(compilation: Arc<Compilation>, token: CancellationToken) -> Self {
        SemanticContext {
            compilation,
            token,
            models: DashMap::new(),
            types: DashMap::new(),
            has_runtime_reference: OnceCell::new(),
        }
    }

    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Memoized semantic model for the tree at `tree_index`. Every caller
    /// observes the same instance; the model is built at most once.
    pub fn semantic_model(&self, tree_index: usize) -> Result<Option<Arc<SemanticModel>>, Cancelled> {
        if let Some(model) = self.models.get(&tree_index) {
            return Ok(Some(model.clone()));
        }
        self.token.checkpoint()?;
        if self.compilation.trees().get(tree_index).is_none() {
            return Ok(None);
        }
        let entry = self
            .models
            .entry(tree_index)
            .or_insert_with(|| match self.compilation.semantic_model(tree_index) {
                Some(model) => Arc::new(model),
                // Guarded by the bounds probe above.
                None => unreachable!("tree index was validated before insertion"),
            });
        Ok(Some(entry.clone()))
    }

    /// Memoized type lookup by fully qualified name.
    pub fn find_type(&self, fqn: &str) -> Result<Option<TypeSymbol>, Cancelled> {
        if let Some(cached) = self.types.get(fqn) {
            return Ok(cached.clone());
        }
        self.token.checkpoint()?;
        let entry = self
            .types
            .entry(fqn.to_string())
            .or_insert_with(|| self.compilation.find_type(fqn).cloned());
        Ok(entry.clone())
    }

    /// Whether the compilation references the Relay runtime library.
    /// Evaluated lazily exactly once.
    pub fn has_runtime_reference(&self) -> bool {
        *self.has_runtime_reference.get_or_init(|| {
            self.compilation.references().iter().any(|r| {
                r.name == RUNTIME_LIBRARY
                    || r.name.starts_with(&format!("{}.", RUNTIME_LIBRARY))
            })
        })
    }
}
