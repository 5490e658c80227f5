//! # Layout Resolution
//!
//! Maps a schema id to its compiled [`Layout`]. Two implementations:
//!
//! - [`NamespaceResolver`]: compiles schemas from a namespace on demand and
//!   caches the result, falling back to a parent resolver for ids it does not
//!   own. The default parent is the system resolver, so every namespace
//!   resolver also understands the segment and record schemas.
//! - [`FnResolver`]: wraps a caller-supplied function, no caching.
//!
//! ## Concurrency
//!
//! The cache is a `parking_lot::RwLock` over a hash map. Lookups take the
//! read lock only. A miss compiles outside of any lock and then inserts with
//! first-writer-wins semantics; two threads racing on the same id both compile
//! but every caller ends up with the single cached `Arc`.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::layout::compiler::LayoutCompiler;
use crate::layout::system;
use crate::layout::Layout;
use crate::schema::{Namespace, SchemaId};

pub trait LayoutResolver: Send + Sync {
    fn try_resolve(&self, schema_id: SchemaId) -> Result<Arc<Layout>, ResolveError>;

    /// Resolves `schema_id`, panicking if it is unknown or does not compile.
    ///
    /// Asking for a schema that was never registered is a programming error.
    fn resolve(&self, schema_id: SchemaId) -> Arc<Layout> {
        match self.try_resolve(schema_id) {
            Ok(layout) => layout,
            Err(err) => panic!("failed to resolve layout for schema {}: {}", schema_id, err),
        }
    }
}

pub struct NamespaceResolver {
    namespace: Arc<Namespace>,
    parent: Option<Arc<dyn LayoutResolver>>,
    cache: RwLock<HashMap<SchemaId, Arc<Layout>>>,
    allow_reserved: bool,
}

impl NamespaceResolver {
    /// Resolver over `namespace` with the system resolver as parent.
    pub fn new(namespace: impl Into<Arc<Namespace>>) -> Self {
        Self::with_parent(namespace, Some(system::resolver() as Arc<dyn LayoutResolver>))
    }

    pub fn with_parent(
        namespace: impl Into<Arc<Namespace>>,
        parent: Option<Arc<dyn LayoutResolver>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            parent,
            cache: RwLock::new(HashMap::new()),
            allow_reserved: false,
        }
    }

    /// Resolver for the built-in namespace, the only one allowed to use
    /// reserved schema ids.
    pub(crate) fn system(namespace: Namespace) -> Self {
        Self {
            allow_reserved: true,
            ..Self::with_parent(namespace, None)
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    fn compile_local(&self, schema_id: SchemaId) -> Option<Result<Layout, ResolveError>> {
        let schema = self
            .namespace
            .schemas()
            .iter()
            .find(|schema| schema.id() == schema_id)?;
        let compiled = if self.allow_reserved {
            LayoutCompiler::compile_unchecked(&self.namespace, schema)
        } else {
            LayoutCompiler::compile(&self.namespace, schema)
        };
        Some(compiled.map_err(ResolveError::from))
    }
}

impl LayoutResolver for NamespaceResolver {
    fn try_resolve(&self, schema_id: SchemaId) -> Result<Arc<Layout>, ResolveError> {
        if let Some(layout) = self.cache.read().get(&schema_id) {
            return Ok(Arc::clone(layout));
        }

        let layout = match self.compile_local(schema_id) {
            Some(compiled) => {
                debug!(namespace = %self.namespace.name, schema_id, "layout cache miss");
                Arc::new(compiled?)
            }
            None => match &self.parent {
                Some(parent) => {
                    trace!(
                        namespace = %self.namespace.name,
                        schema_id,
                        "delegating to parent resolver"
                    );
                    parent.try_resolve(schema_id)?
                }
                None => return Err(ResolveError::NotFound(schema_id)),
            },
        };

        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(schema_id).or_insert(layout)))
    }
}

impl std::fmt::Debug for NamespaceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceResolver")
            .field("namespace", &self.namespace.name)
            .field("has_parent", &self.parent.is_some())
            .field("cached", &self.cached_len())
            .finish()
    }
}

pub struct FnResolver<F> {
    resolve: F,
}

impl<F> FnResolver<F>
where
    F: Fn(SchemaId) -> Option<Arc<Layout>> + Send + Sync,
{
    pub fn new(resolve: F) -> Self {
        Self { resolve }
    }
}

impl<F> LayoutResolver for FnResolver<F>
where
    F: Fn(SchemaId) -> Option<Arc<Layout>> + Send + Sync,
{
    fn try_resolve(&self, schema_id: SchemaId) -> Result<Arc<Layout>, ResolveError> {
        (self.resolve)(schema_id).ok_or(ResolveError::NotFound(schema_id))
    }
}
