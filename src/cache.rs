//! Content-addressed memoization of loaded sources.
//!
//! A source is re-parsed only when the SHA-256 digest of its bytes (or the
//! schema it was read with) changes. Loaded values are shared as `Arc`s and
//! never mutated.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{
    Error, Result,
    io::{GeometryLayer, read_geometry_layer_bytes, read_score_table_bytes},
    table::{ScoreTable, TableSchema},
};

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[derive(Debug)]
struct Entry<V, T> {
    digest: String,
    variant: V,
    value: Arc<T>,
}

type Slot<V, T> = RwLock<HashMap<PathBuf, Entry<V, T>>>;

/// Memoized score tables and geometry layers, keyed by path.
#[derive(Debug, Default)]
pub struct SourceCache {
    tables: Slot<TableSchema, ScoreTable>,
    layers: Slot<String, GeometryLayer>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score table at `path`, parsed only if its content or `schema` changed.
    pub fn score_table(&self, path: &Path, schema: &TableSchema) -> Result<Arc<ScoreTable>> {
        load(&self.tables, path, schema, |bytes| read_score_table_bytes(bytes, schema))
    }

    /// Geometry layer at `path`, parsed only if its content or `key_field` changed.
    pub fn geometry_layer(&self, path: &Path, key_field: &str) -> Result<Arc<GeometryLayer>> {
        load(&self.layers, path, &key_field.to_string(), |bytes| read_geometry_layer_bytes(bytes, key_field))
    }

    /// Digest recorded for `path`'s score table, if cached.
    pub fn table_digest(&self, path: &Path) -> Option<String> {
        let map = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        map.get(path).map(|e| e.digest.clone())
    }

    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
            + self.layers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.tables.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.layers.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

fn load<V, T>(slot: &Slot<V, T>, path: &Path, variant: &V, parse: impl FnOnce(&[u8]) -> Result<T>) -> Result<Arc<T>>
where
    V: Clone + PartialEq,
{
    let bytes = fs::read(path).map_err(|e| Error::from_open(e, path))?;
    let digest = sha256_hex(&bytes);

    {
        let map = slot.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = map.get(path) {
            if entry.digest == digest && entry.variant == *variant {
                debug!(path = %path.display(), "cache hit");
                return Ok(entry.value.clone());
            }
        }
    }

    let value = Arc::new(parse(&bytes)?);
    debug!(path = %path.display(), digest = %&digest[..12], "cache miss, parsed source");
    slot.write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(path.to_path_buf(), Entry { digest, variant: variant.clone(), value: value.clone() });
    Ok(value)
}
