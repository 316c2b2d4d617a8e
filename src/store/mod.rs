//! Transactional access to the multi-graph triple store.
//!
//! [`GraphStore`] is the single session factory handed to every engine. It
//! wraps an oxigraph [`Store`] and enforces the session discipline on top of
//! it:
//!
//! - at most one write session at a time (`begin(Write)` blocks while another
//!   writer is active);
//! - any number of concurrent read sessions, each pinned to the published
//!   snapshot current when it opened;
//! - write sessions buffer their changes and publish them atomically on
//!   [`Session::commit`]; dropping an uncommitted session discards them.
//!
//! The published snapshot is an in-memory copy of the store that is never
//! mutated. A commit stages the next copy, commits the backing store in one
//! transaction and then swaps the snapshot, so readers never wait on writers
//! and a commit never waits on readers.

mod session;

pub use session::{AccessMode, Session};

use crate::config::EngineConfig;
use crate::error::{OntologyError, OntologyResult};
use oxigraph::model::NamedNode;
use oxigraph::store::{StorageError, Store};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use tracing::{debug, info};

pub struct GraphStore {
    inner: Store,
    base_iri: String,
    writer: Mutex<()>,
    published: RwLock<Store>,
}

impl GraphStore {
    /// Wraps an existing oxigraph store.
    pub fn new(inner: Store, base_iri: impl Into<String>) -> OntologyResult<Self> {
        let base_iri = base_iri.into();
        NamedNode::new(base_iri.as_str())?;
        let published = copy_store(&inner)?;
        Ok(Self {
            inner,
            base_iri: base_iri.trim_end_matches(['/', '#']).to_string(),
            writer: Mutex::new(()),
            published: RwLock::new(published),
        })
    }

    pub fn in_memory(base_iri: impl Into<String>) -> OntologyResult<Self> {
        Self::new(Store::new()?, base_iri)
    }

    /// Opens (or creates) a persistent store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P, base_iri: impl Into<String>) -> OntologyResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening persistent graph store");
        Self::new(Store::open(path)?, base_iri)
    }

    pub fn from_config(config: &EngineConfig) -> OntologyResult<Self> {
        match config.store_path.as_ref() {
            Some(path) => Self::open(path, config.base_iri.clone()),
            None => Self::in_memory(config.base_iri.clone()),
        }
    }

    /// Namespace under which graph names and locally created entities live.
    pub fn base_iri(&self) -> &str {
        &self.base_iri
    }

    /// Maps a graph name to the IRI naming it inside the store. Absolute IRIs
    /// pass through unchanged.
    pub fn graph_iri(&self, name: &str) -> OntologyResult<NamedNode> {
        if is_absolute(name) {
            return Ok(NamedNode::new(name)?);
        }
        Ok(NamedNode::new(format!("{}/{}", self.base_iri, name))?)
    }

    /// Begins a session. Blocks while another write session is active when
    /// `mode` is [`AccessMode::Write`].
    pub fn begin(&self, mode: AccessMode) -> Session<'_> {
        match mode {
            AccessMode::Read => {
                let snapshot = self.snapshot();
                debug!("read session opened");
                Session::read(self, snapshot)
            }
            AccessMode::Write => {
                let writer = self.writer.lock();
                debug!("write session opened");
                Session::write(self, writer, self.inner.clone())
            }
        }
    }

    pub fn read(&self) -> Session<'_> {
        self.begin(AccessMode::Read)
    }

    pub fn write(&self) -> Session<'_> {
        self.begin(AccessMode::Write)
    }

    /// Runs `work` inside a write session and commits when it returns `Ok`.
    /// Any error (from `work` or from the commit) leaves the store untouched.
    pub fn write_with<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut Session<'_>) -> Result<T, E>,
        E: From<OntologyError>,
    {
        let mut session = self.write();
        let value = work(&mut session)?;
        session.commit()?;
        Ok(value)
    }

    /// Runs `work` inside a read session that ends when it returns.
    pub fn read_with<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Session<'_>) -> Result<T, E>,
    {
        let session = self.read();
        work(&session)
    }

    /// The currently published snapshot.
    pub(crate) fn snapshot(&self) -> Store {
        self.published.read().clone()
    }

    pub(crate) fn publish(&self, next: Store) {
        *self.published.write() = next;
    }
}

/// Independent in-memory copy of `source`, empty named graphs included.
pub(crate) fn copy_store(source: &Store) -> Result<Store, StorageError> {
    let copy = Store::new()?;
    let mut transaction = copy.start_transaction()?;
    for graph in source.named_graphs() {
        transaction.insert_named_graph(graph?.as_ref());
    }
    for quad in source.iter() {
        transaction.insert(&quad?);
    }
    transaction.commit()?;
    Ok(copy)
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("base_iri", &self.base_iri)
            .finish_non_exhaustive()
    }
}

pub(crate) fn is_absolute(identifier: &str) -> bool {
    identifier.contains("://") || identifier.starts_with("urn:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_names_resolve_under_the_base() {
        let store = GraphStore::in_memory("http://ontologies.example.org/").unwrap();
        assert_eq!(store.base_iri(), "http://ontologies.example.org");
        assert_eq!(
            store.graph_iri("restaurant").unwrap().as_str(),
            "http://ontologies.example.org/restaurant"
        );
        assert_eq!(
            store.graph_iri("urn:graph:forms").unwrap().as_str(),
            "urn:graph:forms"
        );
    }

    #[test]
    fn snapshot_is_independent_of_the_backing_store() {
        let store = GraphStore::in_memory("http://ontologies.example.org").unwrap();
        let graph = store.graph_iri("g").unwrap();
        store.inner.insert_named_graph(graph.as_ref()).unwrap();

        let copy = copy_store(&store.inner).unwrap();
        assert!(copy.contains_named_graph(graph.as_ref()).unwrap());
        store.inner.remove_named_graph(graph.as_ref()).unwrap();
        assert!(copy.contains_named_graph(graph.as_ref()).unwrap());
        assert!(!store.snapshot().contains_named_graph(graph.as_ref()).unwrap());
    }

    #[test]
    fn rejects_relative_base() {
        assert!(GraphStore::in_memory("not an iri").is_err());
    }
}
