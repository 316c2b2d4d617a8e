use super::{GraphStore, copy_store};
use crate::error::{OntologyError, OntologyResult};
use indexmap::IndexSet;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{
    GraphName, GraphNameRef, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad,
    QuadRef, TermRef,
};
use oxigraph::store::{StorageError, Store, Transaction};
use parking_lot::MutexGuard;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    Committed,
    Aborted,
}

/// Changes buffered by a write session until commit.
#[derive(Debug, Default)]
struct Overlay {
    inserted: IndexSet<Quad>,
    removed: HashSet<Quad>,
    created_graphs: IndexSet<NamedNode>,
    dropped_graphs: HashSet<NamedNode>,
}

impl Overlay {
    fn is_empty(&self) -> bool {
        self.inserted.is_empty()
            && self.removed.is_empty()
            && self.created_graphs.is_empty()
            && self.dropped_graphs.is_empty()
    }
}

/// Scoped transactional handle on a [`GraphStore`].
///
/// The transaction ends when the session is committed, aborted, or dropped;
/// dropping an active session aborts it. Read sessions query the snapshot
/// published when they opened; the write session queries the backing store,
/// which only it can change.
pub struct Session<'a> {
    store: &'a GraphStore,
    mode: AccessMode,
    state: SessionState,
    overlay: Overlay,
    source: Store,
    _writer: Option<MutexGuard<'a, ()>>,
}

impl<'a> Session<'a> {
    pub(super) fn read(store: &'a GraphStore, snapshot: Store) -> Self {
        Self {
            store,
            mode: AccessMode::Read,
            state: SessionState::Active,
            overlay: Overlay::default(),
            source: snapshot,
            _writer: None,
        }
    }

    pub(super) fn write(store: &'a GraphStore, writer: MutexGuard<'a, ()>, backing: Store) -> Self {
        Self {
            store,
            mode: AccessMode::Write,
            state: SessionState::Active,
            overlay: Overlay::default(),
            source: backing,
            _writer: Some(writer),
        }
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn store(&self) -> &'a GraphStore {
        self.store
    }

    pub fn graph_iri(&self, name: &str) -> OntologyResult<NamedNode> {
        self.store.graph_iri(name)
    }

    /// Number of buffered changes not yet published.
    pub fn pending_changes(&self) -> usize {
        self.overlay.inserted.len() + self.overlay.removed.len()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Publishes every buffered change atomically. The next snapshot is
    /// staged first and the backing store is changed in a single
    /// transaction; if either step fails nothing becomes visible and the
    /// session ends aborted.
    pub fn commit(mut self) -> OntologyResult<()> {
        self.ensure_active()?;
        if self.mode == AccessMode::Read || self.overlay.is_empty() {
            self.state = SessionState::Committed;
            debug!(mode = ?self.mode, "session ended without changes");
            return Ok(());
        }

        let overlay = std::mem::take(&mut self.overlay);
        let published = stage_snapshot(&self.store.snapshot(), &overlay)
            .and_then(|next| apply(&self.source, &overlay).map(|()| next));

        match published {
            Ok(next) => {
                self.store.publish(next);
                self.state = SessionState::Committed;
                info!(
                    inserted = overlay.inserted.len(),
                    removed = overlay.removed.len(),
                    "write session committed"
                );
                Ok(())
            }
            Err(error) => {
                warn!(%error, "commit rejected");
                self.state = SessionState::Aborted;
                Err(OntologyError::CommitRejected {
                    reason: error.to_string(),
                })
            }
        }
    }

    /// Discards buffered changes and ends the session. Always succeeds.
    pub fn abort(mut self) {
        self.discard("explicit abort");
    }

    fn discard(&mut self, reason: &'static str) {
        if self.state != SessionState::Active {
            return;
        }
        if self.mode == AccessMode::Write && !self.overlay.is_empty() {
            debug!(
                reason,
                pending = self.pending_changes(),
                "discarding uncommitted changes"
            );
        }
        self.overlay = Overlay::default();
        self.state = SessionState::Aborted;
    }

    fn ensure_active(&self) -> OntologyResult<()> {
        if self.state == SessionState::Active {
            Ok(())
        } else {
            Err(OntologyError::SessionClosed)
        }
    }

    fn ensure_writable(&self, operation: &'static str) -> OntologyResult<()> {
        self.ensure_active()?;
        if self.mode == AccessMode::Read {
            return Err(OntologyError::ReadOnlySession { operation });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Named graphs
    // ------------------------------------------------------------------

    pub fn graph_exists(&self, graph: NamedNodeRef<'_>) -> OntologyResult<bool> {
        self.ensure_active()?;
        let owned = graph.into_owned();
        if self.overlay.created_graphs.contains(&owned) {
            return Ok(true);
        }
        if self.overlay.dropped_graphs.contains(&owned) {
            return Ok(self
                .overlay
                .inserted
                .iter()
                .any(|quad| quad.graph_name.as_ref() == GraphNameRef::NamedNode(graph)));
        }
        if self.source.contains_named_graph(graph)? {
            return Ok(true);
        }
        Ok(self
            .overlay
            .inserted
            .iter()
            .any(|quad| quad.graph_name.as_ref() == GraphNameRef::NamedNode(graph)))
    }

    pub fn create_graph(&mut self, graph: NamedNodeRef<'_>) -> OntologyResult<bool> {
        self.ensure_writable("create a graph")?;
        let owned = graph.into_owned();
        let was_dropped = self.overlay.dropped_graphs.remove(&owned);
        if !was_dropped && self.graph_exists(graph)? {
            return Ok(false);
        }
        self.overlay.created_graphs.insert(owned);
        Ok(true)
    }

    /// Removes a named graph and every triple in it.
    pub fn drop_graph(&mut self, graph: NamedNodeRef<'_>) -> OntologyResult<bool> {
        self.ensure_writable("drop a graph")?;
        if !self.graph_exists(graph)? {
            return Ok(false);
        }
        for quad in self.quads(None, None, None, graph)? {
            self.remove(&quad)?;
        }
        let owned = graph.into_owned();
        self.overlay.created_graphs.shift_remove(&owned);
        if self.source.contains_named_graph(graph)? {
            self.overlay.dropped_graphs.insert(owned);
        }
        Ok(true)
    }

    pub fn list_graphs(&self) -> OntologyResult<Vec<NamedNode>> {
        self.ensure_active()?;
        let mut graphs = IndexSet::new();
        for graph in self.source.named_graphs() {
            if let NamedOrBlankNode::NamedNode(node) = graph? {
                if !self.overlay.dropped_graphs.contains(&node) {
                    graphs.insert(node);
                }
            }
        }
        graphs.extend(self.overlay.created_graphs.iter().cloned());
        for quad in &self.overlay.inserted {
            if let GraphName::NamedNode(node) = &quad.graph_name {
                graphs.insert(node.clone());
            }
        }
        Ok(graphs.into_iter().collect())
    }

    // ------------------------------------------------------------------
    // Triples
    // ------------------------------------------------------------------

    /// Pattern lookup inside one named graph. A write session sees its own
    /// buffered changes.
    pub fn quads(
        &self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
        graph: NamedNodeRef<'_>,
    ) -> OntologyResult<Vec<Quad>> {
        self.ensure_active()?;
        let graph_name = GraphNameRef::NamedNode(graph);
        let mut found = Vec::new();
        for quad in self
            .source
            .quads_for_pattern(subject, predicate, object, Some(graph_name))
        {
            let quad = quad?;
            if !self.overlay.removed.contains(&quad) {
                found.push(quad);
            }
        }
        found.extend(
            self.overlay
                .inserted
                .iter()
                .filter(|quad| matches_pattern(quad, subject, predicate, object, graph_name))
                .cloned(),
        );
        Ok(found)
    }

    pub fn contains(&self, quad: QuadRef<'_>) -> OntologyResult<bool> {
        self.ensure_active()?;
        let owned = quad.into_owned();
        if self.overlay.inserted.contains(&owned) {
            return Ok(true);
        }
        if self.overlay.removed.contains(&owned) {
            return Ok(false);
        }
        Ok(self.source.contains(quad)?)
    }

    /// Buffers an insertion. Returns `false` when the quad is already present.
    pub fn insert(&mut self, quad: Quad) -> OntologyResult<bool> {
        self.ensure_writable("insert")?;
        if let GraphName::NamedNode(graph) = &quad.graph_name {
            if self.overlay.dropped_graphs.remove(graph) {
                self.overlay.created_graphs.insert(graph.clone());
            }
        }
        if self.overlay.removed.remove(&quad) {
            return Ok(true);
        }
        if self.overlay.inserted.contains(&quad) || self.source.contains(quad.as_ref())? {
            return Ok(false);
        }
        self.overlay.inserted.insert(quad);
        Ok(true)
    }

    /// Buffers a removal. Returns `false` when the quad was not present.
    pub fn remove(&mut self, quad: &Quad) -> OntologyResult<bool> {
        self.ensure_writable("remove")?;
        if self.overlay.inserted.shift_remove(quad) {
            return Ok(true);
        }
        if self.overlay.removed.contains(quad) {
            return Ok(false);
        }
        if self.source.contains(quad.as_ref())? {
            self.overlay.removed.insert(quad.clone());
            return Ok(true);
        }
        Ok(false)
    }

    /// Parses Turtle content into `graph`. Returns the number of new triples.
    pub fn import_turtle(
        &mut self,
        graph: NamedNodeRef<'_>,
        content: &str,
        base_iri: Option<&str>,
    ) -> OntologyResult<usize> {
        self.ensure_writable("import")?;
        let mut parser =
            RdfParser::from_format(RdfFormat::Turtle).with_default_graph(graph.into_owned());
        if let Some(base) = base_iri {
            parser = parser.with_base_iri(base)?;
        }
        let mut added = 0;
        for quad in parser.for_reader(content.as_bytes()) {
            if self.insert(quad?)? {
                added += 1;
            }
        }
        self.create_graph(graph)?;
        debug!(graph = %graph, added, "turtle content buffered");
        Ok(added)
    }

    /// N-Triples rendering of one graph as this session sees it.
    pub fn serialize_graph(&self, graph: NamedNodeRef<'_>) -> OntologyResult<String> {
        Ok(self
            .quads(None, None, None, graph)?
            .iter()
            .map(|quad| format!("{} {} {} .\n", quad.subject, quad.predicate, quad.object))
            .collect())
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.discard("session dropped");
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("pending", &self.pending_changes())
            .finish()
    }
}

fn matches_pattern(
    quad: &Quad,
    subject: Option<NamedOrBlankNodeRef<'_>>,
    predicate: Option<NamedNodeRef<'_>>,
    object: Option<TermRef<'_>>,
    graph: GraphNameRef<'_>,
) -> bool {
    quad.graph_name.as_ref() == graph
        && subject.is_none_or(|s| quad.subject.as_ref() == s)
        && predicate.is_none_or(|p| quad.predicate.as_ref() == p)
        && object.is_none_or(|o| quad.object.as_ref() == o)
}

/// Records the overlay inside `transaction`, in the order created graphs,
/// removals, insertions, dropped graphs.
fn stage(transaction: &mut Transaction<'_>, overlay: &Overlay) -> Result<(), StorageError> {
    for graph in &overlay.created_graphs {
        transaction.insert_named_graph(graph.as_ref());
    }
    for quad in &overlay.removed {
        transaction.remove(quad);
    }
    for quad in &overlay.inserted {
        transaction.insert(quad);
    }
    for graph in &overlay.dropped_graphs {
        transaction.remove_named_graph(graph.as_ref())?;
    }
    Ok(())
}

/// Applies the overlay to `store` in one transaction. Dropping the
/// transaction on error leaves the store untouched.
fn apply(store: &Store, overlay: &Overlay) -> Result<(), StorageError> {
    let mut transaction = store.start_transaction()?;
    stage(&mut transaction, overlay)?;
    transaction.commit()
}

/// Copy of the published snapshot with the overlay applied.
fn stage_snapshot(published: &Store, overlay: &Overlay) -> Result<Store, StorageError> {
    let next = copy_store(published)?;
    apply(&next, overlay)?;
    Ok(next)
}
