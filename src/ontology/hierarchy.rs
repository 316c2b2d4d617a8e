//! Subclass graph construction.

use super::catalog::declared_classes;
use super::model::{OntologyClass, SubclassGraph, is_root_address};
use super::view::GraphView;
use super::vocab::{owl, rdfs};
use crate::error::OntologyResult;
use crate::store::{GraphStore, Session};
use indexmap::IndexSet;
use oxigraph::model::{NamedNode, NamedNodeRef};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SubclassGraphBuilder {
    store: Arc<GraphStore>,
}

impl SubclassGraphBuilder {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    /// Ancestry of `class`: the class itself plus every edge on its paths up
    /// to the root. Each class is expanded at most once, so every subclass
    /// relation contributes a single edge.
    pub fn build_for_class(
        &self,
        session: &Session<'_>,
        graph: &str,
        class: &OntologyClass,
    ) -> OntologyResult<SubclassGraph> {
        let view = GraphView::open(session, graph)?;
        let mut subclass_graph = SubclassGraph::new();
        subclass_graph.add_class(class.clone());

        let mut expanded = HashSet::new();
        let mut pending = vec![class.clone()];
        while let Some(current) = pending.pop() {
            if current.is_root() || !expanded.insert(current.uri.clone()) {
                continue;
            }
            let node = NamedNode::new(current.uri.as_str())?;
            for parent in direct_superclasses(session, &view, node.as_ref())? {
                let parent = OntologyClass::from_uri(parent.into_string());
                if !subclass_graph.contains_edge(&parent, &current) {
                    subclass_graph.add_edge(parent.clone(), current.clone());
                }
                if !expanded.contains(&parent.uri) {
                    pending.push(parent);
                }
            }
        }

        debug!(
            graph,
            class = %class.uri,
            classes = subclass_graph.class_count(),
            edges = subclass_graph.edges().len(),
            "subclass graph built"
        );
        Ok(subclass_graph)
    }

    /// Every subclass edge declared in the view, plus an edge from the root
    /// to each named class without a named superclass.
    pub fn build_for_graph(&self, session: &Session<'_>, graph: &str) -> OntologyResult<SubclassGraph> {
        let view = GraphView::open(session, graph)?;
        let mut subclass_graph = SubclassGraph::new();
        let root = OntologyClass::root();
        subclass_graph.add_class(root.clone());

        let mut classes = declared_classes(session, &view)?;
        for triple in view.triples(session, None, Some(rdfs::SUB_CLASS_OF), None)? {
            if let oxigraph::model::NamedOrBlankNode::NamedNode(sub) = triple.subject {
                if !is_root_address(sub.as_str()) {
                    classes.insert(sub);
                }
            }
        }

        for class in &classes {
            let sub = OntologyClass::from_uri(class.as_str());
            let parents = direct_superclasses(session, &view, class.as_ref())?;
            if parents.is_empty() {
                subclass_graph.add_edge(root.clone(), sub);
                continue;
            }
            for parent in parents {
                let parent = OntologyClass::from_uri(parent.into_string());
                if !subclass_graph.contains_edge(&parent, &sub) {
                    subclass_graph.add_edge(parent, sub.clone());
                }
            }
        }

        debug!(
            graph,
            classes = subclass_graph.class_count(),
            edges = subclass_graph.edges().len(),
            "ontology subclass graph built"
        );
        Ok(subclass_graph)
    }

    /// Reflexive, transitive subclass test. Every class is a subclass of the
    /// root.
    pub fn is_subclass_of(
        &self,
        session: &Session<'_>,
        graph: &str,
        class: &OntologyClass,
        ancestor: &OntologyClass,
    ) -> OntologyResult<bool> {
        let view = GraphView::open(session, graph)?;
        is_subclass_of(session, &view, &class.uri, &ancestor.uri)
    }
}

/// Named superclasses of `class`. Restriction axioms (blank nodes or nodes
/// typed `owl:Restriction`) are not classes and are left out.
pub(crate) fn direct_superclasses(
    session: &Session<'_>,
    view: &GraphView,
    class: NamedNodeRef<'_>,
) -> OntologyResult<Vec<NamedNode>> {
    let mut parents = Vec::new();
    for parent in view.named_objects(session, class.into(), rdfs::SUB_CLASS_OF)? {
        if parent.as_ref() == class || view.has_type(session, parent.as_ref(), owl::RESTRICTION)? {
            continue;
        }
        parents.push(parent);
    }
    Ok(parents)
}

pub(crate) fn is_subclass_of(
    session: &Session<'_>,
    view: &GraphView,
    class: &str,
    ancestor: &str,
) -> OntologyResult<bool> {
    if class == ancestor || is_root_address(ancestor) {
        return Ok(true);
    }
    let mut seen = IndexSet::new();
    let mut pending = vec![NamedNode::new(class)?];
    while let Some(current) = pending.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        for parent in direct_superclasses(session, view, current.as_ref())? {
            if parent.as_str() == ancestor {
                return Ok(true);
            }
            pending.push(parent);
        }
    }
    Ok(false)
}
