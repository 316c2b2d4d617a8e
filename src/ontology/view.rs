//! Read scope of a named graph: the graph itself plus everything it imports.

use super::vocab::{local_name, owl, rdf, rdfs};
use crate::error::{OntologyError, OntologyResult};
use crate::store::{Session, is_absolute};
use indexmap::IndexSet;
use oxigraph::model::{
    Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Term, TermRef,
    Triple,
};
use std::collections::VecDeque;
use tracing::trace;

/// The named graph an ontology lives in, together with the graphs reachable
/// through `owl:imports`.
#[derive(Debug, Clone)]
pub struct GraphView {
    name: String,
    own: NamedNode,
    members: Vec<NamedNode>,
}

impl GraphView {
    /// Resolves `name` and walks its imports. Fails with
    /// [`OntologyError::GraphNotFound`] if the graph does not exist.
    pub fn open(session: &Session<'_>, name: &str) -> OntologyResult<Self> {
        let own = session.graph_iri(name)?;
        if !session.graph_exists(own.as_ref())? {
            return Err(OntologyError::GraphNotFound(name.to_string()));
        }

        let mut members = IndexSet::new();
        let mut pending = VecDeque::from([own.clone()]);
        while let Some(graph) = pending.pop_front() {
            if !members.insert(graph.clone()) {
                continue;
            }
            for quad in session.quads(None, Some(owl::IMPORTS), None, graph.as_ref())? {
                if let Term::NamedNode(imported) = quad.object {
                    if !members.contains(&imported) && session.graph_exists(imported.as_ref())? {
                        pending.push_back(imported);
                    }
                }
            }
        }
        trace!(graph = %own, members = members.len(), "graph view resolved");

        Ok(Self {
            name: name.to_string(),
            own,
            members: members.into_iter().collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn own_graph(&self) -> NamedNodeRef<'_> {
        self.own.as_ref()
    }

    pub fn graphs(&self) -> &[NamedNode] {
        &self.members
    }

    /// Address for an entity created locally in this graph.
    pub fn entity_iri(&self, local: &str) -> OntologyResult<NamedNode> {
        Ok(NamedNode::new(format!("{}#{}", self.own.as_str(), local))?)
    }

    /// Triples matching the pattern anywhere in the view, deduplicated.
    pub fn triples(
        &self,
        session: &Session<'_>,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> OntologyResult<Vec<Triple>> {
        let mut found = IndexSet::new();
        for graph in &self.members {
            for quad in session.quads(subject, predicate, object, graph.as_ref())? {
                found.insert(Triple::new(quad.subject, quad.predicate, quad.object));
            }
        }
        Ok(found.into_iter().collect())
    }

    pub fn objects(
        &self,
        session: &Session<'_>,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> OntologyResult<Vec<Term>> {
        Ok(self
            .triples(session, Some(subject), Some(predicate), None)?
            .into_iter()
            .map(|triple| triple.object)
            .collect())
    }

    pub fn object(
        &self,
        session: &Session<'_>,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> OntologyResult<Option<Term>> {
        Ok(self.objects(session, subject, predicate)?.into_iter().next())
    }

    /// Named-node objects only; blank nodes and literals are skipped.
    pub fn named_objects(
        &self,
        session: &Session<'_>,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> OntologyResult<Vec<NamedNode>> {
        Ok(self
            .objects(session, subject, predicate)?
            .into_iter()
            .filter_map(|term| match term {
                Term::NamedNode(node) => Some(node),
                _ => None,
            })
            .collect())
    }

    pub fn literal(
        &self,
        session: &Session<'_>,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> OntologyResult<Option<Literal>> {
        Ok(self
            .objects(session, subject, predicate)?
            .into_iter()
            .find_map(|term| match term {
                Term::Literal(literal) => Some(literal),
                _ => None,
            }))
    }

    /// Named subjects of `predicate object` triples, in encounter order.
    pub fn subjects(
        &self,
        session: &Session<'_>,
        predicate: NamedNodeRef<'_>,
        object: TermRef<'_>,
    ) -> OntologyResult<Vec<NamedNode>> {
        let mut found = IndexSet::new();
        for triple in self.triples(session, None, Some(predicate), Some(object))? {
            if let NamedOrBlankNode::NamedNode(node) = triple.subject {
                found.insert(node);
            }
        }
        Ok(found.into_iter().collect())
    }

    pub fn has_type(
        &self,
        session: &Session<'_>,
        subject: NamedNodeRef<'_>,
        class: NamedNodeRef<'_>,
    ) -> OntologyResult<bool> {
        Ok(!self
            .triples(
                session,
                Some(subject.into()),
                Some(rdf::TYPE),
                Some(class.into()),
            )?
            .is_empty())
    }

    /// True when `subject` appears as the subject of any triple in the view.
    pub fn describes(&self, session: &Session<'_>, subject: NamedNodeRef<'_>) -> OntologyResult<bool> {
        for graph in &self.members {
            if !session
                .quads(Some(subject.into()), None, None, graph.as_ref())?
                .is_empty()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Resolves a local name or full address to an address described in the
    /// view. Local names are tried against this graph's namespace first, then
    /// matched against the local part of every described subject.
    pub fn resolve(
        &self,
        session: &Session<'_>,
        identifier: &str,
    ) -> OntologyResult<Option<NamedNode>> {
        if is_absolute(identifier) {
            let node = NamedNode::new(identifier)?;
            return Ok(self.describes(session, node.as_ref())?.then_some(node));
        }

        let local = self.entity_iri(identifier)?;
        if self.describes(session, local.as_ref())? {
            return Ok(Some(local));
        }

        for triple in self.triples(session, None, None, None)? {
            if let NamedOrBlankNode::NamedNode(node) = triple.subject {
                if local_name(node.as_str()) == identifier {
                    return Ok(Some(node));
                }
            }
        }
        Ok(None)
    }

    /// `rdfs:label` of a resource, if it has one.
    pub fn label(&self, session: &Session<'_>, subject: NamedNodeRef<'_>) -> OntologyResult<Option<String>> {
        Ok(self
            .literal(session, subject.into(), rdfs::LABEL)?
            .map(|literal| literal.value().to_string()))
    }

    pub fn comment(
        &self,
        session: &Session<'_>,
        subject: NamedNodeRef<'_>,
    ) -> OntologyResult<Option<String>> {
        Ok(self
            .literal(session, subject.into(), rdfs::COMMENT)?
            .map(|literal| literal.value().to_string()))
    }
}
