//! Typed reads and writes of individuals and their property values.

use super::catalog::{declared_range, property_for};
use super::hierarchy::is_subclass_of;
use super::literal::TypedValue;
use super::model::{Individual, OntologyClass, PropertyRange, is_root_address};
use super::view::GraphView;
use super::vocab::{local_name, owl, rdf};
use crate::error::{OntologyError, OntologyResult};
use crate::store::{GraphStore, Session, is_absolute};
use indexmap::IndexSet;
use oxigraph::model::{
    Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, Quad, Term, TermRef,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Property holding the provisional name of a draft individual when none is
/// configured.
pub const DEFAULT_DRAFT_MARKER: &str = "urn:ontoform:firstDraftName";

const META_NAMESPACES: &[&str] = &[
    "http://www.w3.org/2002/07/owl#",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    "http://www.w3.org/2000/01/rdf-schema#",
];

/// A value asserted for a property on an individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Object(String),
    Literal(TypedValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAssertion {
    pub property: String,
    pub name: String,
    pub value: PropertyValue,
}

/// One wanted value in [`IndividualAccessor::replace_property_values`]: an
/// individual address or local name for object properties, literal text
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEdit {
    pub property: String,
    pub value: String,
}

impl PropertyEdit {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSummary {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone)]
pub struct IndividualAccessor {
    store: Arc<GraphStore>,
    draft_marker: NamedNode,
}

impl IndividualAccessor {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self {
            store,
            draft_marker: NamedNode::new_unchecked(DEFAULT_DRAFT_MARKER),
        }
    }

    /// Uses `marker` as the property carrying draft names.
    pub fn with_draft_marker(store: Arc<GraphStore>, marker: &str) -> OntologyResult<Self> {
        Ok(Self {
            store,
            draft_marker: NamedNode::new(marker)?,
        })
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn draft_marker(&self) -> NamedNodeRef<'_> {
        self.draft_marker.as_ref()
    }

    /// Looks up an individual by local name or address. Absence is `None`.
    pub fn get_individual(
        &self,
        session: &Session<'_>,
        graph: &str,
        identifier: &str,
    ) -> OntologyResult<Option<Individual>> {
        let view = GraphView::open(session, graph)?;
        match view.resolve(session, identifier)? {
            Some(iri) => self.project(session, &view, iri.as_ref()),
            None => Ok(None),
        }
    }

    /// Every individual in the view, sorted by name.
    pub fn list_individuals(&self, session: &Session<'_>, graph: &str) -> OntologyResult<Vec<Individual>> {
        let view = GraphView::open(session, graph)?;
        let mut individuals = Vec::new();
        for subject in typed_subjects(session, &view)? {
            if let Some(individual) = self.project(session, &view, subject.as_ref())? {
                individuals.push(individual);
            }
        }
        individuals.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.iri.cmp(&b.iri)));
        Ok(individuals)
    }

    /// Individuals whose class is `class` or any of its subclasses.
    pub fn list_individuals_of_class(
        &self,
        session: &Session<'_>,
        graph: &str,
        class: &OntologyClass,
    ) -> OntologyResult<Vec<Individual>> {
        let view = GraphView::open(session, graph)?;
        let mut members = Vec::new();
        for subject in typed_subjects(session, &view)? {
            let mut belongs = false;
            for class_iri in asserted_classes(session, &view, subject.as_ref())? {
                if is_subclass_of(session, &view, class_iri.as_str(), &class.uri)? {
                    belongs = true;
                    break;
                }
            }
            if belongs {
                if let Some(individual) = self.project(session, &view, subject.as_ref())? {
                    members.push(individual);
                }
            }
        }
        members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.iri.cmp(&b.iri)));
        debug!(graph, class = %class.uri, count = members.len(), "individuals of class listed");
        Ok(members)
    }

    /// Creates `local` in the ontology graph's namespace.
    pub fn add_individual(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        class: &OntologyClass,
        local: &str,
    ) -> OntologyResult<Individual> {
        let view = GraphView::open(session, graph)?;
        let iri = view.entity_iri(local)?;
        self.add_individual_with_address(session, graph, class, iri.as_str())
    }

    /// Creates an individual at a caller-chosen address.
    pub fn add_individual_with_address(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        class: &OntologyClass,
        address: &str,
    ) -> OntologyResult<Individual> {
        let view = GraphView::open(session, graph)?;
        let iri = NamedNode::new(address)?;
        let own = view.own_graph().into_owned();
        session.insert(Quad::new(
            iri.clone(),
            rdf::TYPE.into_owned(),
            NamedNode::new(class.uri.as_str())?,
            own.clone(),
        ))?;
        session.insert(Quad::new(
            iri.clone(),
            rdf::TYPE.into_owned(),
            owl::NAMED_INDIVIDUAL.into_owned(),
            own,
        ))?;
        debug!(graph, individual = %iri, class = %class.uri, "individual added");
        Ok(Individual {
            name: local_name(iri.as_str()).to_string(),
            label: local_name(iri.as_str()).to_string(),
            iri: iri.into_string(),
            ontology_class: class.clone(),
            imported: false,
            first_draft_name: None,
        })
    }

    /// Returns the individual at `address`, creating it as a `class` member
    /// when absent.
    pub fn get_or_add_individual(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        address: &str,
        class: &OntologyClass,
    ) -> OntologyResult<Individual> {
        if let Some(existing) = self.get_individual(session, graph, address)? {
            return Ok(existing);
        }
        self.add_individual_with_address(session, graph, class, address)
    }

    /// Adds an object property value. Existing values are kept.
    pub fn set_object_property(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        subject: &Individual,
        property: &str,
        object: &str,
    ) -> OntologyResult<()> {
        let view = GraphView::open(session, graph)?;
        let predicate = resolve_property(session, &view, property)?;
        let object = resolve_object(session, &view, object)?;
        session.insert(Quad::new(
            NamedNode::new(subject.iri.as_str())?,
            predicate,
            object,
            view.own_graph().into_owned(),
        ))?;
        Ok(())
    }

    /// Adds a datatype property value, coerced through the property's
    /// declared range. Returns the stored value. Text that does not parse as
    /// an `int`, `float`, `double` or `boolean` range is rejected.
    pub fn set_datatype_property(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        subject: &Individual,
        property: &str,
        text: &str,
    ) -> OntologyResult<TypedValue> {
        let view = GraphView::open(session, graph)?;
        let predicate = resolve_property(session, &view, property)?;
        let range = declared_range(session, &view, predicate.as_ref())?;
        let value = typed_value(&predicate, range.as_ref(), text)?;
        let literal = value.to_literal(range.as_ref().map(|r| r.as_ref()));
        session.insert(Quad::new(
            NamedNode::new(subject.iri.as_str())?,
            predicate,
            literal,
            view.own_graph().into_owned(),
        ))?;
        Ok(value)
    }

    /// First literal value of `property`, coerced through its declared
    /// range (or the literal's own datatype when none is declared).
    pub fn get_datatype_value(
        &self,
        session: &Session<'_>,
        graph: &str,
        subject: &Individual,
        property: &str,
    ) -> OntologyResult<Option<TypedValue>> {
        let view = GraphView::open(session, graph)?;
        let Some(predicate) = lookup_property(session, &view, property)? else {
            return Ok(None);
        };
        let node = NamedNode::new(subject.iri.as_str())?;
        let Some(literal) = view.literal(session, node.as_ref().into(), predicate.as_ref())? else {
            return Ok(None);
        };
        let range = declared_range(session, &view, predicate.as_ref())?;
        Ok(Some(coerce_literal(range.as_ref(), &literal)))
    }

    pub fn get_object_value(
        &self,
        session: &Session<'_>,
        graph: &str,
        subject: &Individual,
        property: &str,
    ) -> OntologyResult<Option<Individual>> {
        Ok(self
            .get_multiple_object_values(session, graph, subject, property)?
            .into_iter()
            .next())
    }

    /// Every individual `subject` points to through `property`. Targets
    /// without a class assertion are reported as members of the root class.
    pub fn get_multiple_object_values(
        &self,
        session: &Session<'_>,
        graph: &str,
        subject: &Individual,
        property: &str,
    ) -> OntologyResult<Vec<Individual>> {
        let view = GraphView::open(session, graph)?;
        let Some(predicate) = lookup_property(session, &view, property)? else {
            return Ok(Vec::new());
        };
        let node = NamedNode::new(subject.iri.as_str())?;
        let mut values = Vec::new();
        for target in view.named_objects(session, node.as_ref().into(), predicate.as_ref())? {
            let individual = match self.project(session, &view, target.as_ref())? {
                Some(individual) => individual,
                None => Individual {
                    name: local_name(target.as_str()).to_string(),
                    label: view
                        .label(session, target.as_ref())?
                        .unwrap_or_else(|| local_name(target.as_str()).to_string()),
                    iri: target.into_string(),
                    ontology_class: OntologyClass::root(),
                    imported: false,
                    first_draft_name: None,
                },
            };
            values.push(individual);
        }
        Ok(values)
    }

    /// Every property assertion on `subject` except its type assertions and
    /// the draft marker.
    pub fn set_properties_of(
        &self,
        session: &Session<'_>,
        graph: &str,
        subject: &Individual,
    ) -> OntologyResult<Vec<PropertyAssertion>> {
        let view = GraphView::open(session, graph)?;
        let node = NamedNode::new(subject.iri.as_str())?;
        let mut assertions = Vec::new();
        for triple in view.triples(session, Some(node.as_ref().into()), None, None)? {
            if triple.predicate.as_ref() == rdf::TYPE || triple.predicate == self.draft_marker {
                continue;
            }
            let value = match &triple.object {
                Term::NamedNode(target) => PropertyValue::Object(target.as_str().to_string()),
                Term::Literal(literal) => {
                    let range = declared_range(session, &view, triple.predicate.as_ref())?;
                    PropertyValue::Literal(coerce_literal(range.as_ref(), literal))
                }
                _ => continue,
            };
            assertions.push(PropertyAssertion {
                name: local_name(triple.predicate.as_str()).to_string(),
                property: triple.predicate.into_string(),
                value,
            });
        }
        Ok(assertions)
    }

    /// Removes values of `property` on `subject` from the ontology graph;
    /// all of them, or only the one whose address or lexical form equals
    /// `value`. Returns how many were removed.
    pub fn remove_property_value(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        subject: &Individual,
        property: &str,
        value: Option<&str>,
    ) -> OntologyResult<usize> {
        let view = GraphView::open(session, graph)?;
        let Some(predicate) = lookup_property(session, &view, property)? else {
            return Ok(0);
        };
        let node = NamedNode::new(subject.iri.as_str())?;
        let quads = session.quads(
            Some(node.as_ref().into()),
            Some(predicate.as_ref()),
            None,
            view.own_graph(),
        )?;
        let mut removed = 0;
        for quad in quads {
            if value.is_some_and(|wanted| !term_matches(quad.object.as_ref(), wanted)) {
                continue;
            }
            if session.remove(&quad)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Makes `edits` the complete set of property values asserted for
    /// `subject` across the view. Values already asserted are kept, missing
    /// ones are added to the ontology graph (literal text is coerced and
    /// checked against the declared range), and every other assertion except
    /// the types and the draft name is removed. Nothing is buffered when an
    /// edit names an unknown property or an ill-typed value.
    pub fn replace_property_values(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        subject: &Individual,
        edits: &[PropertyEdit],
    ) -> OntologyResult<EditSummary> {
        let view = GraphView::open(session, graph)?;
        let node = NamedNode::new(subject.iri.as_str())?;

        let mut wanted: IndexSet<(NamedNode, Term)> = IndexSet::new();
        for edit in edits {
            let predicate = resolve_property(session, &view, &edit.property)?;
            let object: Term = match property_for(session, &view, predicate.as_ref())?.range {
                PropertyRange::Object(_) => resolve_object(session, &view, &edit.value)?.into(),
                PropertyRange::Datatype(_) => {
                    let range = declared_range(session, &view, predicate.as_ref())?;
                    typed_value(&predicate, range.as_ref(), &edit.value)?
                        .to_literal(range.as_ref().map(|r| r.as_ref()))
                        .into()
                }
            };
            wanted.insert((predicate, object));
        }

        let mut current = Vec::new();
        for member in view.graphs() {
            current.extend(session.quads(Some(node.as_ref().into()), None, None, member.as_ref())?);
        }

        let mut summary = EditSummary::default();
        let mut kept = IndexSet::new();
        for quad in current {
            if quad.predicate.as_ref() == rdf::TYPE || quad.predicate == self.draft_marker {
                continue;
            }
            let key = (quad.predicate.clone(), quad.object.clone());
            if kept.contains(&key) {
                continue;
            }
            if wanted.shift_remove(&key) {
                summary.unchanged += 1;
                kept.insert(key);
            } else if session.remove(&quad)? {
                summary.removed += 1;
            }
        }
        for (predicate, object) in wanted {
            let quad = Quad::new(node.clone(), predicate, object, view.own_graph().into_owned());
            if session.insert(quad)? {
                summary.added += 1;
            }
        }
        debug!(graph, individual = %node, ?summary, "property values replaced");
        Ok(summary)
    }

    /// Records the provisional name marking `subject` as a draft.
    pub fn set_draft_name(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        subject: &Individual,
        draft_name: &str,
    ) -> OntologyResult<()> {
        let view = GraphView::open(session, graph)?;
        session.insert(Quad::new(
            NamedNode::new(subject.iri.as_str())?,
            self.draft_marker.clone(),
            Literal::new_simple_literal(draft_name),
            view.own_graph().into_owned(),
        ))?;
        Ok(())
    }

    /// Removes every triple mentioning the individual, as subject or object,
    /// from all graphs in the view. An unknown identifier is an error.
    pub fn delete_individual(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        identifier: &str,
    ) -> OntologyResult<()> {
        let view = GraphView::open(session, graph)?;
        let Some(iri) = view.resolve(session, identifier)? else {
            return Err(OntologyError::IndividualNotFound {
                graph: graph.to_string(),
                identifier: identifier.to_string(),
            });
        };
        if self.project(session, &view, iri.as_ref())?.is_none() {
            return Err(OntologyError::IndividualNotFound {
                graph: graph.to_string(),
                identifier: identifier.to_string(),
            });
        }

        let mut doomed = Vec::new();
        for member in view.graphs() {
            doomed.extend(session.quads(Some(iri.as_ref().into()), None, None, member.as_ref())?);
            doomed.extend(session.quads(None, None, Some(iri.as_ref().into()), member.as_ref())?);
        }
        for quad in &doomed {
            session.remove(quad)?;
        }
        info!(graph, individual = %iri, triples = doomed.len(), "individual deleted");
        Ok(())
    }

    /// True when the individual's type assertion is not part of the
    /// ontology graph itself, i.e. it arrives through an import.
    pub fn is_imported(&self, session: &Session<'_>, graph: &str, address: &str) -> OntologyResult<bool> {
        let own = session.graph_iri(graph)?;
        let iri = NamedNode::new(address)?;
        is_imported_in(session, own.as_ref(), iri.as_ref())
    }

    fn project(
        &self,
        session: &Session<'_>,
        view: &GraphView,
        iri: NamedNodeRef<'_>,
    ) -> OntologyResult<Option<Individual>> {
        let Some(class) = individual_class(session, view, iri)? else {
            return Ok(None);
        };
        let name = local_name(iri.as_str()).to_string();
        let first_draft_name = view
            .literal(session, iri.into(), self.draft_marker.as_ref())?
            .map(|literal| literal.value().to_string());
        Ok(Some(Individual {
            label: view.label(session, iri)?.unwrap_or_else(|| name.clone()),
            name,
            iri: iri.as_str().to_string(),
            ontology_class: class,
            imported: is_imported_in(session, view.own_graph(), iri)?,
            first_draft_name,
        }))
    }
}

fn is_imported_in(
    session: &Session<'_>,
    own: NamedNodeRef<'_>,
    iri: NamedNodeRef<'_>,
) -> OntologyResult<bool> {
    Ok(session
        .quads(Some(iri.into()), Some(rdf::TYPE), None, own)?
        .is_empty())
}

fn is_meta(iri: &str) -> bool {
    META_NAMESPACES.iter().any(|ns| iri.starts_with(ns))
}

/// Named subjects carrying at least one `rdf:type`.
fn typed_subjects(session: &Session<'_>, view: &GraphView) -> OntologyResult<IndexSet<NamedNode>> {
    let mut subjects = IndexSet::new();
    for triple in view.triples(session, None, Some(rdf::TYPE), None)? {
        if let NamedOrBlankNode::NamedNode(subject) = triple.subject {
            subjects.insert(subject);
        }
    }
    Ok(subjects)
}

/// Classes asserted for `iri`, excluding schema vocabulary.
fn asserted_classes(
    session: &Session<'_>,
    view: &GraphView,
    iri: NamedNodeRef<'_>,
) -> OntologyResult<Vec<NamedNode>> {
    Ok(view
        .named_objects(session, iri.into(), rdf::TYPE)?
        .into_iter()
        .filter(|class| !is_meta(class.as_str()))
        .collect())
}

/// The class an individual belongs to: its first non-vocabulary type, or the
/// root class for bare `owl:NamedIndividual`/`owl:Thing` members. Resources
/// that are schema entities yield `None`.
fn individual_class(
    session: &Session<'_>,
    view: &GraphView,
    iri: NamedNodeRef<'_>,
) -> OntologyResult<Option<OntologyClass>> {
    let types = view.named_objects(session, iri.into(), rdf::TYPE)?;
    if let Some(class) = types.iter().find(|class| !is_meta(class.as_str())) {
        return Ok(Some(OntologyClass::from_uri(class.as_str())));
    }
    let bare_member = types
        .iter()
        .any(|class| class.as_ref() == owl::NAMED_INDIVIDUAL || is_root_address(class.as_str()));
    Ok(bare_member.then(OntologyClass::root))
}

/// Address of an object value: a described resource, an absolute address, or
/// a new entity in the ontology namespace.
fn resolve_object(session: &Session<'_>, view: &GraphView, object: &str) -> OntologyResult<NamedNode> {
    match view.resolve(session, object)? {
        Some(resolved) => Ok(resolved),
        None if is_absolute(object) => Ok(NamedNode::new(object)?),
        None => view.entity_iri(object),
    }
}

/// Resolves a property for writing; unknown local names are an error.
fn resolve_property(
    session: &Session<'_>,
    view: &GraphView,
    identifier: &str,
) -> OntologyResult<NamedNode> {
    lookup_property(session, view, identifier)?.ok_or_else(|| OntologyError::PropertyNotFound {
        graph: view.name().to_string(),
        identifier: identifier.to_string(),
    })
}

fn lookup_property(
    session: &Session<'_>,
    view: &GraphView,
    identifier: &str,
) -> OntologyResult<Option<NamedNode>> {
    if is_absolute(identifier) {
        return Ok(Some(NamedNode::new(identifier)?));
    }
    view.resolve(session, identifier)
}

fn typed_value(
    property: &NamedNode,
    range: Option<&NamedNode>,
    text: &str,
) -> OntologyResult<TypedValue> {
    TypedValue::parse_for_range(range.map(|r| r.as_str()), text).ok_or_else(|| {
        OntologyError::InvalidValue {
            property: local_name(property.as_str()).to_string(),
            range: range.map(|r| local_name(r.as_str())).unwrap_or_default().to_string(),
            value: text.to_string(),
        }
    })
}

fn coerce_literal(range: Option<&NamedNode>, literal: &Literal) -> TypedValue {
    match range {
        Some(range) => TypedValue::coerce(Some(range.as_str()), literal.value()),
        None => TypedValue::from_literal(literal),
    }
}

fn term_matches(term: TermRef<'_>, wanted: &str) -> bool {
    match term {
        TermRef::NamedNode(node) => node.as_str() == wanted || local_name(node.as_str()) == wanted,
        TermRef::Literal(literal) => literal.value() == wanted,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::catalog::OntologyCatalog;
    use assert_matches::assert_matches;

    const MENU: &str = r#"
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

        <#Dish> a owl:Class .
        <#Soup> a owl:Class ; rdfs:subClassOf <#Dish> .
        <#Chef> a owl:Class .
        <#calories> a owl:DatatypeProperty ; rdfs:range xsd:int .
        <#vegan> a owl:DatatypeProperty ; rdfs:range xsd:boolean .
        <#cookedBy> a owl:ObjectProperty ; rdfs:range <#Chef> .
        <#tomatoSoup> a owl:NamedIndividual, <#Soup> ; rdfs:label "Tomato soup" .
    "#;

    fn accessor() -> IndividualAccessor {
        let store = Arc::new(GraphStore::in_memory("http://ontologies.example.org").unwrap());
        OntologyCatalog::new(store.clone()).import("menu", MENU).unwrap();
        IndividualAccessor::new(store)
    }

    fn class(local: &str) -> OntologyClass {
        OntologyClass::from_uri(format!("http://ontologies.example.org/menu#{local}"))
    }

    #[test]
    fn imported_individuals_are_flagged() {
        let accessor = accessor();
        let session = accessor.store().read();
        let soup = accessor
            .get_individual(&session, "menu", "tomatoSoup")
            .unwrap()
            .unwrap();
        assert_eq!(soup.label, "Tomato soup");
        assert_eq!(soup.ontology_class, class("Soup"));
        assert!(soup.imported);
        assert!(!soup.is_draft());
        assert!(accessor.get_individual(&session, "menu", "ghost").unwrap().is_none());
        assert!(accessor.get_individual(&session, "menu", "Dish").unwrap().is_none());
    }

    #[test]
    fn membership_includes_subclass_instances() {
        let accessor = accessor();
        let mut session = accessor.store().write();
        accessor
            .add_individual(&mut session, "menu", &class("Dish"), "bread")
            .unwrap();
        let dishes = accessor
            .list_individuals_of_class(&session, "menu", &class("Dish"))
            .unwrap();
        let names: Vec<_> = dishes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["bread", "tomatoSoup"]);
        assert!(!dishes[0].imported);

        let soups = accessor
            .list_individuals_of_class(&session, "menu", &class("Soup"))
            .unwrap();
        assert_eq!(soups.len(), 1);
    }

    #[test]
    fn datatype_values_follow_the_declared_range() {
        let accessor = accessor();
        let mut session = accessor.store().write();
        let soup = accessor
            .get_individual(&session, "menu", "tomatoSoup")
            .unwrap()
            .unwrap();
        let stored = accessor
            .set_datatype_property(&mut session, "menu", &soup, "calories", "9")
            .unwrap();
        assert_eq!(stored, TypedValue::Integer(9));
        accessor
            .set_datatype_property(&mut session, "menu", &soup, "vegan", "true")
            .unwrap();

        assert_eq!(
            accessor
                .get_datatype_value(&session, "menu", &soup, "calories")
                .unwrap(),
            Some(TypedValue::Integer(9))
        );
        assert_eq!(
            accessor
                .get_datatype_value(&session, "menu", &soup, "vegan")
                .unwrap(),
            Some(TypedValue::Boolean(true))
        );
        assert_eq!(
            accessor
                .get_datatype_value(&session, "menu", &soup, "spiciness")
                .unwrap(),
            None
        );
    }

    #[test]
    fn object_values_accumulate() {
        let accessor = accessor();
        let mut session = accessor.store().write();
        let soup = accessor
            .get_individual(&session, "menu", "tomatoSoup")
            .unwrap()
            .unwrap();
        accessor
            .add_individual(&mut session, "menu", &class("Chef"), "anna")
            .unwrap();
        accessor
            .add_individual(&mut session, "menu", &class("Chef"), "ben")
            .unwrap();
        accessor
            .set_object_property(&mut session, "menu", &soup, "cookedBy", "anna")
            .unwrap();
        accessor
            .set_object_property(&mut session, "menu", &soup, "cookedBy", "ben")
            .unwrap();

        let cooks = accessor
            .get_multiple_object_values(&session, "menu", &soup, "cookedBy")
            .unwrap();
        assert_eq!(cooks.len(), 2);
        assert!(cooks.iter().all(|cook| cook.ontology_class == class("Chef")));

        let assertions = accessor.set_properties_of(&session, "menu", &soup).unwrap();
        assert_eq!(
            assertions
                .iter()
                .filter(|a| a.name == "cookedBy")
                .count(),
            2
        );

        let removed = accessor
            .remove_property_value(&mut session, "menu", &soup, "cookedBy", Some("anna"))
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            accessor
                .get_object_value(&session, "menu", &soup, "cookedBy")
                .unwrap()
                .map(|cook| cook.name),
            Some("ben".to_string())
        );
    }

    #[test]
    fn unknown_property_cannot_be_written() {
        let accessor = accessor();
        let mut session = accessor.store().write();
        let soup = accessor
            .get_individual(&session, "menu", "tomatoSoup")
            .unwrap()
            .unwrap();
        let err = accessor
            .set_datatype_property(&mut session, "menu", &soup, "colour", "red")
            .unwrap_err();
        assert_matches!(err, OntologyError::PropertyNotFound { .. });
    }

    #[test]
    fn delete_removes_the_individual_and_reports_unknown_ones() {
        let accessor = accessor();
        let mut session = accessor.store().write();
        accessor
            .delete_individual(&mut session, "menu", "tomatoSoup")
            .unwrap();
        assert!(accessor
            .get_individual(&session, "menu", "tomatoSoup")
            .unwrap()
            .is_none());
        let err = accessor
            .delete_individual(&mut session, "menu", "tomatoSoup")
            .unwrap_err();
        assert_matches!(err, OntologyError::IndividualNotFound { .. });
    }

    #[test]
    fn draft_names_are_read_back() {
        let accessor = accessor();
        let mut session = accessor.store().write();
        let draft = accessor
            .add_individual(&mut session, "menu", &class("Dish"), "draft1")
            .unwrap();
        accessor
            .set_draft_name(&mut session, "menu", &draft, "Pasta special")
            .unwrap();
        let draft = accessor
            .get_individual(&session, "menu", "draft1")
            .unwrap()
            .unwrap();
        assert_eq!(draft.first_draft_name.as_deref(), Some("Pasta special"));
        assert!(accessor
            .set_properties_of(&session, "menu", &draft)
            .unwrap()
            .is_empty());
    }
}
