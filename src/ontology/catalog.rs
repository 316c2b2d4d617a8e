//! Ontologies, classes and properties stored in named graphs.

use super::hierarchy::is_subclass_of;
use super::model::{OntologyClass, OntologyProperty, PropertyRange, is_root_address};
use super::view::GraphView;
use super::vocab::{BUILTIN_ANNOTATIONS, local_name, owl, rdf, rdfs};
use crate::error::{OntologyError, OntologyResult};
use crate::logging::graph_span;
use crate::store::{GraphStore, Session};
use indexmap::IndexSet;
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{NamedNode, NamedNodeRef, Quad, Term};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

const SOURCE_SUFFIX: &str = "source";

const EXPORT_PREFIXES: &[(&str, &str)] = &[
    ("owl", owl::NAMESPACE),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

/// Outcome of loading an ontology document into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub name: String,
    pub graph: String,
    pub source_graph: String,
    pub triples: usize,
}

#[derive(Debug, Clone)]
pub struct OntologyCatalog {
    store: Arc<GraphStore>,
}

impl OntologyCatalog {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    /// Imports `turtle` in its own write session and commits it.
    pub fn import(&self, name: &str, turtle: &str) -> OntologyResult<ImportSummary> {
        let _span = graph_span("import", name).entered();
        self.store
            .write_with(|session| self.import_ontology(session, name, turtle))
    }

    /// Stores uploaded Turtle in the ontology's source graph and (re)creates
    /// the ontology graph importing it. Relative IRIs in the document resolve
    /// against the ontology graph's address.
    pub fn import_ontology(
        &self,
        session: &mut Session<'_>,
        name: &str,
        turtle: &str,
    ) -> OntologyResult<ImportSummary> {
        let own = session.graph_iri(name)?;
        let source = source_graph(session, name)?;
        session.drop_graph(own.as_ref())?;
        session.drop_graph(source.as_ref())?;

        let triples = session.import_turtle(source.as_ref(), turtle, Some(own.as_str()))?;
        session.insert(Quad::new(
            own.clone(),
            rdf::TYPE.into_owned(),
            owl::ONTOLOGY.into_owned(),
            own.clone(),
        ))?;
        session.insert(Quad::new(
            own.clone(),
            owl::IMPORTS.into_owned(),
            source.clone(),
            own.clone(),
        ))?;
        session.create_graph(own.as_ref())?;

        info!(ontology = name, triples, "ontology imported");
        Ok(ImportSummary {
            name: name.to_string(),
            graph: own.into_string(),
            source_graph: source.into_string(),
            triples,
        })
    }

    /// Removes an ontology graph together with its source graph.
    pub fn delete_ontology(&self, session: &mut Session<'_>, name: &str) -> OntologyResult<()> {
        let own = session.graph_iri(name)?;
        if !session.drop_graph(own.as_ref())? {
            return Err(OntologyError::GraphNotFound(name.to_string()));
        }
        let source = source_graph(session, name)?;
        session.drop_graph(source.as_ref())?;
        info!(ontology = name, "ontology deleted");
        Ok(())
    }

    /// Serializes the ontology graph and every graph it imports as a single
    /// document in `format`. Individuals added after the import are part of
    /// the ontology graph, so the document carries them too.
    pub fn export_ontology(
        &self,
        session: &Session<'_>,
        name: &str,
        format: RdfFormat,
    ) -> OntologyResult<Vec<u8>> {
        let _span = graph_span("export", name).entered();
        let view = GraphView::open(session, name)?;
        let mut serializer = RdfSerializer::from_format(format);
        for (prefix, namespace) in EXPORT_PREFIXES {
            serializer = serializer.with_prefix(*prefix, *namespace)?;
        }
        let mut writer = serializer.for_writer(Vec::new());
        let triples = view.triples(session, None, None, None)?;
        for triple in &triples {
            writer.serialize_triple(triple)?;
        }
        let document = writer.finish()?;
        info!(ontology = name, triples = triples.len(), %format, "ontology exported");
        Ok(document)
    }

    /// Names of every graph declaring itself an `owl:Ontology`.
    pub fn list_ontologies(&self, session: &Session<'_>) -> OntologyResult<Vec<String>> {
        let prefix = format!("{}/", session.store().base_iri());
        let mut names = Vec::new();
        for graph in session.list_graphs()? {
            let declared = !session
                .quads(
                    Some(graph.as_ref().into()),
                    Some(rdf::TYPE),
                    Some(owl::ONTOLOGY.into()),
                    graph.as_ref(),
                )?
                .is_empty();
            if declared {
                let name = graph.as_str().strip_prefix(prefix.as_str()).unwrap_or(graph.as_str());
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Named classes declared in the view, sorted by name. The root class is
    /// implicit and not listed.
    pub fn list_classes(&self, session: &Session<'_>, graph: &str) -> OntologyResult<Vec<OntologyClass>> {
        let view = GraphView::open(session, graph)?;
        let mut classes: Vec<OntologyClass> = declared_classes(session, &view)?
            .into_iter()
            .map(|iri| OntologyClass::from_uri(iri.into_string()))
            .collect();
        classes.sort();
        Ok(classes)
    }

    /// Finds a class by local name or address. `Thing` and every root alias
    /// always resolve to the root class.
    pub fn find_class(
        &self,
        session: &Session<'_>,
        graph: &str,
        identifier: &str,
    ) -> OntologyResult<Option<OntologyClass>> {
        if identifier == super::model::ROOT_CLASS_NAME || is_root_address(identifier) {
            return Ok(Some(OntologyClass::root()));
        }
        let view = GraphView::open(session, graph)?;
        find_class_in(session, &view, identifier)
    }

    /// Declares a new class in the ontology graph, optionally below
    /// `super_class`.
    pub fn add_class(
        &self,
        session: &mut Session<'_>,
        graph: &str,
        name: &str,
        super_class: Option<&OntologyClass>,
    ) -> OntologyResult<OntologyClass> {
        let view = GraphView::open(session, graph)?;
        let iri = view.entity_iri(name)?;
        let own = view.own_graph().into_owned();
        session.insert(Quad::new(
            iri.clone(),
            rdf::TYPE.into_owned(),
            owl::CLASS.into_owned(),
            own.clone(),
        ))?;
        if let Some(parent) = super_class.filter(|class| !class.is_root()) {
            let parent = NamedNode::new(parent.uri.as_str())?;
            session.insert(Quad::new(
                iri.clone(),
                rdfs::SUB_CLASS_OF.into_owned(),
                parent,
                own,
            ))?;
        }
        debug!(graph, class = %iri, "class added");
        Ok(OntologyClass::from_uri(iri.into_string()))
    }

    /// Object and datatype properties declared in the view, sorted by name.
    pub fn list_properties(
        &self,
        session: &Session<'_>,
        graph: &str,
    ) -> OntologyResult<Vec<OntologyProperty>> {
        let view = GraphView::open(session, graph)?;
        list_properties_in(session, &view)
    }

    pub fn find_property(
        &self,
        session: &Session<'_>,
        graph: &str,
        identifier: &str,
    ) -> OntologyResult<Option<OntologyProperty>> {
        let view = GraphView::open(session, graph)?;
        find_property_in(session, &view, identifier)
    }

    /// Properties usable on instances of `class`: those whose declared domain
    /// is the class or one of its ancestors, plus those without a domain.
    pub fn properties_of_domain(
        &self,
        session: &Session<'_>,
        graph: &str,
        class: &OntologyClass,
    ) -> OntologyResult<Vec<OntologyProperty>> {
        let view = GraphView::open(session, graph)?;
        properties_of_domain_in(session, &view, class)
    }

    /// Case-insensitive substring search over property names, labels and
    /// comments, optionally scoped to a domain class.
    pub fn search_properties(
        &self,
        session: &Session<'_>,
        graph: &str,
        domain: Option<&OntologyClass>,
        query: &str,
    ) -> OntologyResult<Vec<OntologyProperty>> {
        let view = GraphView::open(session, graph)?;
        let candidates = match domain {
            Some(class) => properties_of_domain_in(session, &view, class)?,
            None => list_properties_in(session, &view)?,
        };
        Ok(candidates
            .into_iter()
            .filter(|property| property_matches(property, query))
            .collect())
    }

    pub fn is_object_property(
        &self,
        session: &Session<'_>,
        graph: &str,
        property: &str,
    ) -> OntologyResult<bool> {
        let view = GraphView::open(session, graph)?;
        let property = NamedNode::new(property)?;
        view.has_type(session, property.as_ref(), owl::OBJECT_PROPERTY)
    }

    /// Built-in annotation properties plus any declared
    /// `owl:AnnotationProperty`.
    pub fn is_annotation_property(
        &self,
        session: &Session<'_>,
        graph: &str,
        property: &str,
    ) -> OntologyResult<bool> {
        if BUILTIN_ANNOTATIONS.contains(&property) {
            return Ok(true);
        }
        let view = GraphView::open(session, graph)?;
        let property = NamedNode::new(property)?;
        view.has_type(session, property.as_ref(), owl::ANNOTATION_PROPERTY)
    }
}

fn source_graph(session: &Session<'_>, name: &str) -> OntologyResult<NamedNode> {
    session.graph_iri(&format!("{name}/{SOURCE_SUFFIX}"))
}

pub(crate) fn declared_classes(
    session: &Session<'_>,
    view: &GraphView,
) -> OntologyResult<IndexSet<NamedNode>> {
    let mut classes = IndexSet::new();
    for kind in [owl::CLASS, rdfs::CLASS] {
        for class in view.subjects(session, rdf::TYPE, kind.into())? {
            if !is_root_address(class.as_str()) {
                classes.insert(class);
            }
        }
    }
    Ok(classes)
}

pub(crate) fn is_class(session: &Session<'_>, view: &GraphView, iri: NamedNodeRef<'_>) -> OntologyResult<bool> {
    if is_root_address(iri.as_str()) {
        return Ok(true);
    }
    Ok(view.has_type(session, iri, owl::CLASS)?
        || view.has_type(session, iri, rdfs::CLASS)?
        || !view
            .triples(session, Some(iri.into()), Some(rdfs::SUB_CLASS_OF), None)?
            .is_empty())
}

pub(crate) fn find_class_in(
    session: &Session<'_>,
    view: &GraphView,
    identifier: &str,
) -> OntologyResult<Option<OntologyClass>> {
    if is_root_address(identifier) {
        return Ok(Some(OntologyClass::root()));
    }
    match view.resolve(session, identifier)? {
        Some(iri) if is_class(session, view, iri.as_ref())? => {
            Ok(Some(OntologyClass::from_uri(iri.into_string())))
        }
        _ => Ok(None),
    }
}

fn is_property(session: &Session<'_>, view: &GraphView, iri: NamedNodeRef<'_>) -> OntologyResult<bool> {
    for kind in [owl::OBJECT_PROPERTY, owl::DATATYPE_PROPERTY, rdf::PROPERTY] {
        if view.has_type(session, iri, kind)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn list_properties_in(
    session: &Session<'_>,
    view: &GraphView,
) -> OntologyResult<Vec<OntologyProperty>> {
    let mut iris = IndexSet::new();
    for kind in [owl::OBJECT_PROPERTY, owl::DATATYPE_PROPERTY, rdf::PROPERTY] {
        iris.extend(view.subjects(session, rdf::TYPE, kind.into())?);
    }
    let mut properties = iris
        .into_iter()
        .map(|iri| property_for(session, view, iri.as_ref()))
        .collect::<OntologyResult<Vec<_>>>()?;
    properties.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.uri.cmp(&b.uri)));
    Ok(properties)
}

/// Property names in declaration order, used to sample naming conventions.
pub(crate) fn property_names_in(
    session: &Session<'_>,
    view: &GraphView,
) -> OntologyResult<Vec<String>> {
    let mut iris = IndexSet::new();
    for kind in [owl::OBJECT_PROPERTY, owl::DATATYPE_PROPERTY] {
        iris.extend(view.subjects(session, rdf::TYPE, kind.into())?);
    }
    Ok(iris
        .iter()
        .map(|iri| local_name(iri.as_str()).to_string())
        .collect())
}

pub(crate) fn find_property_in(
    session: &Session<'_>,
    view: &GraphView,
    identifier: &str,
) -> OntologyResult<Option<OntologyProperty>> {
    match view.resolve(session, identifier)? {
        Some(iri) if is_property(session, view, iri.as_ref())? => {
            Ok(Some(property_for(session, view, iri.as_ref())?))
        }
        _ => Ok(None),
    }
}

pub(crate) fn properties_of_domain_in(
    session: &Session<'_>,
    view: &GraphView,
    class: &OntologyClass,
) -> OntologyResult<Vec<OntologyProperty>> {
    let mut matching = Vec::new();
    for property in list_properties_in(session, view)? {
        if property.domain.is_root()
            || is_subclass_of(session, view, &class.uri, &property.domain.uri)?
        {
            matching.push(property);
        }
    }
    Ok(matching)
}

/// Projects a property from its declarations. Object-ness follows the
/// declared kind; an untyped `rdf:Property` is a datatype property when its
/// range is a datatype.
pub(crate) fn property_for(
    session: &Session<'_>,
    view: &GraphView,
    iri: NamedNodeRef<'_>,
) -> OntologyResult<OntologyProperty> {
    let domain = view
        .named_objects(session, iri.into(), rdfs::DOMAIN)?
        .into_iter()
        .next()
        .map(|node| OntologyClass::from_uri(node.into_string()))
        .unwrap_or_else(OntologyClass::root);
    let declared_range = view
        .named_objects(session, iri.into(), rdfs::RANGE)?
        .into_iter()
        .next();

    let is_object = if view.has_type(session, iri, owl::OBJECT_PROPERTY)? {
        true
    } else if view.has_type(session, iri, owl::DATATYPE_PROPERTY)? {
        false
    } else {
        declared_range
            .as_ref()
            .is_some_and(|range| !is_datatype(range.as_ref()))
    };

    let range = if is_object {
        PropertyRange::Object(declared_range.map(|node| OntologyClass::from_uri(node.into_string())))
    } else {
        PropertyRange::Datatype(declared_range.map(|node| local_name(node.as_str()).to_string()))
    };

    Ok(OntologyProperty {
        name: local_name(iri.as_str()).to_string(),
        uri: iri.as_str().to_string(),
        domain,
        range,
        label: view.label(session, iri)?,
        comment: view.comment(session, iri)?,
    })
}

/// Declared `rdfs:range` address of a property, if any.
pub(crate) fn declared_range(
    session: &Session<'_>,
    view: &GraphView,
    property: NamedNodeRef<'_>,
) -> OntologyResult<Option<NamedNode>> {
    Ok(view
        .objects(session, property.into(), rdfs::RANGE)?
        .into_iter()
        .find_map(|term| match term {
            Term::NamedNode(node) => Some(node),
            _ => None,
        }))
}

fn is_datatype(range: NamedNodeRef<'_>) -> bool {
    range.as_str().starts_with("http://www.w3.org/2001/XMLSchema#") || range == rdfs::LITERAL
}

pub(crate) fn property_matches(property: &OntologyProperty, query: &str) -> bool {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return false;
    }
    [
        Some(property.name.as_str()),
        property.label.as_deref(),
        property.comment.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|text| text.to_lowercase().contains(&needle))
}
