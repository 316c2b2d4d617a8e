//! Naming hygiene checks for new property and class names.
//!
//! Each check reports its own outcome struct; none of them fails through
//! [`OntologyError`](crate::error::OntologyError) for a rejected name.

use super::catalog::property_names_in;
use super::model::{NamingSchema, OntologyClass};
use super::similarity::{SimilarityChecker, SimilarityOutcome};
use super::view::GraphView;
use super::vocab::{owl, rdf, rdfs};
use crate::error::OntologyResult;
use crate::logging::graph_span;
use crate::store::{GraphStore, Session, is_absolute};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use oxigraph::model::NamedNode;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]+[a-z0-9]*|[a-z0-9]+").expect("word pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingSchemaResult {
    pub is_valid: bool,
    /// Filled in by [`NamingValidator::validate_property_name`] when the
    /// filtered-word check rejected the same name.
    pub filtered_word: Option<String>,
    pub new_property_name: String,
    pub ontology_naming_schema: NamingSchema,
    pub new_property_naming_schema: NamingSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredWordResult {
    pub is_valid: bool,
    pub new_property_name: String,
    pub filtered_word: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    Property,
    Individual,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UriUsage {
    pub uri: String,
    pub used: bool,
    /// What already occupies the address, when it is used.
    pub occupied_by: Option<EntityKind>,
}

/// Outcome of every check run on one proposed property name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNameReport {
    pub naming_schema: NamingSchemaResult,
    pub filtered_word: FilteredWordResult,
    pub uri: UriUsage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityOutcome>,
}

impl PropertyNameReport {
    /// True when no hard check failed. Similar properties are advisory.
    pub fn is_acceptable(&self) -> bool {
        self.naming_schema.is_valid && self.filtered_word.is_valid && !self.uri.used
    }
}

/// Classifies an identifier. Rules are tried in order: all caps, snake case,
/// camel case, pascal case.
pub fn classify(identifier: &str) -> NamingSchema {
    if identifier.is_empty()
        || !identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return NamingSchema::Unknown;
    }
    let has_letter = identifier.chars().any(|c| c.is_ascii_alphabetic());
    let has_lower = identifier.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = identifier.chars().any(|c| c.is_ascii_uppercase());
    let has_separator = identifier.contains('_');

    if has_letter && !has_lower {
        return NamingSchema::AllCaps;
    }
    if has_separator {
        return if has_upper {
            NamingSchema::Unknown
        } else {
            NamingSchema::SnakeCase
        };
    }
    match identifier.chars().next() {
        Some(first) if first.is_ascii_lowercase() => NamingSchema::CamelCase,
        Some(first) if first.is_ascii_uppercase() => NamingSchema::PascalCase,
        _ => NamingSchema::Unknown,
    }
}

/// Majority schema among `names`; ties go to the schema seen first. An empty
/// sample counts as camel case.
pub fn dominant_schema<I, S>(names: I) -> NamingSchema
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: IndexMap<NamingSchema, usize> = IndexMap::new();
    for name in names {
        *counts.entry(classify(name.as_ref())).or_default() += 1;
    }
    let mut best: Option<(NamingSchema, usize)> = None;
    for (schema, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((schema, count));
        }
    }
    best.map(|(schema, _)| schema).unwrap_or(NamingSchema::CamelCase)
}

/// Words of an identifier split at humps, underscores and digits-to-letter
/// boundaries, each with its first letter capitalized.
pub fn words(identifier: &str) -> Vec<String> {
    WORD.find_iter(identifier)
        .map(|word| capitalize(word.as_str()))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First filter word (in `filters` order) appearing as a whole word of
/// `name`. Matching is case-sensitive.
pub fn find_filtered_word<S: AsRef<str>>(name: &str, filters: &[S]) -> Option<String> {
    let parts = words(name);
    filters
        .iter()
        .map(AsRef::as_ref)
        .find(|filter| parts.iter().any(|part| part == filter))
        .map(str::to_string)
}

#[derive(Clone)]
pub struct NamingValidator {
    store: Arc<GraphStore>,
    filtered_words: Vec<String>,
    similarity: Option<SimilarityChecker>,
}

impl std::fmt::Debug for NamingValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamingValidator")
            .field("filtered_words", &self.filtered_words)
            .field("similarity", &self.similarity.is_some())
            .finish()
    }
}

impl NamingValidator {
    pub fn new(store: Arc<GraphStore>, filtered_words: Vec<String>) -> Self {
        Self {
            store,
            filtered_words,
            similarity: None,
        }
    }

    /// Enables the similarity check in [`Self::validate_property_name`].
    pub fn with_similarity(mut self, checker: SimilarityChecker) -> Self {
        self.similarity = Some(checker);
        self
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn filtered_words(&self) -> &[String] {
        &self.filtered_words
    }

    /// Compares the new name's schema with the ontology's dominant one,
    /// sampled from its object and datatype property names.
    pub fn check_naming_schema(
        &self,
        session: &Session<'_>,
        graph: &str,
        new_name: &str,
    ) -> OntologyResult<NamingSchemaResult> {
        let view = GraphView::open(session, graph)?;
        let ontology_schema = dominant_schema(property_names_in(session, &view)?);
        let new_schema = classify(new_name);
        debug!(
            graph,
            name = new_name,
            ontology = %ontology_schema,
            candidate = %new_schema,
            "naming schema checked"
        );
        Ok(NamingSchemaResult {
            is_valid: ontology_schema == new_schema,
            filtered_word: None,
            new_property_name: new_name.to_string(),
            ontology_naming_schema: ontology_schema,
            new_property_naming_schema: new_schema,
        })
    }

    pub fn check_naming(&self, new_name: &str) -> FilteredWordResult {
        let filtered_word = find_filtered_word(new_name, &self.filtered_words);
        FilteredWordResult {
            is_valid: filtered_word.is_none(),
            new_property_name: new_name.to_string(),
            filtered_word,
        }
    }

    /// Reports whether a class, property or individual already sits at
    /// `uri` (a full address, or a local name in the ontology's namespace).
    pub fn check_if_uri_is_used(
        &self,
        session: &Session<'_>,
        graph: &str,
        uri: &str,
    ) -> OntologyResult<UriUsage> {
        let view = GraphView::open(session, graph)?;
        let node = if is_absolute(uri) {
            NamedNode::new(uri)?
        } else {
            view.entity_iri(uri)?
        };
        let used = view.describes(session, node.as_ref())?;
        let occupied_by = if used {
            Some(entity_kind(session, &view, &node)?)
        } else {
            None
        };
        Ok(UriUsage {
            uri: node.into_string(),
            used,
            occupied_by,
        })
    }

    /// Runs every check on a proposed property for `domain`. The store checks
    /// share one read session, which is released before the synonym lookup.
    pub fn validate_property_name(
        &self,
        graph: &str,
        domain: Option<&OntologyClass>,
        new_name: &str,
    ) -> OntologyResult<PropertyNameReport> {
        let _span = graph_span("validate_property_name", graph).entered();
        let filtered_word = self.check_naming(new_name);
        let (mut naming_schema, uri) = self.store.read_with(|session| {
            let naming_schema = self.check_naming_schema(session, graph, new_name)?;
            let uri = self.check_if_uri_is_used(session, graph, new_name)?;
            Ok::<_, crate::error::OntologyError>((naming_schema, uri))
        })?;
        naming_schema.filtered_word = filtered_word.filtered_word.clone();

        let similarity = match &self.similarity {
            Some(checker) => Some(checker.find_similar_properties(graph, domain, new_name)?),
            None => None,
        };

        Ok(PropertyNameReport {
            naming_schema,
            filtered_word,
            uri,
            similarity,
        })
    }
}

fn entity_kind(session: &Session<'_>, view: &GraphView, node: &NamedNode) -> OntologyResult<EntityKind> {
    let types = view.named_objects(session, node.as_ref().into(), rdf::TYPE)?;
    let is = |kind: oxigraph::model::NamedNodeRef<'_>| types.iter().any(|t| t.as_ref() == kind);
    if is(owl::CLASS) || is(rdfs::CLASS) {
        return Ok(EntityKind::Class);
    }
    if is(owl::OBJECT_PROPERTY)
        || is(owl::DATATYPE_PROPERTY)
        || is(owl::ANNOTATION_PROPERTY)
        || is(rdf::PROPERTY)
    {
        return Ok(EntityKind::Property);
    }
    if !types.is_empty() {
        return Ok(EntityKind::Individual);
    }
    Ok(EntityKind::Other)
}
