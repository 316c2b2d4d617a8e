//! Value objects projected from store contents.
//!
//! Every type here is rebuilt from triples on each query and never cached.

use super::vocab::{ROOT_ALIASES, local_name, owl};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Canonical label of the universal root class.
pub const ROOT_CLASS_NAME: &str = "Thing";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OntologyClass {
    pub name: String,
    pub uri: String,
}

impl OntologyClass {
    /// Builds a class, collapsing every alias of the universal root onto the
    /// single [`OntologyClass::root`] value.
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        if is_root_address(&uri) {
            return Self::root();
        }
        Self {
            name: name.into(),
            uri,
        }
    }

    /// Class named after the local part of its address.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let name = local_name(&uri).to_string();
        Self::new(name, uri)
    }

    pub fn root() -> Self {
        Self {
            name: ROOT_CLASS_NAME.to_string(),
            uri: owl::THING.as_str().to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.uri == owl::THING.as_str()
    }
}

pub fn is_root_address(uri: &str) -> bool {
    ROOT_ALIASES.contains(&uri)
}

/// What values a property accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "range", rename_all = "snake_case")]
pub enum PropertyRange {
    /// Values are individuals of the given class, when one is declared.
    Object(Option<OntologyClass>),
    /// Values are literals; carries the local name of the declared datatype.
    Datatype(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyProperty {
    pub name: String,
    pub uri: String,
    /// Declared domain; the root class when none is declared.
    pub domain: OntologyClass,
    pub range: PropertyRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl OntologyProperty {
    pub fn is_object_property(&self) -> bool {
        matches!(self.range, PropertyRange::Object(_))
    }

    pub fn object_range(&self) -> Option<&OntologyClass> {
        match &self.range {
            PropertyRange::Object(range) => range.as_ref(),
            PropertyRange::Datatype(_) => None,
        }
    }

    pub fn datatype_range(&self) -> Option<&str> {
        match &self.range {
            PropertyRange::Datatype(range) => range.as_deref(),
            PropertyRange::Object(_) => None,
        }
    }
}

/// An instance of a class. Drafts are individuals carrying
/// `first_draft_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    pub name: String,
    pub iri: String,
    /// `rdfs:label`, or the local name when the individual has none.
    pub label: String,
    pub ontology_class: OntologyClass,
    /// True when the type assertion comes from an imported graph.
    pub imported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_draft_name: Option<String>,
}

impl Individual {
    pub fn is_draft(&self) -> bool {
        self.first_draft_name.is_some()
    }
}

/// A restriction classified into one of the supported kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "constraintType",
    content = "value",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum Restriction {
    Min(u64),
    Max(u64),
    Exactly(u64),
    /// Address of the class every value must belong to.
    Only(String),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    Min,
    Max,
    Exactly,
    Only,
}

impl Restriction {
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            Restriction::Min(_) => ConstraintType::Min,
            Restriction::Max(_) => ConstraintType::Max,
            Restriction::Exactly(_) => ConstraintType::Exactly,
            Restriction::Only(_) => ConstraintType::Only,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub domain: OntologyClass,
    pub on_property: OntologyProperty,
    #[serde(flatten)]
    pub restriction: Restriction,
}

impl Constraint {
    pub fn constraint_type(&self) -> ConstraintType {
        self.restriction.constraint_type()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubclassRelation {
    pub super_class: OntologyClass,
    pub sub_class: OntologyClass,
}

/// Classes and the subclass edges between them.
///
/// Every edge endpoint is always a member of `classes`. Edges are append-only;
/// callers that may revisit a pair check [`SubclassGraph::contains_edge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubclassGraph {
    classes: IndexSet<OntologyClass>,
    edges: Vec<SubclassRelation>,
}

impl SubclassGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the class was already present.
    pub fn add_class(&mut self, class: OntologyClass) -> bool {
        self.classes.insert(class)
    }

    pub fn add_edge(&mut self, super_class: OntologyClass, sub_class: OntologyClass) {
        self.add_class(super_class.clone());
        self.add_class(sub_class.clone());
        self.edges.push(SubclassRelation {
            super_class,
            sub_class,
        });
    }

    pub fn contains_class(&self, class: &OntologyClass) -> bool {
        self.classes.contains(class)
    }

    pub fn contains_edge(&self, super_class: &OntologyClass, sub_class: &OntologyClass) -> bool {
        self.edges
            .iter()
            .any(|edge| &edge.super_class == super_class && &edge.sub_class == sub_class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &OntologyClass> {
        self.classes.iter()
    }

    pub fn edges(&self) -> &[SubclassRelation] {
        &self.edges
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Direct subclasses of `class`, in edge order.
    pub fn children_of<'g>(
        &'g self,
        class: &'g OntologyClass,
    ) -> impl Iterator<Item = &'g OntologyClass> + 'g {
        self.edges
            .iter()
            .filter(move |edge| &edge.super_class == class)
            .map(|edge| &edge.sub_class)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NamingSchema {
    CamelCase,
    PascalCase,
    SnakeCase,
    AllCaps,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_aliases_collapse_to_one_value() {
        let thing = OntologyClass::new("Thing", "http://www.w3.org/2002/07/owl#Thing");
        let resource = OntologyClass::new(
            "Resource",
            "http://www.w3.org/2000/01/rdf-schema#Resource",
        );
        let relabelled = OntologyClass::new("Everything", owl::THING.as_str());
        assert_eq!(thing, OntologyClass::root());
        assert_eq!(resource, OntologyClass::root());
        assert_eq!(relabelled, OntologyClass::root());
        assert!(resource.is_root());
    }

    #[test]
    fn class_identity_uses_name_and_uri() {
        let a = OntologyClass::new("Dish", "http://example.org/menu#Dish");
        let b = OntologyClass::new("Meal", "http://example.org/menu#Dish");
        assert_ne!(a, b);
        assert_eq!(a, OntologyClass::from_uri("http://example.org/menu#Dish"));
    }

    #[test]
    fn add_class_reports_duplicates() {
        let mut graph = SubclassGraph::new();
        let dish = OntologyClass::from_uri("http://example.org/menu#Dish");
        assert!(graph.add_class(dish.clone()));
        assert!(!graph.add_class(dish));
        assert_eq!(graph.class_count(), 1);
    }

    #[test]
    fn add_edge_inserts_missing_endpoints() {
        let mut graph = SubclassGraph::new();
        let dish = OntologyClass::from_uri("http://example.org/menu#Dish");
        let soup = OntologyClass::from_uri("http://example.org/menu#Soup");
        graph.add_edge(dish.clone(), soup.clone());
        assert!(graph.contains_class(&dish));
        assert!(graph.contains_class(&soup));
        assert!(graph.contains_edge(&dish, &soup));
        assert!(!graph.contains_edge(&soup, &dish));
        assert_eq!(graph.children_of(&dish).collect::<Vec<_>>(), vec![&soup]);
    }

    #[test]
    fn constraint_serializes_type_and_value() {
        let dish = OntologyClass::from_uri("http://example.org/menu#Dish");
        let constraint = Constraint {
            domain: dish.clone(),
            on_property: OntologyProperty {
                name: "hasPrice".into(),
                uri: "http://example.org/menu#hasPrice".into(),
                domain: dish,
                range: PropertyRange::Datatype(Some("double".into())),
                label: None,
                comment: None,
            },
            restriction: Restriction::Max(1),
        };
        let json = serde_json::to_value(&constraint).unwrap();
        assert_eq!(json["constraintType"], "MAX");
        assert_eq!(json["value"], 1);
        assert_eq!(json["onProperty"]["name"], "hasPrice");
        assert_eq!(constraint.constraint_type().to_string(), "MAX");
    }

    #[test]
    fn naming_schema_display_matches_wire_names() {
        assert_eq!(NamingSchema::CamelCase.to_string(), "CAMEL_CASE");
        assert_eq!(NamingSchema::AllCaps.to_string(), "ALL_CAPS");
        assert_eq!(
            "PASCAL_CASE".parse::<NamingSchema>().unwrap(),
            NamingSchema::PascalCase
        );
    }
}
