//! Cardinality and value constraints derived from restriction axioms.

use super::catalog::property_for;
use super::hierarchy::is_subclass_of;
use super::model::{Constraint, Individual, OntologyClass, Restriction};
use super::view::GraphView;
use super::vocab::{owl, rdf, rdfs};
use crate::error::OntologyResult;
use crate::store::{GraphStore, Session, is_absolute};
use indexmap::IndexSet;
use oxigraph::model::{NamedNode, NamedOrBlankNode, NamedOrBlankNodeRef, Term};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct ConstraintEngine {
    store: Arc<GraphStore>,
}

impl ConstraintEngine {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    /// Constraints declared on `domain` through restriction superclasses, in
    /// superclass iteration order. With `property` set (local name or
    /// address) only restrictions on that property are kept. Restriction
    /// kinds other than min, max, exact cardinality and all-values-from are
    /// skipped.
    pub fn constraints_for(
        &self,
        session: &Session<'_>,
        graph: &str,
        domain: &OntologyClass,
        property: Option<&str>,
    ) -> OntologyResult<Vec<Constraint>> {
        let view = GraphView::open(session, graph)?;
        let wanted = match property {
            Some(identifier) => match normalize_property(session, &view, identifier)? {
                Some(address) => Some(address),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let class = NamedNode::new(domain.uri.as_str())?;
        let mut constraints = Vec::new();
        for parent in view.objects(session, class.as_ref().into(), rdfs::SUB_CLASS_OF)? {
            let Some(axiom) = as_resource(parent) else {
                continue;
            };
            if !is_restriction(session, &view, axiom.as_ref())? {
                continue;
            }
            let Some(on_property) = view
                .named_objects(session, axiom.as_ref(), owl::ON_PROPERTY)?
                .into_iter()
                .next()
            else {
                continue;
            };
            if wanted.as_ref().is_some_and(|wanted| wanted != &on_property) {
                continue;
            }
            let Some(restriction) = classify(session, &view, axiom.as_ref())? else {
                trace!(property = %on_property, "unsupported restriction kind skipped");
                continue;
            };
            constraints.push(Constraint {
                domain: domain.clone(),
                on_property: property_for(session, &view, on_property.as_ref())?,
                restriction,
            });
        }

        debug!(
            graph,
            class = %domain.uri,
            constraints = constraints.len(),
            "constraints extracted"
        );
        Ok(constraints)
    }

    /// Keeps the individuals an `ONLY` constraint admits: those whose class
    /// equals or specializes the allowed class, or, for an enumerated class,
    /// those listed in its `owl:oneOf`. Other constraint kinds admit every
    /// candidate.
    pub fn filter_allowed_individuals(
        &self,
        session: &Session<'_>,
        graph: &str,
        individuals: Vec<Individual>,
        constraint: &Constraint,
    ) -> OntologyResult<Vec<Individual>> {
        let Restriction::Only(range) = &constraint.restriction else {
            return Ok(individuals);
        };
        let view = GraphView::open(session, graph)?;
        filter_by_range(session, &view, individuals, range)
    }

    /// Applies every `ONLY` constraint `domain` declares on `property`.
    pub fn filter_for_property(
        &self,
        session: &Session<'_>,
        graph: &str,
        domain: &OntologyClass,
        property: &str,
        individuals: Vec<Individual>,
    ) -> OntologyResult<Vec<Individual>> {
        let view = GraphView::open(session, graph)?;
        let mut remaining = individuals;
        for constraint in self.constraints_for(session, graph, domain, Some(property))? {
            if let Restriction::Only(range) = &constraint.restriction {
                remaining = filter_by_range(session, &view, remaining, range)?;
            }
        }
        Ok(remaining)
    }
}

/// Single classification step from a restriction node to its kind. Checked
/// in a fixed order; the first declared kind wins.
fn classify(
    session: &Session<'_>,
    view: &GraphView,
    axiom: NamedOrBlankNodeRef<'_>,
) -> OntologyResult<Option<Restriction>> {
    if let Some(max) = cardinality(session, view, axiom, owl::MAX_CARDINALITY)? {
        return Ok(Some(Restriction::Max(max)));
    }
    if let Some(min) = cardinality(session, view, axiom, owl::MIN_CARDINALITY)? {
        return Ok(Some(Restriction::Min(min)));
    }
    if let Some(exact) = cardinality(session, view, axiom, owl::CARDINALITY)? {
        return Ok(Some(Restriction::Exactly(exact)));
    }
    let only = view
        .named_objects(session, axiom, owl::ALL_VALUES_FROM)?
        .into_iter()
        .next();
    Ok(only.map(|range| Restriction::Only(range.into_string())))
}

fn cardinality(
    session: &Session<'_>,
    view: &GraphView,
    axiom: NamedOrBlankNodeRef<'_>,
    predicate: oxigraph::model::NamedNodeRef<'_>,
) -> OntologyResult<Option<u64>> {
    Ok(view
        .literal(session, axiom, predicate)?
        .and_then(|literal| literal.value().trim().parse().ok()))
}

fn is_restriction(
    session: &Session<'_>,
    view: &GraphView,
    node: NamedOrBlankNodeRef<'_>,
) -> OntologyResult<bool> {
    let typed = !view
        .triples(
            session,
            Some(node),
            Some(rdf::TYPE),
            Some(owl::RESTRICTION.into()),
        )?
        .is_empty();
    Ok(typed
        || !view
            .triples(session, Some(node), Some(owl::ON_PROPERTY), None)?
            .is_empty())
}

fn as_resource(term: Term) -> Option<NamedOrBlankNode> {
    match term {
        Term::NamedNode(node) => Some(node.into()),
        Term::BlankNode(node) => Some(node.into()),
        _ => None,
    }
}

/// Full address of a property identifier. Local names that resolve to
/// nothing in the view yield `None`.
fn normalize_property(
    session: &Session<'_>,
    view: &GraphView,
    identifier: &str,
) -> OntologyResult<Option<NamedNode>> {
    if is_absolute(identifier) {
        return Ok(Some(NamedNode::new(identifier)?));
    }
    view.resolve(session, identifier)
}

fn filter_by_range(
    session: &Session<'_>,
    view: &GraphView,
    individuals: Vec<Individual>,
    range: &str,
) -> OntologyResult<Vec<Individual>> {
    let range_node = NamedNode::new(range)?;
    let members = enumerated_members(session, view, range_node)?;

    let mut allowed = Vec::with_capacity(individuals.len());
    for individual in individuals {
        let admitted = match &members {
            Some(members) => members.contains(individual.iri.as_str()),
            None => has_type_within(session, view, &individual, range)?,
        };
        if admitted {
            allowed.push(individual);
        }
    }
    Ok(allowed)
}

/// True when the projected class or any asserted type of `individual`
/// equals or specializes `range`.
fn has_type_within(
    session: &Session<'_>,
    view: &GraphView,
    individual: &Individual,
    range: &str,
) -> OntologyResult<bool> {
    if is_subclass_of(session, view, &individual.ontology_class.uri, range)? {
        return Ok(true);
    }
    let node = NamedNode::new(individual.iri.as_str())?;
    for class in view.named_objects(session, node.as_ref().into(), rdf::TYPE)? {
        if is_subclass_of(session, view, class.as_str(), range)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Members of an `owl:oneOf` class, or `None` when the class is not
/// enumerated.
fn enumerated_members(
    session: &Session<'_>,
    view: &GraphView,
    class: NamedNode,
) -> OntologyResult<Option<IndexSet<String>>> {
    let Some(head) = view.object(session, class.as_ref().into(), owl::ONE_OF)? else {
        return Ok(None);
    };

    let mut members = IndexSet::new();
    let mut visited = IndexSet::new();
    let mut cursor = as_resource(head);
    while let Some(cell) = cursor {
        if cell.as_ref() == NamedOrBlankNodeRef::from(rdf::NIL) || !visited.insert(cell.clone()) {
            break;
        }
        if let Some(Term::NamedNode(member)) = view.object(session, cell.as_ref(), rdf::FIRST)? {
            members.insert(member.into_string());
        }
        cursor = view
            .object(session, cell.as_ref(), rdf::REST)?
            .and_then(as_resource);
    }
    Ok(Some(members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::catalog::OntologyCatalog;

    const MENU: &str = r#"
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

        <#Dish> a owl:Class ;
            rdfs:subClassOf [ a owl:Restriction ; owl:onProperty <#hasIngredient> ;
                              owl:maxCardinality "3"^^xsd:nonNegativeInteger ] ,
                            [ a owl:Restriction ; owl:onProperty <#hasIngredient> ;
                              owl:allValuesFrom <#Ingredient> ] ,
                            [ a owl:Restriction ; owl:onProperty <#servedWith> ;
                              owl:someValuesFrom <#Drink> ] ,
                            [ a owl:Restriction ; owl:onProperty <#spiciness> ;
                              owl:allValuesFrom <#Level> ] .
        <#Ingredient> a owl:Class .
        <#Vegetable> a owl:Class ; rdfs:subClassOf <#Ingredient> .
        <#Drink> a owl:Class .
        <#Level> a owl:Class ; owl:oneOf ( <#mild> <#hot> ) .
        <#hasIngredient> a owl:ObjectProperty ; rdfs:domain <#Dish> .
        <#servedWith> a owl:ObjectProperty .
        <#spiciness> a owl:ObjectProperty .
        <#hasPrice> a owl:DatatypeProperty .
    "#;

    const NS: &str = "http://ontologies.example.org/menu#";

    fn engine() -> ConstraintEngine {
        let store = Arc::new(GraphStore::in_memory("http://ontologies.example.org").unwrap());
        OntologyCatalog::new(store.clone()).import("menu", MENU).unwrap();
        ConstraintEngine::new(store)
    }

    fn individual(local: &str, class: &str) -> Individual {
        Individual {
            name: local.into(),
            iri: format!("{NS}{local}"),
            label: local.into(),
            ontology_class: OntologyClass::from_uri(format!("{NS}{class}")),
            imported: false,
            first_draft_name: None,
        }
    }

    fn dish() -> OntologyClass {
        OntologyClass::from_uri(format!("{NS}Dish"))
    }

    #[test]
    fn existential_restrictions_are_skipped() {
        let engine = engine();
        let session = engine.store().read();
        let constraints = engine.constraints_for(&session, "menu", &dish(), None).unwrap();
        assert_eq!(constraints.len(), 3);
        assert!(constraints.iter().all(|c| c.on_property.name != "servedWith"));
    }

    #[test]
    fn filtering_by_property_keeps_only_its_restrictions() {
        let engine = engine();
        let session = engine.store().read();
        let mut kinds: Vec<_> = engine
            .constraints_for(&session, "menu", &dish(), Some("hasIngredient"))
            .unwrap()
            .into_iter()
            .map(|c| c.restriction)
            .collect();
        kinds.sort_by_key(|r| r.constraint_type().to_string());
        assert_eq!(
            kinds,
            vec![Restriction::Max(3), Restriction::Only(format!("{NS}Ingredient"))]
        );

        let none = engine
            .constraints_for(&session, "menu", &dish(), Some(format!("{NS}hasPrice").as_str()))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn only_filter_admits_subclass_members() {
        let engine = engine();
        let session = engine.store().read();
        let candidates = vec![
            individual("salt", "Ingredient"),
            individual("carrot", "Vegetable"),
            individual("cola", "Drink"),
        ];
        let kept = engine
            .filter_for_property(&session, "menu", &dish(), "hasIngredient", candidates)
            .unwrap();
        let names: Vec<_> = kept.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["salt", "carrot"]);
    }

    #[test]
    fn enumerated_range_admits_listed_members() {
        let engine = engine();
        let session = engine.store().read();
        let candidates = vec![individual("mild", "Level"), individual("extreme", "Level")];
        let kept = engine
            .filter_for_property(&session, "menu", &dish(), "spiciness", candidates)
            .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "mild");
    }
}
