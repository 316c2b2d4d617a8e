//! Catalog, subclass graph and constraint extraction over the restaurant
//! ontology.

mod support;

use assert_matches::assert_matches;
use ontoform::OntologyError;
use ontoform::ontology::{
    ConstraintEngine, ConstraintType, Individual, IndividualAccessor, OntologyCatalog,
    OntologyClass, PropertyRange, Restriction, SubclassGraphBuilder,
};
use oxigraph::model::{NamedNode, Quad, vocab::rdf};
use support::{GRAPH, class, iri, restaurant_store};

#[test]
fn catalog_lists_ontologies_classes_and_properties() {
    let store = restaurant_store();
    let catalog = OntologyCatalog::new(store.clone());
    let session = store.read();

    assert_eq!(catalog.list_ontologies(&session).unwrap(), vec![GRAPH.to_string()]);

    let classes: Vec<_> = catalog
        .list_classes(&session, GRAPH)
        .unwrap()
        .into_iter()
        .map(|class| class.name)
        .collect();
    for expected in ["Cheese", "Dish", "Herb", "MainCourse", "Spiciness", "VeganDish"] {
        assert!(classes.contains(&expected.to_string()), "missing {expected}");
    }

    let price = catalog.find_property(&session, GRAPH, "hasPrice").unwrap().unwrap();
    assert_eq!(price.domain, class("Dish"));
    assert_eq!(price.range, PropertyRange::Datatype(Some("double".into())));

    let note = catalog.find_property(&session, GRAPH, "servingNote").unwrap().unwrap();
    assert!(note.domain.is_root());
}

#[test]
fn unknown_graph_is_reported() {
    let store = restaurant_store();
    let catalog = OntologyCatalog::new(store.clone());
    let session = store.read();
    assert_matches!(
        catalog.list_classes(&session, "bakery"),
        Err(OntologyError::GraphNotFound(name)) if name == "bakery"
    );
}

#[test]
fn root_aliases_collapse_to_the_canonical_root() {
    let store = restaurant_store();
    let builder = SubclassGraphBuilder::new(store.clone());
    let session = store.read();

    let graph = builder
        .build_for_class(&session, GRAPH, &class("MainCourse"))
        .unwrap();
    let roots: Vec<_> = graph.classes().filter(|c| c.is_root()).collect();
    assert_eq!(roots, vec![&OntologyClass::root()]);
    assert!(graph.contains_edge(&OntologyClass::root(), &class("Dish")));
    assert!(graph.contains_edge(&class("Dish"), &class("MainCourse")));
    assert_eq!(graph.edges().len(), 2);
}

#[test]
fn every_edge_endpoint_is_a_class_of_the_graph() {
    let store = restaurant_store();
    let builder = SubclassGraphBuilder::new(store.clone());
    let session = store.read();

    let graph = builder.build_for_graph(&session, GRAPH).unwrap();
    for edge in graph.edges() {
        assert!(graph.contains_class(&edge.super_class));
        assert!(graph.contains_class(&edge.sub_class));
    }
    assert!(graph.contains_edge(&class("Vegetable"), &class("Herb")));
    assert!(graph.contains_edge(&OntologyClass::root(), &class("Ingredient")));

    assert!(builder
        .is_subclass_of(&session, GRAPH, &class("Herb"), &class("Ingredient"))
        .unwrap());
    assert!(!builder
        .is_subclass_of(&session, GRAPH, &class("Ingredient"), &class("Herb"))
        .unwrap());
}

#[test]
fn max_restriction_yields_a_single_constraint() {
    let store = restaurant_store();
    let engine = ConstraintEngine::new(store.clone());
    let session = store.read();

    let constraints = engine
        .constraints_for(&session, GRAPH, &class("Dish"), Some("hasIngredient"))
        .unwrap();
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].restriction, Restriction::Max(3));
    assert_eq!(constraints[0].restriction.constraint_type(), ConstraintType::Max);
    assert_eq!(constraints[0].on_property.uri, iri("hasIngredient"));
}

#[test]
fn property_without_restriction_yields_nothing() {
    let store = restaurant_store();
    let engine = ConstraintEngine::new(store.clone());
    let session = store.read();

    let constraints = engine
        .constraints_for(&session, GRAPH, &class("Dish"), Some("calories"))
        .unwrap();
    assert!(constraints.is_empty());

    let unknown = engine
        .constraints_for(&session, GRAPH, &class("Dish"), Some("hasSauce"))
        .unwrap();
    assert!(unknown.is_empty());
}

#[test]
fn all_restriction_kinds_are_classified() {
    let store = restaurant_store();
    let engine = ConstraintEngine::new(store.clone());
    let session = store.read();

    let restrictions: Vec<_> = engine
        .constraints_for(&session, GRAPH, &class("Dish"), None)
        .unwrap()
        .into_iter()
        .map(|c| c.restriction)
        .collect();
    assert_eq!(restrictions.len(), 3);
    assert!(restrictions.contains(&Restriction::Exactly(1)));
    assert!(restrictions.contains(&Restriction::Only(iri("Spiciness"))));

    // the existential restriction on VeganDish is skipped
    let vegan = engine
        .constraints_for(&session, GRAPH, &class("VeganDish"), None)
        .unwrap();
    assert_eq!(vegan.len(), 1);
    assert_eq!(vegan[0].restriction, Restriction::Only(iri("Vegetable")));
}

#[test]
fn only_filter_considers_every_asserted_type() {
    let store = restaurant_store();
    let engine = ConstraintEngine::new(store.clone());
    let accessor = IndividualAccessor::new(store.clone());

    store
        .write_with(|session| {
            let cheese = accessor.add_individual(session, GRAPH, &class("Cheese"), "Halloumi")?;
            let graph = session.graph_iri(GRAPH)?;
            session.insert(Quad::new(
                NamedNode::new(cheese.iri.as_str())?,
                rdf::TYPE,
                NamedNode::new(iri("Vegetable"))?,
                graph,
            ))?;
            Ok::<_, OntologyError>(())
        })
        .unwrap();

    let session = store.read();
    let halloumi = Individual {
        name: "Halloumi".into(),
        iri: iri("Halloumi"),
        label: "Halloumi".into(),
        ontology_class: class("Cheese"),
        imported: false,
        first_draft_name: None,
    };
    let allowed = engine
        .filter_for_property(&session, GRAPH, &class("VeganDish"), "hasIngredient", vec![halloumi])
        .unwrap();
    assert_eq!(allowed.len(), 1);
}

#[test]
fn only_constraints_filter_candidate_individuals() {
    let store = restaurant_store();
    let engine = ConstraintEngine::new(store.clone());
    let accessor = IndividualAccessor::new(store.clone());
    let session = store.read();

    let everyone = accessor.list_individuals(&session, GRAPH).unwrap();
    let names = |individuals: Vec<ontoform::ontology::Individual>| -> Vec<String> {
        individuals.into_iter().map(|i| i.name).collect()
    };

    let vegetables = engine
        .filter_for_property(&session, GRAPH, &class("VeganDish"), "hasIngredient", everyone.clone())
        .unwrap();
    assert_eq!(names(vegetables), vec!["Basil", "Tomato"]);

    let levels = engine
        .filter_for_property(&session, GRAPH, &class("Dish"), "hasSpiciness", everyone.clone())
        .unwrap();
    assert_eq!(names(levels), vec!["Hot", "Mild"]);

    // MAX constraints admit everyone
    let max = engine
        .constraints_for(&session, GRAPH, &class("Dish"), Some("hasIngredient"))
        .unwrap()
        .remove(0);
    let unchanged = engine
        .filter_allowed_individuals(&session, GRAPH, everyone.clone(), &max)
        .unwrap();
    assert_eq!(unchanged.len(), everyone.len());
}
