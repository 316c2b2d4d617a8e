#![allow(dead_code)]

use std::sync::Arc;

use ontoform::ontology::{
    OntologyCatalog, OntologyClass, Synonym, SynonymLookup,
};
use ontoform::{GraphStore, OntologyError, OntologyResult};

pub const BASE: &str = "http://ontologies.example.org";
pub const GRAPH: &str = "restaurant";
pub const NS: &str = "http://ontologies.example.org/restaurant#";

pub const RESTAURANT: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<#Dish> a owl:Class ;
    rdfs:subClassOf owl:Thing ;
    rdfs:subClassOf [ a owl:Restriction ; owl:onProperty <#hasIngredient> ;
                      owl:maxCardinality "3"^^xsd:nonNegativeInteger ] ,
                    [ a owl:Restriction ; owl:onProperty <#hasPrice> ;
                      owl:cardinality "1"^^xsd:nonNegativeInteger ] ,
                    [ a owl:Restriction ; owl:onProperty <#hasSpiciness> ;
                      owl:allValuesFrom <#Spiciness> ] .
<#MainCourse> a owl:Class ; rdfs:subClassOf <#Dish> .
<#VeganDish> a owl:Class ;
    rdfs:subClassOf <#Dish> ;
    rdfs:subClassOf [ a owl:Restriction ; owl:onProperty <#hasIngredient> ;
                      owl:allValuesFrom <#Vegetable> ] ,
                    [ a owl:Restriction ; owl:onProperty <#hasIngredient> ;
                      owl:someValuesFrom <#Herb> ] .
<#Ingredient> a owl:Class .
<#Cheese> a owl:Class ; rdfs:subClassOf <#Ingredient> .
<#Vegetable> a owl:Class ; rdfs:subClassOf <#Ingredient> .
<#Herb> a owl:Class ; rdfs:subClassOf <#Vegetable> .
<#Spiciness> a owl:Class ; owl:oneOf ( <#Mild> <#Hot> ) .

<#hasIngredient> a owl:ObjectProperty ;
    rdfs:domain <#Dish> ; rdfs:range <#Ingredient> ;
    rdfs:label "has ingredient" .
<#hasSpiciness> a owl:ObjectProperty ; rdfs:domain <#Dish> ; rdfs:range <#Spiciness> .
<#hasPrice> a owl:DatatypeProperty ;
    rdfs:domain <#Dish> ; rdfs:range xsd:double ;
    rdfs:comment "Menu price in euros" .
<#calories> a owl:DatatypeProperty ; rdfs:domain <#Dish> ; rdfs:range xsd:int .
<#isVegan> a owl:DatatypeProperty ; rdfs:domain <#Dish> ; rdfs:range xsd:boolean .
<#servingNote> a owl:DatatypeProperty ; rdfs:range <http://example.org/types#Markdown> .

<#Mozzarella> a <#Cheese> , owl:NamedIndividual .
<#Tomato> a <#Vegetable> , owl:NamedIndividual .
<#Basil> a <#Herb> , owl:NamedIndividual ; rdfs:label "Sweet basil" .
<#Mild> a owl:NamedIndividual .
<#Hot> a owl:NamedIndividual .
<#Medium> a owl:NamedIndividual .
<#Margherita> a <#MainCourse> , owl:NamedIndividual ;
    <#hasIngredient> <#Mozzarella> , <#Tomato> ;
    <#hasPrice> "8.5"^^xsd:double ;
    <#calories> "850"^^xsd:int .
"#;

/// Store holding the restaurant ontology under [`GRAPH`].
pub fn restaurant_store() -> Arc<GraphStore> {
    let store = Arc::new(GraphStore::in_memory(BASE).expect("in-memory store"));
    OntologyCatalog::new(store.clone())
        .import(GRAPH, RESTAURANT)
        .expect("import restaurant ontology");
    store
}

pub fn class(local: &str) -> OntologyClass {
    OntologyClass::from_uri(format!("{NS}{local}"))
}

pub fn iri(local: &str) -> String {
    format!("{NS}{local}")
}

/// Synonym lookup answering from a fixed word list.
pub struct FixedSynonyms(pub Vec<&'static str>);

impl SynonymLookup for FixedSynonyms {
    fn synonyms(&self, _word: &str) -> OntologyResult<Vec<Synonym>> {
        Ok(self
            .0
            .iter()
            .enumerate()
            .map(|(rank, word)| Synonym {
                word: word.to_string(),
                score: 1000 - rank as u64,
            })
            .collect())
    }
}

/// Synonym lookup that is always down.
pub struct UnreachableSynonyms;

impl SynonymLookup for UnreachableSynonyms {
    fn synonyms(&self, _word: &str) -> OntologyResult<Vec<Synonym>> {
        Err(OntologyError::External {
            service: "synonyms",
            message: "connection refused".into(),
        })
    }
}
