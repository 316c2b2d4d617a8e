//! Schema introspection over ontologies stored as named graphs.
//!
//! Every engine here is a thin handle around a shared [`GraphStore`] and
//! takes the [`Session`] to work in as an argument, so several calls can be
//! composed inside one transaction:
//!
//! ```rust,ignore
//! use ontoform::ontology::{IndividualAccessor, OntologyCatalog};
//!
//! let catalog = OntologyCatalog::new(store.clone());
//! let accessor = IndividualAccessor::new(store.clone());
//! store.write_with(|session| {
//!     let dish = catalog
//!         .find_class(session, "restaurant", "Dish")?
//!         .unwrap_or_else(OntologyClass::root);
//!     accessor.add_individual(session, "restaurant", &dish, "Carbonara")
//! })?;
//! ```
//!
//! [`GraphStore`]: crate::store::GraphStore
//! [`Session`]: crate::store::Session

pub mod accessor;
pub mod catalog;
pub mod consistency;
pub mod constraints;
pub mod hierarchy;
pub mod literal;
pub mod model;
pub mod naming;
pub mod similarity;
pub mod view;
pub mod vocab;

pub use accessor::{
    EditSummary, IndividualAccessor, PropertyAssertion, PropertyEdit, PropertyValue,
};
pub use catalog::{ImportSummary, OntologyCatalog};
pub use consistency::{
    ConsistencyOutcome, ConsistencyReport, ConsistencyValidator, HttpConsistencyValidator,
    check_consistency,
};
pub use constraints::ConstraintEngine;
pub use hierarchy::SubclassGraphBuilder;
pub use literal::TypedValue;
pub use model::{
    Constraint, ConstraintType, Individual, NamingSchema, OntologyClass, OntologyProperty,
    PropertyRange, Restriction, SubclassGraph, SubclassRelation,
};
pub use naming::{
    FilteredWordResult, NamingSchemaResult, NamingValidator, PropertyNameReport, UriUsage,
};
pub use similarity::{DatamuseLookup, SimilarityChecker, SimilarityOutcome, Synonym, SynonymLookup};
pub use view::GraphView;
