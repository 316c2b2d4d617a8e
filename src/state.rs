use crate::config::EngineConfig;
use crate::error::OntologyResult;
use crate::ontology::{
    ConsistencyValidator, ConstraintEngine, DatamuseLookup, HttpConsistencyValidator,
    IndividualAccessor, NamingValidator, OntologyCatalog, SimilarityChecker, SubclassGraphBuilder,
    SynonymLookup,
};
use crate::store::GraphStore;
use std::sync::Arc;
use tracing::info;

/// Engines sharing one store, wired from an [`EngineConfig`].
pub struct EngineState {
    config: Arc<EngineConfig>,
    store: Arc<GraphStore>,
    catalog: OntologyCatalog,
    accessor: IndividualAccessor,
    hierarchy: SubclassGraphBuilder,
    constraints: ConstraintEngine,
    naming: NamingValidator,
    validator: Option<Arc<dyn ConsistencyValidator>>,
}

impl EngineState {
    /// Opens the configured store and uses the HTTP collaborators.
    pub fn new(config: EngineConfig) -> OntologyResult<Self> {
        let store = Arc::new(GraphStore::from_config(&config)?);
        let lookup: Arc<dyn SynonymLookup> = Arc::new(DatamuseLookup::from_config(&config)?);
        let validator = HttpConsistencyValidator::from_config(&config)?
            .map(|validator| Arc::new(validator) as Arc<dyn ConsistencyValidator>);
        Self::with_collaborators(config, store, lookup, validator)
    }

    /// Wires the engines around an existing store and caller-provided
    /// collaborators.
    pub fn with_collaborators(
        config: EngineConfig,
        store: Arc<GraphStore>,
        lookup: Arc<dyn SynonymLookup>,
        validator: Option<Arc<dyn ConsistencyValidator>>,
    ) -> OntologyResult<Self> {
        let accessor =
            IndividualAccessor::with_draft_marker(store.clone(), &config.draft_marker_property)?;
        let naming = NamingValidator::new(store.clone(), config.filtered_words.clone())
            .with_similarity(SimilarityChecker::new(store.clone(), lookup));

        info!(
            base_iri = store.base_iri(),
            persistent = config.store_path.is_some(),
            validator = validator.is_some(),
            "engine state initialized"
        );

        Ok(Self {
            catalog: OntologyCatalog::new(store.clone()),
            hierarchy: SubclassGraphBuilder::new(store.clone()),
            constraints: ConstraintEngine::new(store.clone()),
            accessor,
            naming,
            validator,
            store,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> Arc<EngineConfig> {
        self.config.clone()
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn catalog(&self) -> &OntologyCatalog {
        &self.catalog
    }

    pub fn accessor(&self) -> &IndividualAccessor {
        &self.accessor
    }

    pub fn hierarchy(&self) -> &SubclassGraphBuilder {
        &self.hierarchy
    }

    pub fn constraints(&self) -> &ConstraintEngine {
        &self.constraints
    }

    pub fn naming(&self) -> &NamingValidator {
        &self.naming
    }

    pub fn validator(&self) -> Option<&dyn ConsistencyValidator> {
        self.validator.as_deref()
    }
}
