//! Near-duplicate detection for proposed property names.
//!
//! Synonyms come from an external thesaurus that is allowed to be down; a
//! failed lookup turns into [`SimilarityOutcome::Inconclusive`] instead of an
//! error so the remaining name checks still report.

use super::catalog::OntologyCatalog;
use super::model::{OntologyClass, OntologyProperty};
use crate::config::EngineConfig;
use crate::error::{OntologyError, OntologyResult};
use crate::recovery::{CircuitBreaker, CircuitBreakerConfig};
use crate::store::GraphStore;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE: &str = "synonyms";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    pub word: String,
    #[serde(default)]
    pub score: u64,
}

/// Source of words related to a candidate name, best match first.
pub trait SynonymLookup: Send + Sync {
    fn synonyms(&self, word: &str) -> OntologyResult<Vec<Synonym>>;
}

/// Datamuse-compatible HTTP lookup (`GET {endpoint}?rel_trg={word}`).
#[derive(Debug, Clone)]
pub struct DatamuseLookup {
    client: reqwest::blocking::Client,
    endpoint: String,
    breaker: CircuitBreaker,
}

impl DatamuseLookup {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> OntologyResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| OntologyError::external(SERVICE, err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            breaker: CircuitBreaker::new(SERVICE, CircuitBreakerConfig::synonym_lookup()),
        })
    }

    pub fn from_config(config: &EngineConfig) -> OntologyResult<Self> {
        Self::new(config.synonym_endpoint.clone(), config.synonym_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn fetch(&self, word: &str) -> OntologyResult<Vec<Synonym>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("rel_trg", word)])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| OntologyError::external(SERVICE, err.to_string()))?;
        response
            .json::<Vec<Synonym>>()
            .map_err(|err| OntologyError::external(SERVICE, format!("malformed response: {err}")))
    }
}

impl SynonymLookup for DatamuseLookup {
    fn synonyms(&self, word: &str) -> OntologyResult<Vec<Synonym>> {
        self.breaker.execute(|| self.fetch(word))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimilarityOutcome {
    /// Lookup succeeded. `candidates` may be empty.
    Checked {
        synonyms: Vec<String>,
        candidates: Vec<OntologyProperty>,
    },
    Inconclusive { reason: String },
}

impl SimilarityOutcome {
    pub fn candidates(&self) -> &[OntologyProperty] {
        match self {
            SimilarityOutcome::Checked { candidates, .. } => candidates,
            SimilarityOutcome::Inconclusive { .. } => &[],
        }
    }

    pub fn is_conclusive(&self) -> bool {
        matches!(self, SimilarityOutcome::Checked { .. })
    }
}

#[derive(Clone)]
pub struct SimilarityChecker {
    catalog: OntologyCatalog,
    lookup: Arc<dyn SynonymLookup>,
}

impl std::fmt::Debug for SimilarityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityChecker").finish_non_exhaustive()
    }
}

impl SimilarityChecker {
    pub fn new(store: Arc<GraphStore>, lookup: Arc<dyn SynonymLookup>) -> Self {
        Self {
            catalog: OntologyCatalog::new(store),
            lookup,
        }
    }

    /// Existing properties whose name, label or comment contains a synonym of
    /// `name`, scoped to `domain` when given. The lookup runs before any
    /// session is opened; store errors still propagate.
    pub fn find_similar_properties(
        &self,
        graph: &str,
        domain: Option<&OntologyClass>,
        name: &str,
    ) -> OntologyResult<SimilarityOutcome> {
        let synonyms = match self.lookup.synonyms(name) {
            Ok(synonyms) => synonyms,
            Err(err) => {
                warn!(graph, name, error = %err, "synonym lookup failed, similarity check skipped");
                return Ok(SimilarityOutcome::Inconclusive {
                    reason: err.to_string(),
                });
            }
        };

        let mut candidates: IndexMap<String, OntologyProperty> = IndexMap::new();
        self.catalog.store().read_with(|session| {
            for synonym in &synonyms {
                let word = synonym.word.trim();
                if word.is_empty() {
                    continue;
                }
                for property in self.catalog.search_properties(session, graph, domain, word)? {
                    candidates.entry(property.uri.clone()).or_insert(property);
                }
            }
            Ok::<_, OntologyError>(())
        })?;

        debug!(
            graph,
            name,
            synonyms = synonyms.len(),
            candidates = candidates.len(),
            "similarity check finished"
        );
        Ok(SimilarityOutcome::Checked {
            synonyms: synonyms.into_iter().map(|synonym| synonym.word).collect(),
            candidates: candidates.into_values().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Fixed(Vec<&'static str>);

    impl SynonymLookup for Fixed {
        fn synonyms(&self, _word: &str) -> OntologyResult<Vec<Synonym>> {
            Ok(self
                .0
                .iter()
                .map(|word| Synonym {
                    word: word.to_string(),
                    score: 100,
                })
                .collect())
        }
    }

    struct Offline;

    impl SynonymLookup for Offline {
        fn synonyms(&self, _word: &str) -> OntologyResult<Vec<Synonym>> {
            Err(OntologyError::external(SERVICE, "connection refused"))
        }
    }

    const MENU: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<#Dish> a owl:Class .
<#hasCost> a owl:DatatypeProperty ; rdfs:domain <#Dish> ; rdfs:range xsd:double ;
    rdfs:comment "Menu price of the dish" .
<#hasPriceTag> a owl:DatatypeProperty ; rdfs:domain <#Dish> ; rdfs:range xsd:string .
<#calories> a owl:DatatypeProperty ; rdfs:domain <#Dish> ; rdfs:range xsd:int .
"#;

    fn store() -> Arc<GraphStore> {
        let store = Arc::new(GraphStore::in_memory("http://test.local/onto").unwrap());
        OntologyCatalog::new(store.clone()).import("menu", MENU).unwrap();
        store
    }

    #[test]
    fn matches_names_and_comments_once_each() {
        let store = store();
        let checker = SimilarityChecker::new(store, Arc::new(Fixed(vec!["price", "Price", "fee"])));
        let outcome = checker.find_similar_properties("menu", None, "cost").unwrap();
        let names: Vec<_> = outcome.candidates().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["hasCost", "hasPriceTag"]);
        assert!(outcome.is_conclusive());
    }

    #[test]
    fn failed_lookup_is_inconclusive() {
        let checker = SimilarityChecker::new(store(), Arc::new(Offline));
        let outcome = checker.find_similar_properties("menu", None, "cost").unwrap();
        assert_matches!(outcome, SimilarityOutcome::Inconclusive { reason } if reason.contains("connection refused"));
    }

    #[test]
    fn datamuse_payload_deserializes() {
        let payload = r#"[{"word":"price","score":1234},{"word":"fee"}]"#;
        let parsed: Vec<Synonym> = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed[0].score, 1234);
        assert_eq!(parsed[1].score, 0);
    }
}
