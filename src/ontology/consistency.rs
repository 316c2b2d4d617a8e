//! Logical consistency checks delegated to an external reasoner.
//!
//! The ontology and its imports are serialized to N-Triples under a read
//! session; the session is released before the snapshot is sent, so a slow
//! reasoner never holds up writers.

use super::view::GraphView;
use crate::config::EngineConfig;
use crate::error::{OntologyError, OntologyResult};
use crate::logging::graph_span;
use crate::recovery::{CircuitBreaker, CircuitBreakerConfig};
use crate::store::GraphStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

const SERVICE: &str = "consistency";

/// Verdict returned by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub consistent: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

pub trait ConsistencyValidator: Send + Sync {
    fn validate(&self, ntriples: &str) -> OntologyResult<ConsistencyReport>;
}

/// Posts the snapshot as `application/n-triples` and expects a JSON
/// [`ConsistencyReport`] back.
#[derive(Debug, Clone)]
pub struct HttpConsistencyValidator {
    client: reqwest::blocking::Client,
    endpoint: String,
    breaker: CircuitBreaker,
}

impl HttpConsistencyValidator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> OntologyResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| OntologyError::external(SERVICE, err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            breaker: CircuitBreaker::new(SERVICE, CircuitBreakerConfig::consistency_validator()),
        })
    }

    /// `None` when no validator endpoint is configured.
    pub fn from_config(config: &EngineConfig) -> OntologyResult<Option<Self>> {
        config
            .validator_endpoint
            .as_ref()
            .map(|endpoint| Self::new(endpoint.clone(), config.validator_timeout()))
            .transpose()
    }

    fn post(&self, ntriples: &str) -> OntologyResult<ConsistencyReport> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/n-triples")
            .body(ntriples.to_string())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| OntologyError::external(SERVICE, err.to_string()))?;
        response
            .json::<ConsistencyReport>()
            .map_err(|err| OntologyError::external(SERVICE, format!("malformed response: {err}")))
    }
}

impl ConsistencyValidator for HttpConsistencyValidator {
    fn validate(&self, ntriples: &str) -> OntologyResult<ConsistencyReport> {
        self.breaker.execute(|| self.post(ntriples))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConsistencyOutcome {
    Consistent,
    Inconsistent { explanation: Option<String> },
    /// The validator could not be reached or answered garbage.
    Inconclusive { reason: String },
}

/// Checks `graph` together with everything it imports. Store errors (such as
/// an unknown graph) propagate; validator failures do not.
pub fn check_consistency(
    store: &GraphStore,
    graph: &str,
    validator: &dyn ConsistencyValidator,
) -> OntologyResult<ConsistencyOutcome> {
    let _span = graph_span("check_consistency", graph).entered();
    let snapshot = store.read_with(|session| {
        let view = GraphView::open(session, graph)?;
        let mut ntriples = String::new();
        for member in view.graphs() {
            ntriples.push_str(&session.serialize_graph(member.as_ref())?);
        }
        Ok::<_, OntologyError>(ntriples)
    })?;

    let outcome = match validator.validate(&snapshot) {
        Ok(ConsistencyReport {
            consistent: true, ..
        }) => ConsistencyOutcome::Consistent,
        Ok(ConsistencyReport { explanation, .. }) => {
            ConsistencyOutcome::Inconsistent { explanation }
        }
        Err(err) => {
            warn!(graph, error = %err, "consistency validator unavailable");
            ConsistencyOutcome::Inconclusive {
                reason: err.to_string(),
            }
        }
    };
    info!(graph, outcome = ?outcome, "consistency checked");
    Ok(outcome)
}
