//! Schema introspection and constraint derivation over a transactional,
//! multi-graph RDF store.
//!
//! - [`store`]: session discipline (one writer, many snapshot readers)
//! - [`ontology`]: catalog, subclass graphs, restriction constraints,
//!   individuals with typed values, and naming validation
//! - [`recovery`]: circuit breaking for the external collaborators

pub mod config;
pub mod error;
pub mod logging;
pub mod ontology;
pub mod recovery;
pub mod state;
pub mod store;

pub use config::{CliArgs, EngineConfig};
pub use error::{ErrorCategory, OntologyError, OntologyResult};
pub use logging::{LoggingConfig, init_logging};
pub use state::EngineState;
pub use store::{AccessMode, GraphStore, Session};
