use crate::ontology::accessor::DEFAULT_DRAFT_MARKER;
use anyhow::{Context, Result};
use clap::Args;
use oxigraph::model::NamedNode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASE_IRI: &str = "http://ontoform.local/ontologies";
const DEFAULT_SYNONYM_ENDPOINT: &str = "https://api.datamuse.com/words";
const DEFAULT_SYNONYM_TIMEOUT_SECS: u64 = 5;
const DEFAULT_VALIDATOR_TIMEOUT_SECS: u64 = 120;
const DEFAULT_FILTERED_WORDS: &[&str] = &["And", "Or", "Other", "Miscellaneous"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Directory of the persistent store; in-memory when absent.
    pub store_path: Option<PathBuf>,
    pub base_iri: String,
    pub synonym_endpoint: String,
    pub synonym_timeout_secs: u64,
    pub validator_endpoint: Option<String>,
    pub validator_timeout_secs: u64,
    pub filtered_words: Vec<String>,
    pub draft_marker_property: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            base_iri: DEFAULT_BASE_IRI.to_string(),
            synonym_endpoint: DEFAULT_SYNONYM_ENDPOINT.to_string(),
            synonym_timeout_secs: DEFAULT_SYNONYM_TIMEOUT_SECS,
            validator_endpoint: None,
            validator_timeout_secs: DEFAULT_VALIDATOR_TIMEOUT_SECS,
            filtered_words: default_filtered_words(),
            draft_marker_property: DEFAULT_DRAFT_MARKER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Resolves CLI arguments over an optional config file over defaults.
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            store_path: cli_store_path,
            base_iri: cli_base_iri,
            synonym_endpoint: cli_synonym_endpoint,
            synonym_timeout_secs: cli_synonym_timeout,
            validator_endpoint: cli_validator_endpoint,
            validator_timeout_secs: cli_validator_timeout,
            filtered_words: cli_filtered_words,
            draft_marker_property: cli_draft_marker,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            store_path: file_store_path,
            base_iri: file_base_iri,
            synonym_endpoint: file_synonym_endpoint,
            synonym_timeout_secs: file_synonym_timeout,
            validator_endpoint: file_validator_endpoint,
            validator_timeout_secs: file_validator_timeout,
            filtered_words: file_filtered_words,
            draft_marker_property: file_draft_marker,
        } = file_config;

        let filtered_words = cli_filtered_words
            .or(file_filtered_words)
            .unwrap_or_else(default_filtered_words)
            .into_iter()
            .map(|word| word.trim().to_string())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>();

        let config = Self {
            store_path: cli_store_path.or(file_store_path),
            base_iri: cli_base_iri
                .or(file_base_iri)
                .unwrap_or_else(|| DEFAULT_BASE_IRI.to_string()),
            synonym_endpoint: cli_synonym_endpoint
                .or(file_synonym_endpoint)
                .unwrap_or_else(|| DEFAULT_SYNONYM_ENDPOINT.to_string()),
            synonym_timeout_secs: cli_synonym_timeout
                .or(file_synonym_timeout)
                .unwrap_or(DEFAULT_SYNONYM_TIMEOUT_SECS),
            validator_endpoint: cli_validator_endpoint.or(file_validator_endpoint),
            validator_timeout_secs: cli_validator_timeout
                .or(file_validator_timeout)
                .unwrap_or(DEFAULT_VALIDATOR_TIMEOUT_SECS),
            filtered_words,
            draft_marker_property: cli_draft_marker
                .or(file_draft_marker)
                .unwrap_or_else(|| DEFAULT_DRAFT_MARKER.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        NamedNode::new(self.base_iri.as_str())
            .with_context(|| format!("base IRI {:?} is not a valid IRI", self.base_iri))?;
        NamedNode::new(self.draft_marker_property.as_str()).with_context(|| {
            format!(
                "draft marker {:?} is not a valid IRI",
                self.draft_marker_property
            )
        })?;
        reqwest::Url::parse(&self.synonym_endpoint)
            .with_context(|| format!("invalid synonym endpoint {:?}", self.synonym_endpoint))?;
        if let Some(endpoint) = self.validator_endpoint.as_ref() {
            reqwest::Url::parse(endpoint)
                .with_context(|| format!("invalid validator endpoint {endpoint:?}"))?;
        }
        anyhow::ensure!(
            self.synonym_timeout_secs > 0,
            "synonym timeout must be greater than zero"
        );
        anyhow::ensure!(
            self.validator_timeout_secs > 0,
            "validator timeout must be greater than zero"
        );
        anyhow::ensure!(
            !self.filtered_words.is_empty(),
            "at least one filtered word must be provided"
        );
        Ok(())
    }

    pub fn synonym_timeout(&self) -> Duration {
        Duration::from_secs(self.synonym_timeout_secs)
    }

    pub fn validator_timeout(&self) -> Duration {
        Duration::from_secs(self.validator_timeout_secs)
    }
}

fn default_filtered_words() -> Vec<String> {
    DEFAULT_FILTERED_WORDS
        .iter()
        .map(|word| (*word).to_string())
        .collect()
}

#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "ONTOFORM_STORE",
        value_name = "DIR",
        help = "Directory of the persistent graph store (in-memory when omitted)",
        global = true
    )]
    pub store_path: Option<PathBuf>,

    #[arg(
        long,
        env = "ONTOFORM_BASE_IRI",
        value_name = "IRI",
        help = "Namespace for graph names and newly created entities",
        global = true
    )]
    pub base_iri: Option<String>,

    #[arg(
        long,
        env = "ONTOFORM_SYNONYM_ENDPOINT",
        value_name = "URL",
        help = "Synonym lookup service",
        global = true
    )]
    pub synonym_endpoint: Option<String>,

    #[arg(
        long,
        env = "ONTOFORM_SYNONYM_TIMEOUT",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64),
        global = true
    )]
    pub synonym_timeout_secs: Option<u64>,

    #[arg(
        long,
        env = "ONTOFORM_VALIDATOR_ENDPOINT",
        value_name = "URL",
        help = "Consistency validator receiving N-Triples snapshots",
        global = true
    )]
    pub validator_endpoint: Option<String>,

    #[arg(
        long,
        env = "ONTOFORM_VALIDATOR_TIMEOUT",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64),
        global = true
    )]
    pub validator_timeout_secs: Option<u64>,

    #[arg(
        long,
        env = "ONTOFORM_FILTERED_WORDS",
        value_name = "WORD",
        value_delimiter = ',',
        help = "Comma-separated words a new property name must not contain",
        global = true
    )]
    pub filtered_words: Option<Vec<String>>,

    #[arg(
        long,
        env = "ONTOFORM_DRAFT_MARKER",
        value_name = "IRI",
        help = "Property holding the provisional name of draft individuals",
        global = true
    )]
    pub draft_marker_property: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    store_path: Option<PathBuf>,
    base_iri: Option<String>,
    synonym_endpoint: Option<String>,
    synonym_timeout_secs: Option<u64>,
    validator_endpoint: Option<String>,
    validator_timeout_secs: Option<u64>,
    filtered_words: Option<Vec<String>>,
    draft_marker_property: Option<String>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
