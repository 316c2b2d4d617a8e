use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ontoform::ontology::{ConsistencyOutcome, OntologyClass, check_consistency};
use ontoform::{CliArgs, EngineConfig, EngineState, LoggingConfig, OntologyError, init_logging};
use oxigraph::io::RdfFormat;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ontoform", version, about = "Inspect ontologies stored as named graphs")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a Turtle document as ontology NAME
    Import { name: String, file: PathBuf },
    /// List the classes of an ontology
    Classes { graph: String },
    /// Subclass graph of the whole ontology, or the ancestry of one class
    Hierarchy {
        graph: String,
        #[arg(long)]
        class: Option<String>,
    },
    /// Restriction constraints declared on a class
    Constraints {
        graph: String,
        class: String,
        #[arg(long)]
        property: Option<String>,
    },
    /// Run the naming checks on a proposed property name
    CheckName {
        graph: String,
        name: String,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Ask the configured reasoner whether the ontology is consistent
    Validate { graph: String },
    /// Write the ontology and everything it imports as one RDF document
    Export {
        graph: String,
        #[arg(long, value_enum, default_value_t = ExportFormat::RdfXml)]
        format: ExportFormat,
        /// Destination file; standard output when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormat {
    RdfXml,
    Turtle,
    NTriples,
}

impl From<ExportFormat> for RdfFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::RdfXml => RdfFormat::RdfXml,
            ExportFormat::Turtle => RdfFormat::Turtle,
            ExportFormat::NTriples => RdfFormat::NTriples,
        }
    }
}

fn main() -> Result<()> {
    let _guard = init_logging(LoggingConfig::from_env())?;

    let cli = Cli::parse();
    let config = EngineConfig::from_args(cli.args)?;
    let state = EngineState::new(config)?;

    match cli.command {
        Command::Import { name, file } => {
            let turtle = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            print_json(&state.catalog().import(&name, &turtle)?)
        }
        Command::Classes { graph } => {
            let classes = state
                .store()
                .read_with(|session| state.catalog().list_classes(session, &graph))?;
            print_json(&classes)
        }
        Command::Hierarchy { graph, class } => {
            let subclass_graph = state.store().read_with(|session| match class {
                Some(identifier) => {
                    let class = require_class(&state, session, &graph, &identifier)?;
                    state.hierarchy().build_for_class(session, &graph, &class)
                }
                None => state.hierarchy().build_for_graph(session, &graph),
            })?;
            print_json(&subclass_graph)
        }
        Command::Constraints {
            graph,
            class,
            property,
        } => {
            let constraints = state.store().read_with(|session| {
                let class = require_class(&state, session, &graph, &class)?;
                state
                    .constraints()
                    .constraints_for(session, &graph, &class, property.as_deref())
            })?;
            print_json(&constraints)
        }
        Command::CheckName {
            graph,
            name,
            domain,
        } => {
            let domain = match domain {
                Some(identifier) => Some(
                    state
                        .store()
                        .read_with(|session| require_class(&state, session, &graph, &identifier))?,
                ),
                None => None,
            };
            let report = state
                .naming()
                .validate_property_name(&graph, domain.as_ref(), &name)?;
            print_json(&report)
        }
        Command::Validate { graph } => {
            let outcome = match state.validator() {
                Some(validator) => check_consistency(state.store(), &graph, validator)?,
                None => ConsistencyOutcome::Inconclusive {
                    reason: "no validator endpoint configured".to_string(),
                },
            };
            print_json(&outcome)
        }
        Command::Export {
            graph,
            format,
            output,
        } => {
            let document = state.store().read_with(|session| {
                state
                    .catalog()
                    .export_ontology(session, &graph, format.into())
            })?;
            match output {
                Some(path) => fs::write(&path, document)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => std::io::stdout().write_all(&document)?,
            }
            Ok(())
        }
    }
}

fn require_class(
    state: &EngineState,
    session: &ontoform::Session<'_>,
    graph: &str,
    identifier: &str,
) -> Result<OntologyClass, OntologyError> {
    state
        .catalog()
        .find_class(session, graph, identifier)?
        .ok_or_else(|| OntologyError::ClassNotFound {
            graph: graph.to_string(),
            identifier: identifier.to_string(),
        })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
