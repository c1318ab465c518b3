/*!

File-driven runs. A scenario is a JSON document naming the contact graph (an edge list or one of
the synthetic generators), the optional role and centrality tables, an optional fixed immune
list, the run parameters and an optional output directory:

```json
{
  "parameters": { "seed": 7, "days": 30, "immunization_fraction": 0.1 },
  "graph": { "kind": "edge_list", "path": "ward.edges" },
  "roles": { "path": "titles.csv", "delimiter": ";" },
  "centrality": "centrality.csv",
  "output_dir": "out"
}
```

Relative paths are resolved against the directory containing the scenario file.

*/

use crate::{
    context::Context,
    error::ContagionError,
    generators::{erdos_renyi, watts_strogatz},
    graph::{ContactGraph, ContextGraphExt},
    immunization::{CentralityTable, ImmunizationPolicy},
    parameters::{ContextParametersExt, Parameters},
    random::ContextRandomExt,
    report,
    roles::{RoleSource, RoleTable},
    simulation::{self, RunOutcome},
};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

crate::define_rng!(GeneratorRng);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphSource {
    EdgeList { path: PathBuf },
    ErdosRenyi { nodes: usize, edges: usize },
    WattsStrogatz { nodes: usize, k: usize, rewire: f64 },
}

fn default_delimiter() -> char {
    ';'
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RoleInput {
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl RoleInput {
    fn delimiter_byte(&self) -> Result<u8, ContagionError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ContagionError::Configuration(format!(
                    "role table delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub parameters: Parameters,
    pub graph: GraphSource,
    /// Title table; without one, roles are sampled with `patient_proportion`.
    pub roles: Option<RoleInput>,
    /// Centrality table used when `immunization_fraction` is positive.
    pub centrality: Option<PathBuf>,
    /// A fixed immune list, used instead of the centrality ranking.
    pub immune: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
}

impl Scenario {
    /// Reads a scenario from a JSON file.
    pub fn load(file_path: &Path) -> Result<Self, ContagionError> {
        let reader = BufReader::new(File::open(file_path)?);
        let mut scenario: Scenario = serde_json::from_reader(reader)?;
        if let Some(base) = file_path.parent() {
            scenario.resolve_paths(base);
        }
        Ok(scenario)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let GraphSource::EdgeList { path } = &mut self.graph {
            resolve(path);
        }
        if let Some(roles) = &mut self.roles {
            resolve(&mut roles.path);
        }
        if let Some(path) = &mut self.centrality {
            resolve(path);
        }
        if let Some(path) = &mut self.output_dir {
            resolve(path);
        }
    }

    fn build_graph(&self, context: &mut Context) -> Result<ContactGraph, ContagionError> {
        match &self.graph {
            GraphSource::EdgeList { path } => ContactGraph::from_edge_list(path),
            GraphSource::ErdosRenyi { nodes, edges } => {
                Ok(context.sample::<GeneratorRng, _>(|rng| erdos_renyi(*nodes, *edges, rng)))
            }
            GraphSource::WattsStrogatz { nodes, k, rewire } => {
                context.sample::<GeneratorRng, _>(|rng| watts_strogatz(*nodes, *k, *rewire, rng))
            }
        }
    }

    fn role_source(&self) -> Result<RoleSource, ContagionError> {
        match &self.roles {
            Some(input) => Ok(RoleSource::Table(RoleTable::from_csv(
                &input.path,
                input.delimiter_byte()?,
            )?)),
            None => Ok(RoleSource::Sampled {
                p_patient: self.parameters.patient_proportion,
            }),
        }
    }

    fn immunization_policy(&self) -> Result<ImmunizationPolicy, ContagionError> {
        match (&self.immune, &self.centrality) {
            (Some(_), Some(_)) => Err(ContagionError::Configuration(
                "give either an immune list or a centrality table, not both".to_string(),
            )),
            (Some(labels), None) => Ok(ImmunizationPolicy::Listed(labels.clone())),
            (None, Some(path)) => Ok(ImmunizationPolicy::Centrality(Box::new(
                CentralityTable::from_csv(path)?,
            ))),
            (None, None) if self.parameters.immunization_fraction > 0.0 => {
                Err(ContagionError::Configuration(
                    "immunization_fraction is positive but no centrality table was given"
                        .to_string(),
                ))
            }
            (None, None) => Ok(ImmunizationPolicy::Disabled),
        }
    }

    /// Builds a fresh context from the scenario, runs it and writes the reports if an output
    /// directory is set.
    pub fn run(&self) -> Result<RunOutcome, ContagionError> {
        let mut context = Context::new();
        context.set_parameters(self.parameters)?;
        context.init_random(self.parameters.seed);

        let graph = self.build_graph(&mut context)?;
        context.load_contact_graph(graph)?;
        let roles = self.role_source()?;
        let policy = self.immunization_policy()?;

        let outcome = simulation::run(&mut context, &roles, &policy)?;
        if let Some(output_dir) = &self.output_dir {
            write_reports(output_dir, &context, &outcome)?;
        }
        Ok(outcome)
    }
}

fn write_reports(
    output_dir: &Path,
    context: &Context,
    outcome: &RunOutcome,
) -> Result<(), ContagionError> {
    fs::create_dir_all(output_dir)?;
    let graph = context.contact_graph()?;
    report::write_proportions(&output_dir.join("proportions.csv"), &outcome.proportions)?;
    report::write_immunized(&output_dir.join("immunized.csv"), &outcome.immunized)?;
    report::write_snapshots(
        &output_dir.join("snapshots.csv"),
        &graph,
        &outcome.history,
    )?;
    info!("reports written to {}", output_dir.display());
    Ok(())
}
