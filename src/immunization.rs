/*!

Targeted immunization. Centrality scores (betweenness, degree, closeness, eigenvector) come
from an external graph-analysis tool; this module averages them per person, ranks everyone by
that average and marks the top fraction as permanently [`Immune`]. The ranking is computed once,
before day 0, and is fully deterministic: ties are broken by person identifier.

*/

use crate::{
    HashSet, PersonId,
    context::Context,
    error::ContagionError,
    graph::{ContactGraph, ContextGraphExt},
    parameters::ContextParametersExt,
    people::ContextPeopleExt,
    property::Property,
};
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, path::Path};

/// Whether a person can never be infected.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Immune(pub bool);
impl Property for Immune {}

/// The four centrality measures of one person.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CentralityScores {
    pub betweenness: f64,
    pub degree: f64,
    pub closeness: f64,
    pub eigenvector: f64,
}

impl CentralityScores {
    /// Arithmetic mean of the four measures.
    #[must_use]
    pub fn average(&self) -> f64 {
        (self.betweenness + self.degree + self.closeness + self.eigenvector) / 4.0
    }

    fn is_finite(&self) -> bool {
        [self.betweenness, self.degree, self.closeness, self.eigenvector]
            .iter()
            .all(|score| score.is_finite())
    }
}

/// Anything that can produce one averaged centrality score per person of a graph.
pub trait CentralityProvider {
    /// Scores indexed by `PersonId`, one per node of `graph`.
    fn average_centrality(&self, graph: &ContactGraph) -> Result<Vec<f64>, ContagionError>;
}

#[derive(Deserialize, Debug)]
struct CentralityRecord {
    id: String,
    betweenness: f64,
    degree: f64,
    closeness: f64,
    eigenvector: f64,
}

/// Precomputed centrality scores keyed by person identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CentralityTable {
    entries: Vec<(String, CentralityScores)>,
}

impl CentralityTable {
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ContagionError>
    where
        I: IntoIterator<Item = (S, CentralityScores)>,
        S: Into<String>,
    {
        let mut seen = HashSet::default();
        let mut table = CentralityTable::default();
        for (label, scores) in entries {
            let label = label.into();
            if !scores.is_finite() {
                return Err(ContagionError::Configuration(format!(
                    "centrality scores for {label:?} must be finite, got {scores:?}"
                )));
            }
            if !seen.insert(label.clone()) {
                return Err(ContagionError::DataAlignment(format!(
                    "centrality table lists {label:?} twice"
                )));
            }
            table.entries.push((label, scores));
        }
        Ok(table)
    }

    /// Reads a CSV file with the header `id,betweenness,degree,closeness,eigenvector`.
    pub fn from_csv(file_path: &Path) -> Result<Self, ContagionError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(file_path)?;
        let mut entries = Vec::new();
        for record in reader.deserialize() {
            let record: CentralityRecord = record?;
            let scores = CentralityScores {
                betweenness: record.betweenness,
                degree: record.degree,
                closeness: record.closeness,
                eigenvector: record.eigenvector,
            };
            entries.push((record.id, scores));
        }
        debug!(
            "read centrality scores for {} people from {}",
            entries.len(),
            file_path.display()
        );
        Self::from_entries(entries)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CentralityProvider for CentralityTable {
    fn average_centrality(&self, graph: &ContactGraph) -> Result<Vec<f64>, ContagionError> {
        let mut averages: Vec<Option<f64>> = vec![None; graph.len()];
        for (label, scores) in &self.entries {
            let person_id = graph.person(label).ok_or_else(|| {
                ContagionError::DataAlignment(format!(
                    "centrality table references {label:?}, which is not in the contact graph"
                ))
            })?;
            averages[person_id.0] = Some(scores.average());
        }
        averages
            .into_iter()
            .enumerate()
            .map(|(idx, average)| {
                average.ok_or_else(|| {
                    ContagionError::DataAlignment(format!(
                        "centrality table has no entry for {:?}",
                        graph.label(PersonId(idx))
                    ))
                })
            })
            .collect()
    }
}

/// Everyone in `graph`, highest score first. Equal scores are ordered by identifier.
pub fn rank_by_centrality(
    graph: &ContactGraph,
    scores: &[f64],
) -> Result<Vec<PersonId>, ContagionError> {
    if scores.len() != graph.len() {
        return Err(ContagionError::DataAlignment(format!(
            "{} centrality scores for {} people",
            scores.len(),
            graph.len()
        )));
    }
    let mut ranking: Vec<PersonId> = graph.people().collect();
    ranking.sort_by(|a, b| match scores[b.0].total_cmp(&scores[a.0]) {
        Ordering::Equal => graph.label(*a).cmp(graph.label(*b)),
        ordering => ordering,
    });
    Ok(ranking)
}

/// The first floor(`fraction` × population) people of a ranking.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn select_top(ranking: &[PersonId], fraction: f64) -> &[PersonId] {
    let count = (fraction * ranking.len() as f64).floor() as usize;
    &ranking[..count.min(ranking.len())]
}

/// How the immune set is chosen.
pub enum ImmunizationPolicy {
    /// Nobody is immune.
    Disabled,
    /// The top `immunization_fraction` of people by averaged centrality.
    Centrality(Box<dyn CentralityProvider>),
    /// An explicit list of person identifiers.
    Listed(Vec<String>),
}

pub trait ContextImmunizationExt {
    /// Marks the chosen people as immune and returns their identifiers, highest rank first.
    /// Runs once, before seeding; calling it again replaces the previous immune set.
    fn immunize(&mut self, policy: &ImmunizationPolicy) -> Result<Vec<String>, ContagionError>;

    fn is_immune(&self, person_id: PersonId) -> bool;

    /// Everyone's immunity indexed by `PersonId`.
    fn immunity(&self) -> Vec<bool>;
}

impl ContextImmunizationExt for Context {
    fn immunize(&mut self, policy: &ImmunizationPolicy) -> Result<Vec<String>, ContagionError> {
        let graph = self.contact_graph()?;
        let chosen: Vec<PersonId> = match policy {
            ImmunizationPolicy::Disabled => Vec::new(),
            ImmunizationPolicy::Centrality(provider) => {
                let fraction = self.parameters()?.immunization_fraction;
                let scores = provider.average_centrality(&graph)?;
                let ranking = rank_by_centrality(&graph, &scores)?;
                select_top(&ranking, fraction).to_vec()
            }
            ImmunizationPolicy::Listed(labels) => {
                graph.resolve(labels.iter().map(String::as_str), "immune list")?
            }
        };

        for person_id in graph.people() {
            self.set_person_property(person_id, Immune(false));
        }
        for person_id in &chosen {
            trace!("{} is immune", graph.label(*person_id));
            self.set_person_property(*person_id, Immune(true));
        }

        let labels: Vec<String> = chosen
            .iter()
            .map(|person_id| graph.label(*person_id).to_string())
            .collect();
        info!("immunized {} of {} people", labels.len(), graph.len());
        Ok(labels)
    }

    fn is_immune(&self, person_id: PersonId) -> bool {
        self.get_person_property::<Immune>(person_id) == Some(Immune(true))
    }

    fn immunity(&self) -> Vec<bool> {
        self.people()
            .map(|person_id| self.is_immune(person_id))
            .collect()
    }
}
