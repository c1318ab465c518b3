/*!

Role assignment: every person is either a patient or staff (nurse, doctor, administration).
Roles come from a table keyed by person identifier, or are sampled i.i.d. with a fixed patient
probability when no table exists, as for the synthetic comparison graphs.

*/

use crate::{
    HashMap, PersonId,
    context::Context,
    error::ContagionError,
    graph::{ContactGraph, ContextGraphExt},
    people::ContextPeopleExt,
    property::Property,
    random::ContextRandomExt,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};

crate::define_rng!(RoleRng);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    NonPatient,
}
impl Property for Role {}

impl FromStr for Role {
    type Err = ContagionError;

    /// `PAT` or `PATIENT` in any case is a patient; any other title is staff.
    fn from_str(title: &str) -> Result<Self, Self::Err> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ContagionError::Configuration("empty role title".to_string()));
        }
        if title.eq_ignore_ascii_case("PAT") || title.eq_ignore_ascii_case("PATIENT") {
            Ok(Role::Patient)
        } else {
            Ok(Role::NonPatient)
        }
    }
}

#[derive(Deserialize, Debug)]
struct RoleRecord {
    index: String,
    title: String,
}

/// Roles keyed by person identifier, as read from a title list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleTable {
    entries: Vec<(String, Role)>,
}

impl RoleTable {
    /// Builds a table from identifier/role pairs. Identifiers must be unique.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ContagionError>
    where
        I: IntoIterator<Item = (S, Role)>,
        S: Into<String>,
    {
        let mut table = RoleTable::default();
        let mut seen: HashMap<String, usize> = HashMap::default();
        for (idx, (label, role)) in entries.into_iter().enumerate() {
            let label = label.into();
            if let Some(first) = seen.insert(label.clone(), idx) {
                return Err(ContagionError::DataAlignment(format!(
                    "role table lists {label:?} twice (rows {} and {})",
                    first + 1,
                    idx + 1
                )));
            }
            table.entries.push((label, role));
        }
        Ok(table)
    }

    /// Reads a delimited file with a header row containing `index` and `title` columns.
    pub fn from_csv(file_path: &Path, delimiter: u8) -> Result<Self, ContagionError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_path(file_path)?;

        let mut entries = Vec::new();
        for record in reader.deserialize() {
            let record: RoleRecord = record?;
            let role = record.title.parse::<Role>().map_err(|_| {
                ContagionError::Configuration(format!("person {:?} has an empty title", record.index))
            })?;
            entries.push((record.index, role));
        }
        debug!("read {} roles from {}", entries.len(), file_path.display());
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

    /// Aligns the table with the graph by identifier, never by row position. Fails if the
    /// table names someone outside the graph or leaves a graph node without a role.
    pub fn align(&self, graph: &ContactGraph) -> Result<Vec<Role>, ContagionError> {
        let mut roles: Vec<Option<Role>> = vec![None; graph.len()];
        for (label, role) in &self.entries {
            let person_id = graph.person(label).ok_or_else(|| {
                ContagionError::DataAlignment(format!(
                    "role table references {label:?}, which is not in the contact graph"
                ))
            })?;
            roles[person_id.0] = Some(*role);
        }

        roles
            .into_iter()
            .enumerate()
            .map(|(idx, role)| {
                role.ok_or_else(|| {
                    ContagionError::Configuration(format!(
                        "role table has no entry for {:?}",
                        graph.label(PersonId(idx))
                    ))
                })
            })
            .collect()
    }
}

/// Where roles come from.
#[derive(Clone, Debug, PartialEq)]
pub enum RoleSource {
    Table(RoleTable),
    /// Each person is a patient with probability `p_patient`, independently.
    Sampled { p_patient: f64 },
}

pub trait ContextRoleExt {
    /// Gives every person in the loaded graph exactly one role. Sampling draws from the
    /// `RoleRng` stream, so calling this again yields a fresh assignment.
    fn assign_roles(&mut self, source: &RoleSource) -> Result<(), ContagionError>;

    /// Everyone's role indexed by `PersonId`; fails if anyone has none yet.
    fn roles(&self) -> Result<Vec<Role>, ContagionError>;

    /// The realized share of patients.
    fn patient_proportion(&self) -> f64;
}

impl ContextRoleExt for Context {
    fn assign_roles(&mut self, source: &RoleSource) -> Result<(), ContagionError> {
        let graph = self.contact_graph()?;
        let roles = match source {
            RoleSource::Table(table) => table.align(&graph)?,
            RoleSource::Sampled { p_patient } => {
                if !(0.0..=1.0).contains(p_patient) {
                    return Err(ContagionError::Configuration(format!(
                        "patient proportion must be in [0, 1], got {p_patient}"
                    )));
                }
                graph
                    .people()
                    .map(|_| {
                        if self.sample_bool::<RoleRng>(*p_patient) {
                            Role::Patient
                        } else {
                            Role::NonPatient
                        }
                    })
                    .collect()
            }
        };

        for (idx, role) in roles.into_iter().enumerate() {
            self.set_person_property(PersonId(idx), role);
        }
        trace!("assigned roles: {} patients", self.query_people_count(Role::Patient));
        Ok(())
    }

    fn roles(&self) -> Result<Vec<Role>, ContagionError> {
        self.people()
            .map(|person_id| {
                self.get_person_property::<Role>(person_id).ok_or_else(|| {
                    ContagionError::Configuration(format!("person {person_id} has no role"))
                })
            })
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn patient_proportion(&self) -> f64 {
        let population = self.get_current_population();
        if population == 0 {
            return 0.0;
        }
        self.query_people_count(Role::Patient) as f64 / population as f64
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ward_context() -> Context {
        let mut context = Context::new();
        context.init_random(123);
        let graph = ContactGraph::from_edges([("1157", "1232"), ("1232", "1191"), ("1191", "1098")]);
        context.load_contact_graph(graph).unwrap();
        context
    }

    #[test]
    fn parse_titles() {
        assert_eq!("PAT".parse::<Role>().unwrap(), Role::Patient);
        assert_eq!(" patient ".parse::<Role>().unwrap(), Role::Patient);
        assert_eq!("NUR".parse::<Role>().unwrap(), Role::NonPatient);
        assert_eq!("MED".parse::<Role>().unwrap(), Role::NonPatient);
        assert_eq!("ADM".parse::<Role>().unwrap(), Role::NonPatient);
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn read_title_list() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "index;title\n1157;PAT\n1232;NUR\n1191;MED\n1098;ADM\n").unwrap();
        let table = RoleTable::from_csv(file.path(), b';').unwrap();
        assert_eq!(table.len(), 4);

        let mut context = ward_context();
        context.assign_roles(&RoleSource::Table(table)).unwrap();
        assert_eq!(
            context.roles().unwrap(),
            vec![Role::Patient, Role::NonPatient, Role::NonPatient, Role::NonPatient]
        );
        assert!((context.patient_proportion() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn table_is_aligned_by_identifier_not_row() {
        let table = RoleTable::from_entries([
            ("1098", Role::Patient),
            ("1191", Role::NonPatient),
            ("1232", Role::NonPatient),
            ("1157", Role::NonPatient),
        ])
        .unwrap();
        let mut context = ward_context();
        context.assign_roles(&RoleSource::Table(table)).unwrap();

        let graph = context.contact_graph().unwrap();
        let patient = graph.person("1098").unwrap();
        assert_eq!(context.get_person_property::<Role>(patient), Some(Role::Patient));
        assert_eq!(context.query_people(Role::Patient), vec![patient]);
    }

    #[test]
    fn incomplete_table_is_a_configuration_error() {
        let table = RoleTable::from_entries([("1157", Role::Patient)]).unwrap();
        let mut context = ward_context();
        let err = context.assign_roles(&RoleSource::Table(table)).unwrap_err();
        assert!(matches!(err, ContagionError::Configuration(msg) if msg.contains("1232")));
    }

    #[test]
    fn foreign_identifier_is_an_alignment_error() {
        let table = RoleTable::from_entries([
            ("1157", Role::Patient),
            ("1232", Role::NonPatient),
            ("1191", Role::NonPatient),
            ("1098", Role::NonPatient),
            ("9999", Role::NonPatient),
        ])
        .unwrap();
        let mut context = ward_context();
        let err = context.assign_roles(&RoleSource::Table(table)).unwrap_err();
        assert!(matches!(err, ContagionError::DataAlignment(msg) if msg.contains("9999")));
    }

    #[test]
    fn duplicate_identifier_is_an_alignment_error() {
        let err = RoleTable::from_entries([("1157", Role::Patient), ("1157", Role::NonPatient)])
            .unwrap_err();
        assert!(matches!(err, ContagionError::DataAlignment(_)));
    }

    #[test]
    fn sampled_roles_cover_everyone() {
        let mut context = ward_context();
        context
            .assign_roles(&RoleSource::Sampled { p_patient: 0.387 })
            .unwrap();
        assert_eq!(context.roles().unwrap().len(), 4);

        context
            .assign_roles(&RoleSource::Sampled { p_patient: 1.0 })
            .unwrap();
        assert_eq!(context.query_people_count(Role::Patient), 4);

        context
            .assign_roles(&RoleSource::Sampled { p_patient: 0.0 })
            .unwrap();
        assert_eq!(context.query_people_count(Role::NonPatient), 4);
        assert!(context.patient_proportion().abs() < f64::EPSILON);
    }

    #[test]
    fn sampled_proportion_is_close_to_target() {
        let mut context = Context::new();
        context.init_random(42);
        let edges: Vec<(String, String)> =
            (0..2000).map(|i| (i.to_string(), ((i + 1) % 2000).to_string())).collect();
        context.load_contact_graph(ContactGraph::from_edges(edges)).unwrap();
        context
            .assign_roles(&RoleSource::Sampled { p_patient: 0.387 })
            .unwrap();
        assert!((context.patient_proportion() - 0.387).abs() < 0.04);
    }

    #[test]
    fn roles_are_required_before_reading() {
        let context = ward_context();
        assert!(context.roles().is_err());
    }
}
