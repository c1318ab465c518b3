/*!

The epidemic state store: each person's current [`InfectionStatus`], and the append-only history
of end-of-day snapshots used for the proportion time series and point-in-time queries.

*/

use crate::{
    PersonId,
    context::Context,
    error::ContagionError,
    people::ContextPeopleExt,
    property::Property,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfectionStatus {
    Susceptible,
    Infected,
}
impl Property for InfectionStatus {}

impl InfectionStatus {
    #[must_use]
    pub fn is_infected(self) -> bool {
        self == InfectionStatus::Infected
    }
}

/// Everyone's status at the end of one day. Never modified after it is recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct DaySnapshot {
    day: usize,
    statuses: Vec<InfectionStatus>,
    infected: usize,
}

impl DaySnapshot {
    #[must_use]
    pub fn new(day: usize, statuses: Vec<InfectionStatus>) -> Self {
        let infected = statuses.iter().filter(|status| status.is_infected()).count();
        DaySnapshot {
            day,
            statuses,
            infected,
        }
    }

    #[must_use]
    pub fn day(&self) -> usize {
        self.day
    }

    #[must_use]
    pub fn statuses(&self) -> &[InfectionStatus] {
        &self.statuses
    }

    #[must_use]
    pub fn status(&self, person_id: PersonId) -> Option<InfectionStatus> {
        self.statuses.get(person_id.0).copied()
    }

    #[must_use]
    pub fn infected(&self) -> usize {
        self.infected
    }

    /// Infected count over population size; 0 for an empty population.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn infected_proportion(&self) -> f64 {
        if self.statuses.is_empty() {
            return 0.0;
        }
        self.infected as f64 / self.statuses.len() as f64
    }

    pub fn infected_people(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, status)| status.is_infected())
            .map(|(idx, _)| PersonId(idx))
    }
}

/// Snapshots indexed by day, day 0 first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DayHistory {
    snapshots: Vec<DaySnapshot>,
}

impl DayHistory {
    #[must_use]
    pub fn snapshot(&self, day: usize) -> Option<&DaySnapshot> {
        self.snapshots.get(day)
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &DaySnapshot> {
        self.snapshots.iter()
    }

    #[must_use]
    pub fn last_day(&self) -> Option<usize> {
        self.snapshots.last().map(DaySnapshot::day)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn infected_proportions(&self) -> Vec<f64> {
        self.snapshots
            .iter()
            .map(DaySnapshot::infected_proportion)
            .collect()
    }

    fn push(&mut self, snapshot: DaySnapshot) -> Result<(), ContagionError> {
        let expected = self.snapshots.len();
        if snapshot.day != expected {
            return Err(ContagionError::Configuration(format!(
                "day {} recorded out of order, expected day {expected}",
                snapshot.day
            )));
        }
        self.snapshots.push(snapshot);
        Ok(())
    }

    fn clear(&mut self) {
        self.snapshots.clear();
    }
}

crate::define_data_plugin!(DayHistory, DayHistory::default());

pub trait ContextStatusExt {
    /// Everyone's current status indexed by `PersonId`. People whose status was never set
    /// read as susceptible.
    fn statuses(&self) -> Vec<InfectionStatus>;

    /// Overwrites everyone's status from a vector indexed by `PersonId`.
    fn commit_statuses(&mut self, statuses: &[InfectionStatus]);

    /// Sets everyone back to susceptible.
    fn reset_statuses(&mut self);

    fn infected_count(&self) -> usize;

    /// Appends the current state as the snapshot for `day`. Days must be recorded in order,
    /// starting from 0.
    fn record_snapshot(&mut self, day: usize) -> Result<&DaySnapshot, ContagionError>;

    /// Drops every recorded snapshot, e.g. before re-seeding.
    fn clear_history(&mut self);

    fn snapshot(&self, day: usize) -> Option<&DaySnapshot>;

    fn day_history(&self) -> Option<&DayHistory>;

    /// The infected proportion of every recorded day, day 0 first.
    fn infected_proportions(&self) -> Vec<f64>;
}

impl ContextStatusExt for Context {
    fn statuses(&self) -> Vec<InfectionStatus> {
        self.people()
            .map(|person_id| {
                self.get_person_property::<InfectionStatus>(person_id)
                    .unwrap_or(InfectionStatus::Susceptible)
            })
            .collect()
    }

    fn commit_statuses(&mut self, statuses: &[InfectionStatus]) {
        for (idx, status) in statuses.iter().enumerate() {
            self.set_person_property(PersonId(idx), *status);
        }
    }

    fn reset_statuses(&mut self) {
        for person_id in self.people() {
            self.set_person_property(person_id, InfectionStatus::Susceptible);
        }
    }

    fn infected_count(&self) -> usize {
        self.query_people_count(InfectionStatus::Infected)
    }

    fn record_snapshot(&mut self, day: usize) -> Result<&DaySnapshot, ContagionError> {
        let snapshot = DaySnapshot::new(day, self.statuses());
        debug!(
            "day {day}: {} infected ({:.4})",
            snapshot.infected(),
            snapshot.infected_proportion()
        );
        let history = self.get_data_container_mut::<DayHistory>();
        history.push(snapshot)?;
        Ok(&history.snapshots[day])
    }

    fn clear_history(&mut self) {
        self.get_data_container_mut::<DayHistory>().clear();
    }

    fn snapshot(&self, day: usize) -> Option<&DaySnapshot> {
        self.day_history().and_then(|history| history.snapshot(day))
    }

    fn day_history(&self) -> Option<&DayHistory> {
        self.get_data_container::<DayHistory>()
    }

    fn infected_proportions(&self) -> Vec<f64> {
        self.day_history()
            .map(DayHistory::infected_proportions)
            .unwrap_or_default()
    }
}
