/*!

The run driver. A run immunizes, seeds day 0, then steps days 1..=N in strict order. Each day
is transmission, then the staff check-up, then immunity enforcement, then the end-of-day
snapshot. The run always lasts the configured number of days, even if the infection dies out.

*/

use crate::{
    context::Context,
    error::ContagionError,
    immunization::{ContextImmunizationExt, Immune, ImmunizationPolicy},
    parameters::ContextParametersExt,
    people::ContextPeopleExt,
    random::ContextRandomExt,
    reproduction::ContextReproductionExt,
    roles::RoleSource,
    screening::ContextScreeningExt,
    seeding::ContextSeedingExt,
    status::{ContextStatusExt, DayHistory, DaySnapshot, InfectionStatus},
    transmission::ContextTransmissionExt,
};
use log::{debug, info, trace};

/// Everything a run produces.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    /// Infected proportion per day, day 0 first.
    pub proportions: Vec<f64>,
    /// Immunized identifiers, highest centrality first.
    pub immunized: Vec<String>,
    pub r0: f64,
    /// Number of people infected on day 0.
    pub seeded: usize,
    pub history: DayHistory,
}

impl RunOutcome {
    #[must_use]
    pub fn final_proportion(&self) -> f64 {
        self.proportions.last().copied().unwrap_or_default()
    }
}

pub trait ContextSimulationExt {
    /// Forces every immune person back to susceptible. Returns how many were changed.
    fn enforce_immunity(&mut self) -> usize;

    /// Advances the epidemic by one day. `day` must follow the last recorded day, so seeding
    /// must have produced day 0 first.
    fn step_day(&mut self, day: usize) -> Result<&DaySnapshot, ContagionError>;

    /// Steps every remaining day up to and including `days`, and returns the infected
    /// proportion of every recorded day.
    fn simulate(&mut self, days: usize) -> Result<Vec<f64>, ContagionError>;
}

impl ContextSimulationExt for Context {
    fn enforce_immunity(&mut self) -> usize {
        let vetoed = self.query_people((Immune(true), InfectionStatus::Infected));
        for person_id in &vetoed {
            trace!("person {person_id} is immune, reset to susceptible");
            self.set_person_property(*person_id, InfectionStatus::Susceptible);
        }
        vetoed.len()
    }

    fn step_day(&mut self, day: usize) -> Result<&DaySnapshot, ContagionError> {
        let last_day = self.day_history().and_then(DayHistory::last_day);
        if day == 0 || last_day != Some(day - 1) {
            return Err(ContagionError::Configuration(format!(
                "cannot step day {day}: last recorded day is {last_day:?}"
            )));
        }

        let infected = self.transmission_step()?;
        let recovered = self.screening_step(day)?;
        let vetoed = self.enforce_immunity();
        debug!("day {day}: +{infected} infected, -{recovered} recovered, {vetoed} vetoed");
        self.record_snapshot(day)
    }

    fn simulate(&mut self, days: usize) -> Result<Vec<f64>, ContagionError> {
        let Some(last_day) = self.day_history().and_then(DayHistory::last_day) else {
            return Err(ContagionError::Configuration(
                "no day 0 snapshot; seed infections before simulating".to_string(),
            ));
        };
        for day in last_day + 1..=days {
            self.step_day(day)?;
        }
        Ok(self.infected_proportions())
    }
}

/// Runs a complete simulation on a context that already holds the contact graph and
/// parameters: reseeds every generator from the parameters, immunizes, seeds day 0, steps
/// `days` days and estimates R0.
pub fn run(
    context: &mut Context,
    roles: &RoleSource,
    policy: &ImmunizationPolicy,
) -> Result<RunOutcome, ContagionError> {
    let parameters = context.parameters()?;
    context.init_random(parameters.seed);

    let immunized = context.immunize(policy)?;
    let seeded = context.seed_infections(roles)?;
    let proportions = context.simulate(parameters.days)?;
    let r0 = context.estimate_r0()?;
    let history = context.day_history().cloned().unwrap_or_default();

    let outcome = RunOutcome {
        proportions,
        immunized,
        r0,
        seeded,
        history,
    };
    info!(
        "run finished after {} days: {:.4} infected, R0 {:.4}",
        parameters.days,
        outcome.final_proportion(),
        outcome.r0
    );
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        InfectionStatus::{Infected, Susceptible},
        PersonId,
        graph::{ContactGraph, ContextGraphExt},
        parameters::Parameters,
        roles::{ContextRoleExt, Role, RoleTable},
    };

    fn hospital_graph() -> ContactGraph {
        let edges: Vec<(String, String)> = (0..60)
            .flat_map(|i| [(i, (i + 1) % 60), (i, (i + 2) % 60), (i, (i + 17) % 60)])
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        ContactGraph::from_edges(edges)
    }

    fn hospital(parameters: Parameters) -> Context {
        let mut context = Context::new();
        context.load_contact_graph(hospital_graph()).unwrap();
        context.set_parameters(parameters).unwrap();
        context
    }

    fn sampled() -> RoleSource {
        RoleSource::Sampled { p_patient: 0.387 }
    }

    #[test]
    fn run_records_every_day() {
        let mut context = hospital(Parameters {
            days: 12,
            p_infectious: 0.2,
            ..Parameters::default()
        });
        let outcome = run(&mut context, &sampled(), &ImmunizationPolicy::Disabled).unwrap();
        assert_eq!(outcome.proportions.len(), 13);
        assert_eq!(outcome.history.len(), 13);
        assert!(outcome.seeded >= 1);
        assert!(outcome.immunized.is_empty());
        assert!(outcome.proportions[0] > 0.0);
        assert!(outcome.r0 > 0.0);
        for (day, snapshot) in outcome.history.snapshots().enumerate() {
            assert_eq!(snapshot.day(), day);
            assert_eq!(snapshot.statuses().len(), 60);
        }
    }

    #[test]
    fn immune_people_end_every_day_susceptible() {
        let mut context = hospital(Parameters {
            days: 20,
            p_infectious: 0.5,
            p_patient_transmit: 0.9,
            p_other_transmit: 0.9,
            susceptibility_threshold: 1.0,
            p_recovery: 0.0,
            ..Parameters::default()
        });
        let listed: Vec<String> = (0..60).step_by(3).map(|i| i.to_string()).collect();
        let outcome = run(
            &mut context,
            &sampled(),
            &ImmunizationPolicy::Listed(listed.clone()),
        )
        .unwrap();
        assert_eq!(outcome.immunized, listed);

        let graph = context.contact_graph().unwrap();
        let immune = graph.resolve(listed.iter().map(String::as_str), "test").unwrap();
        for snapshot in outcome.history.snapshots() {
            for person_id in &immune {
                assert_eq!(snapshot.status(*person_id), Some(Susceptible));
            }
        }
        assert!(outcome.final_proportion() > 0.0);
    }

    #[test]
    fn infections_accumulate_without_recovery() {
        let mut context = hospital(Parameters {
            days: 25,
            p_infectious: 0.2,
            p_patient_transmit: 0.2,
            p_other_transmit: 0.1,
            p_recovery: 0.0,
            screening_interval: 1,
            ..Parameters::default()
        });
        let outcome = run(&mut context, &sampled(), &ImmunizationPolicy::Disabled).unwrap();
        let snapshots: Vec<&DaySnapshot> = outcome.history.snapshots().collect();
        for pair in snapshots.windows(2) {
            for (before, after) in pair[0].statuses().iter().zip(pair[1].statuses()) {
                assert!(!before.is_infected() || after.is_infected());
            }
        }
    }

    #[test]
    fn same_seed_same_trajectory() {
        let parameters = Parameters {
            seed: 2024,
            days: 15,
            p_infectious: 0.2,
            p_patient_transmit: 0.3,
            p_other_transmit: 0.2,
            screening_interval: 3,
            ..Parameters::default()
        };
        let first = run(&mut hospital(parameters), &sampled(), &ImmunizationPolicy::Disabled);
        let second = run(&mut hospital(parameters), &sampled(), &ImmunizationPolicy::Disabled);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn screening_follows_transmission() {
        let mut context = Context::new();
        context
            .load_contact_graph(ContactGraph::from_edges([("pat", "nurse")]))
            .unwrap();
        context
            .set_parameters(Parameters {
                p_patient_transmit: 0.0,
                p_other_transmit: 0.0,
                p_recovery: 1.0,
                screening_interval: 1,
                ..Parameters::default()
            })
            .unwrap();
        let table =
            RoleTable::from_entries([("pat", Role::Patient), ("nurse", Role::NonPatient)]).unwrap();
        context.assign_roles(&RoleSource::Table(table)).unwrap();
        context.commit_statuses(&[Infected, Infected]);
        context.record_snapshot(0).unwrap();

        let snapshot = context.step_day(1).unwrap();
        assert_eq!(snapshot.status(PersonId(0)), Some(Infected));
        assert_eq!(snapshot.status(PersonId(1)), Some(Susceptible));
    }

    #[test]
    fn enforce_immunity_resets_immune_people() {
        let mut context = hospital(Parameters::default());
        context
            .immunize(&ImmunizationPolicy::Listed(vec!["4".to_string()]))
            .unwrap();
        let person = context.contact_graph().unwrap().person("4").unwrap();
        context.set_person_property(person, Infected);
        assert_eq!(context.enforce_immunity(), 1);
        assert_eq!(
            context.get_person_property::<InfectionStatus>(person),
            Some(Susceptible)
        );
        assert_eq!(context.enforce_immunity(), 0);
    }

    #[test]
    fn days_must_follow_day_zero() {
        let mut context = hospital(Parameters::default());
        assert!(matches!(
            context.simulate(5),
            Err(ContagionError::Configuration(_))
        ));
        assert!(context.step_day(1).is_err());

        context
            .assign_roles(&RoleSource::Sampled { p_patient: 0.5 })
            .unwrap();
        context.record_snapshot(0).unwrap();
        assert!(context.step_day(2).is_err());
        assert!(context.step_day(0).is_err());
        assert_eq!(context.step_day(1).unwrap().day(), 1);
        assert_eq!(context.simulate(3).unwrap().len(), 4);
    }
}
