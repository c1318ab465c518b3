/*!

The transmission engine: one day of contact-driven spread.

Every infected person tries to infect each neighbour. An attempt succeeds when the
role-dependent transmission roll and the neighbour's daily exposure roll both succeed. The pass
reads a frozen copy of the morning's statuses and writes into a separate next-day vector, so a
person infected today cannot pass the disease on until tomorrow.

*/

use crate::{
    PersonId,
    context::Context,
    error::ContagionError,
    graph::{ContactGraph, ContextGraphExt},
    immunization::ContextImmunizationExt,
    parameters::{ContextParametersExt, Parameters},
    random::ContextRandomExt,
    roles::{ContextRoleExt, Role},
    status::{ContextStatusExt, InfectionStatus},
};
use log::{debug, trace};
use rand::Rng;

crate::define_rng!(TransmissionRng);

/// Per-contact probabilities used by [`spread`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransmissionRates {
    pub patient: f64,
    pub other: f64,
    pub susceptibility_threshold: f64,
}

impl TransmissionRates {
    #[must_use]
    pub fn from_parameters(parameters: &Parameters) -> Self {
        TransmissionRates {
            patient: parameters.p_patient_transmit,
            other: parameters.p_other_transmit,
            susceptibility_threshold: parameters.susceptibility_threshold,
        }
    }

    /// Transmission probability for an infected source with the given role.
    #[must_use]
    pub fn source_rate(&self, role: Role) -> f64 {
        match role {
            Role::Patient => self.patient,
            Role::NonPatient => self.other,
        }
    }
}

/// Does the disease pass along one contact?
pub fn transmits<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> bool {
    rng.random_bool(rate)
}

/// Is the contact exposed enough today to be infectable?
pub fn is_exposed<R: Rng + ?Sized>(rng: &mut R, threshold: f64) -> bool {
    rng.random_bool(threshold)
}

/// Computes the next day's statuses from `current`. Only `current` is read when deciding who
/// is a source, so new infections never cascade within the call. Immune people are vetoed and
/// stay susceptible.
///
/// `roles` and `immune` are indexed by `PersonId` and must be as long as `current`.
pub fn spread<R: Rng + ?Sized>(
    current: &[InfectionStatus],
    graph: &ContactGraph,
    roles: &[Role],
    immune: &[bool],
    rates: &TransmissionRates,
    rng: &mut R,
) -> Vec<InfectionStatus> {
    let mut next = current.to_vec();

    for (idx, status) in current.iter().enumerate() {
        if !status.is_infected() {
            continue;
        }
        let source = PersonId(idx);
        let rate = rates.source_rate(roles[idx]);

        for &contact in graph.neighbors(source) {
            // Exposure is only rolled once the transmission roll has succeeded.
            if !(transmits(rng, rate) && is_exposed(rng, rates.susceptibility_threshold)) {
                continue;
            }
            if immune[contact.0] {
                trace!("immunity veto: {source} could not infect {contact}");
                next[contact.0] = InfectionStatus::Susceptible;
            } else {
                if next[contact.0] == InfectionStatus::Susceptible {
                    trace!("{source} infected {contact}");
                }
                next[contact.0] = InfectionStatus::Infected;
            }
        }
    }
    next
}

pub trait ContextTransmissionExt {
    /// Runs one transmission pass over the current statuses and commits the result. Returns
    /// the number of people newly infected.
    fn transmission_step(&mut self) -> Result<usize, ContagionError>;
}

impl ContextTransmissionExt for Context {
    fn transmission_step(&mut self) -> Result<usize, ContagionError> {
        let rates = TransmissionRates::from_parameters(&self.parameters()?);
        let graph = self.contact_graph()?;
        let roles = self.roles()?;
        let immune = self.immunity();
        let current = self.statuses();

        let next = self.sample::<TransmissionRng, _>(|rng| {
            spread(&current, &graph, &roles, &immune, &rates, rng)
        });
        let new_infections = current
            .iter()
            .zip(&next)
            .filter(|(before, after)| !before.is_infected() && after.is_infected())
            .count();

        self.commit_statuses(&next);
        debug!("transmission: {new_infections} new infections");
        Ok(new_infections)
    }
}
