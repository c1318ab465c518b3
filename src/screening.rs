use crate::{
    PersonId,
    context::Context,
    error::ContagionError,
    parameters::ContextParametersExt,
    random::ContextRandomExt,
    roles::{ContextRoleExt, Role},
    status::{ContextStatusExt, InfectionStatus},
};
use log::{debug, trace};
use rand::Rng;

crate::define_rng!(ScreeningRng);

/// Staff check-ups happen on every day divisible by `interval`.
#[must_use]
pub fn is_check_day(day: usize, interval: u32) -> bool {
    interval != 0 && day % interval as usize == 0
}

/// Detects each infected staff member with probability `p_recovery` and sets them back to
/// susceptible. Patients are never screened. Returns the people who recovered.
pub fn recover<R: Rng + ?Sized>(
    statuses: &mut [InfectionStatus],
    roles: &[Role],
    p_recovery: f64,
    rng: &mut R,
) -> Vec<PersonId> {
    let mut recovered = Vec::new();
    for (idx, status) in statuses.iter_mut().enumerate() {
        if roles[idx] == Role::Patient || !status.is_infected() {
            continue;
        }
        if rng.random_bool(p_recovery) {
            *status = InfectionStatus::Susceptible;
            recovered.push(PersonId(idx));
        }
    }
    recovered
}

pub trait ContextScreeningExt {
    /// Runs the staff check-up if `day` is a check day. Returns how many people recovered.
    fn screening_step(&mut self, day: usize) -> Result<usize, ContagionError>;
}

impl ContextScreeningExt for Context {
    fn screening_step(&mut self, day: usize) -> Result<usize, ContagionError> {
        let parameters = self.parameters()?;
        if !is_check_day(day, parameters.screening_interval) {
            return Ok(0);
        }

        let roles = self.roles()?;
        let mut statuses = self.statuses();
        let recovered = self.sample::<ScreeningRng, _>(|rng| {
            recover(&mut statuses, &roles, parameters.p_recovery, rng)
        });
        for person_id in &recovered {
            trace!("day {day}: staff member {person_id} detected and isolated");
        }

        self.commit_statuses(&statuses);
        debug!("day {day}: check-up, {} recovered", recovered.len());
        Ok(recovered.len())
    }
}
