use crate::{
    PersonId,
    context::Context,
    error::ContagionError,
    immunization::ContextImmunizationExt,
    parameters::ContextParametersExt,
    people::ContextPeopleExt,
    random::ContextRandomExt,
    roles::{ContextRoleExt, Role, RoleSource},
    status::{ContextStatusExt, InfectionStatus},
};
use log::{info, trace, warn};
use rand::Rng;

crate::define_rng!(SeedingRng);

/// Flips one Bernoulli(`p_infectious`) coin per candidate and keeps the winners.
pub fn draw_seeds<R: Rng + ?Sized>(
    candidates: &[PersonId],
    p_infectious: f64,
    rng: &mut R,
) -> Vec<PersonId> {
    candidates
        .iter()
        .copied()
        .filter(|_| rng.random_bool(p_infectious))
        .collect()
}

pub trait ContextSeedingExt {
    /// Produces day 0: starting from everyone susceptible, assigns roles and infects each
    /// non-immune patient with probability `p_infectious`, retrying the whole draw until at
    /// least one person is infected. Gives up with [`ContagionError::SeedingImpossible`]
    /// after `max_seeding_attempts` tries.
    ///
    /// On success the day history is restarted with the day-0 snapshot and the number of
    /// seeded people is returned. Immunization must already have run.
    fn seed_infections(&mut self, roles: &RoleSource) -> Result<usize, ContagionError>;
}

impl ContextSeedingExt for Context {
    fn seed_infections(&mut self, roles: &RoleSource) -> Result<usize, ContagionError> {
        let parameters = self.parameters()?;
        let immune = self.immunity();

        for attempt in 1..=parameters.max_seeding_attempts {
            self.reset_statuses();
            self.assign_roles(roles)?;

            let candidates: Vec<PersonId> = self
                .query_people(Role::Patient)
                .into_iter()
                .filter(|person_id| !immune[person_id.0])
                .collect();
            let seeded = self.sample::<SeedingRng, _>(|rng| {
                draw_seeds(&candidates, parameters.p_infectious, rng)
            });

            if seeded.is_empty() {
                trace!("seeding attempt {attempt} infected nobody");
                continue;
            }

            for person_id in &seeded {
                trace!("person {person_id} is an initial carrier");
                self.set_person_property(*person_id, InfectionStatus::Infected);
            }
            self.clear_history();
            let snapshot = self.record_snapshot(0)?;
            info!(
                "seeded {} infections after {attempt} attempt(s), day 0 proportion {:.4}",
                seeded.len(),
                snapshot.infected_proportion()
            );
            return Ok(seeded.len());
        }

        warn!(
            "no initial infection after {} attempts",
            parameters.max_seeding_attempts
        );
        Err(ContagionError::SeedingImpossible {
            attempts: parameters.max_seeding_attempts,
        })
    }
}
