/*!

Day-stepped spread of a hospital-acquired infection over a fixed contact network.

All simulation state lives in a [`Context`] as typed data plugins. Each module contributes an
extension trait on `Context` (`ContextGraphExt`, `ContextRoleExt`, `ContextSeedingExt`, ...)
that reads and writes its own plugin. A complete run is driven by [`simulation::run`], or from a
JSON file through [`scenario::Scenario`].

*/

pub mod any_map;
pub mod context;
pub mod error;
pub mod generators;
pub mod graph;
mod hashing;
pub mod immunization;
pub mod log;
pub mod parameters;
pub mod people;
pub mod property;
pub mod property_map;
pub mod random;
pub mod report;
pub mod reproduction;
pub mod roles;
pub mod scenario;
pub mod screening;
pub mod seeding;
pub mod simulation;
pub mod status;
pub mod transmission;

// All modules import `crate::TypeId` in case we want to change the underlying type of `TypeId`.
pub(crate) use std::any::TypeId;
pub(crate) use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

// Re-exported so that `define_rng!` works in downstream crates.
pub use rand;

pub use context::{Context, DataPlugin};
pub use error::ContagionError;
pub use graph::{ContactGraph, ContextGraphExt};
pub use immunization::{
    CentralityProvider, CentralityScores, CentralityTable, ContextImmunizationExt, Immune,
    ImmunizationPolicy,
};
pub use parameters::{ContextParametersExt, Parameters};
pub use people::ContextPeopleExt;
pub use property::Property;
pub use random::ContextRandomExt;
pub use reproduction::{ContextReproductionExt, reproduction_number};
pub use roles::{ContextRoleExt, Role, RoleSource, RoleTable};
pub use scenario::Scenario;
pub use screening::ContextScreeningExt;
pub use seeding::ContextSeedingExt;
pub use simulation::{ContextSimulationExt, RunOutcome};
pub use status::{ContextStatusExt, DaySnapshot, InfectionStatus};
pub use transmission::ContextTransmissionExt;

#[inline(always)]
pub fn type_of<T: 'static>() -> TypeId {
    TypeId::of::<T>()
}

/// A person in the simulation. The wrapped value is the person's node index in the
/// [`ContactGraph`], so it can index directly into per-person vectors.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
