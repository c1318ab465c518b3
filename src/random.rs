/*!

Named, independently seeded random number generators.

Each concern that draws random numbers (role sampling, seeding, transmission, screening, graph
generation) declares its own generator with [`define_rng!`]. Every generator is seeded from the
run's base seed offset by a hash of its name, so adding draws to one concern never shifts the
stream seen by another, and a run is reproducible from its base seed alone.

*/

use crate::{
    HashMap, TypeId,
    context::Context,
    hashing::hash_str,
    type_of,
};
use log::trace;
use rand::{Rng, SeedableRng};
use std::any::Any;

pub trait RngId: Any {
    type RngType: SeedableRng + Rng;
    const NAME: &'static str;
    fn new(seed: u64) -> Self;
    fn rng(&mut self) -> &mut Self::RngType;
}

struct RngPlugin {
    base_seed: u64,
    // This is actually a `HashMap<TypeId, Box<R: RngId>>`.
    rng_map: HashMap<TypeId, Box<dyn Any>>,
}

crate::define_data_plugin!(
    RngPlugin,
    RngPlugin {
        base_seed: 0,
        rng_map: HashMap::default(),
    }
);

impl RngPlugin {
    fn clear(&mut self) {
        self.rng_map.clear();
    }

    fn get_rng<R: RngId>(&mut self) -> &mut R::RngType {
        let base_seed = self.base_seed;
        self.rng_map
            .entry(type_of::<R>())
            .or_insert_with(|| {
                let seed_offset = base_seed.wrapping_add(hash_str(R::NAME));
                trace!("creating generator {} with seed {seed_offset}", R::NAME);
                Box::new(R::new(seed_offset))
            })
            .downcast_mut::<R>()
            .unwrap() // Will never panic as only an `R` is stored under `type_of::<R>()`
            .rng()
    }
}

/// Gets a mutable reference to the random number generator associated with the given
/// `RngId`.
// This is a private free function so that it's not leaked to the public API.
fn get_rng<R: RngId>(context: &mut Context) -> &mut R::RngType {
    context.get_data_container_mut::<RngPlugin>().get_rng::<R>()
}

pub trait ContextRandomExt {
    /// Sets the base seed and discards every generator created so far, so they are re-seeded
    /// on their next use. A context that never calls this uses a base seed of 0.
    fn init_random(&mut self, base_seed: u64);

    /// Gets a random sample from the random number generator associated with the given
    /// `RngId` by applying the specified sampler function. If the Rng has not been used
    /// before, one will be created with the base seed you defined in `init_random`.
    fn sample<R: RngId, T>(&mut self, sampler: impl FnOnce(&mut R::RngType) -> T) -> T;

    /// Gets a random boolean value which is true with probability `p`
    /// using the generator associated with the given `RngId`.
    /// Panics if `p` is outside `[0, 1]`; parameters are validated before they get here.
    fn sample_bool<R: RngId>(&mut self, p: f64) -> bool;
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        trace!("initializing random module with base seed {base_seed}");
        let rng_container = self.get_data_container_mut::<RngPlugin>();
        rng_container.base_seed = base_seed;

        // Clear any existing Rngs to ensure they get re-seeded when `get_rng` is called
        rng_container.clear();
    }

    fn sample<R: RngId, T>(&mut self, sampler: impl FnOnce(&mut R::RngType) -> T) -> T {
        let rng = get_rng::<R>(self);
        sampler(rng)
    }

    fn sample_bool<R: RngId>(&mut self, p: f64) -> bool {
        self.sample::<R, bool>(|rng| rng.random_bool(p))
    }
}

/// Declares a named random number generator, by default a `StdRng`:
/// `define_rng!(TransmissionRng);` or `define_rng!(ScreeningRng, rand::rngs::SmallRng);`.
#[macro_export]
macro_rules! define_rng {
    ($random_id:ident) => {
        $crate::define_rng!($random_id, $crate::rand::rngs::StdRng);
    };
    ($random_id:ident, $rng_type:ty) => {
        struct $random_id {
            rng: $rng_type,
        }

        impl $crate::random::RngId for $random_id {
            type RngType = $rng_type;
            const NAME: &'static str = stringify!($random_id);

            fn new(seed: u64) -> Self {
                use $crate::rand::SeedableRng;
                Self {
                    rng: <$rng_type>::seed_from_u64(seed),
                }
            }

            fn rng(&mut self) -> &mut Self::RngType {
                &mut self.rng
            }
        }
    };
}
pub use define_rng;
