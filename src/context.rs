use crate::{HashMap, TypeId, type_of};
use std::any::Any;

/// A type that can live in a [`Context`] as a data plugin. The context constructs the plugin
/// lazily, the first time it is asked for a mutable reference to it.
pub trait DataPlugin: Any {
    fn init() -> Self;
}

/// Holds every piece of simulation state, one data plugin per type.
pub struct Context {
    // This is actually a `HashMap<TypeId, Box<T: DataPlugin>>`.
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Context {
            data_plugins: HashMap::default(),
        }
    }

    /// Returns a mutable reference for the data container for `T`, creating it if it doesn't exist yet.
    pub fn get_data_container_mut<T: DataPlugin>(&mut self) -> &mut T {
        self.data_plugins
            .entry(type_of::<T>())
            .or_insert_with(|| Box::new(T::init()))
            .downcast_mut::<T>()
            .unwrap() // Will never panic as data container has the matching type
    }

    /// Returns a reference to the data container for `T` if it exists.
    /// If you need a mutable reference or lazy instantiation, use `Context::get_data_container_mut()`.
    #[must_use]
    pub fn get_data_container<T: DataPlugin>(&self) -> Option<&T> {
        self.data_plugins
            .get(&type_of::<T>())
            .and_then(|data| data.downcast_ref::<T>())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Implements [`DataPlugin`] for a type with the given initializer expression.
///
/// ```
/// # use ward_contagion::define_data_plugin;
/// struct Tally(usize);
/// define_data_plugin!(Tally, Tally(0));
/// ```
#[macro_export]
macro_rules! define_data_plugin {
    ($data_plugin:ty, $init:expr) => {
        impl $crate::context::DataPlugin for $data_plugin {
            fn init() -> Self {
                $init
            }
        }
    };
}
