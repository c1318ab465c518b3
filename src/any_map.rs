/*!

A macro implementing the `AnyMap` pattern: a heterogeneous map of the form
`HashMap<Type, Container<Type>>` that routes each value to the inner container for its type.
[`crate::property_map::PropertyMap`] is built with it to keep one column of values per
person property:

```rust
# use ward_contagion::define_any_map_container;
define_any_map_container!(
    Columns,
    Vec<T: Clone>,
    Vec::<T>::new(),
    Vec::push
);

# #[derive(Clone)]
# enum Ward { Icu, Geriatrics }
let mut columns = Columns::new();
columns.push(Ward::Icu);
columns.push(37u8);
assert_eq!(columns.get_container_ref::<u8>().map(Vec::len), Some(1));
```

 - The pattern is implemented with `std::any::Any`, so stored types must be `'static`.
 - There's nothing special about `Vec<T>`. Any container with a constructor and an inserter works.

*/

/// Defines a container struct implementing the `AnyMap` pattern, a container that can store
/// multiple types of values, routing values to the right variant of inner container type.
///
/// # Parameters
/// - `$name`: The name of the struct to define.
/// - `$container<$generic $( : $traitfirst $(+ $traitrest)* )?>`: The type of container to use for
///    each generic type with optional trait constraints (e.g., `Vec<T: Property + Send>`). The
///    additional constraint that `$generic` is `'static` will be added automatically.
/// - `$constructor`: An expression to construct a new instance of the container.
/// - `$inserter`: A function or closure to insert a value into the container.
#[macro_export]
macro_rules! define_any_map_container {
    (
        $name:ident,
        $container:ident<$generic:ident $( : $traitfirst:ident $(+ $traitrest:ident)* )?>,
        $constructor:expr,
        $inserter:expr
    ) => {
        pub struct $name {
            map: std::collections::HashMap<std::any::TypeId, Box<dyn std::any::Any>>,
        }

        #[allow(dead_code)]
        impl $name {
            #[inline]
            pub fn new() -> $name {
                $name {
                    map: std::collections::HashMap::new(),
                }
            }

            #[inline]
            pub fn push<$generic : $( $traitfirst $(+ $traitrest)* +)? 'static>(&mut self, value: $generic) {
                let v: &mut $container<$generic> = self.get_container_mut();
                ($inserter)(v, value);
            }

            #[inline]
            pub fn get_container_mut<$generic : $( $traitfirst $(+ $traitrest)* +)? 'static>(&mut self) -> &mut $container<$generic> {
                self.map
                    .entry(std::any::TypeId::of::<$generic>())
                    .or_insert_with(|| Box::new($constructor))
                    .downcast_mut()
                    // Only a `$container<$generic>` is ever stored under this key.
                    .unwrap()
            }

            #[inline]
            pub fn get_container_ref<$generic : $( $traitfirst $(+ $traitrest)* +)? 'static>(&self) -> Option<&$container<$generic>> {
                self.map
                    .get(&std::any::TypeId::of::<$generic>())
                    .and_then(|v| v.downcast_ref())
            }

            #[inline]
            pub fn contains<$generic : $( $traitfirst $(+ $traitrest)* +)? 'static>(&self) -> bool {
                self.map.contains_key(&std::any::TypeId::of::<$generic>())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}
pub use define_any_map_container;
