/*!

A map from `T: Property` to `PropertyStore` in the `AnyMap` pattern.

*/

use crate::{PersonId, define_any_map_container, property::Property};

/// One column of property values, indexed by `PersonId`. A `None` entry means the property has
/// not been set for that person yet.
pub struct PropertyStore<T: Property> {
    pub values: Vec<Option<T>>,
}

impl<T: Property> PropertyStore<T> {
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline(always)]
    pub fn push(&mut self, property: T) {
        self.values.push(Some(property));
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, person_id: PersonId) -> Option<T> {
        self.values.get(person_id.0).copied().flatten()
    }

    /// Sets the value for `person_id`, growing the column with `None` as needed.
    pub fn set(&mut self, person_id: PersonId, value: T) {
        let idx = person_id.0;
        if idx >= self.values.len() {
            self.values.resize_with(idx + 1, || None);
        }
        self.values[idx] = Some(value);
    }
}

impl<T: Property> Default for PropertyStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

define_any_map_container!(
    PropertyMap,
    PropertyStore<T: Property>,
    PropertyStore::<T>::new(),
    PropertyStore::push
);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
    enum Shift {
        Day,
        Night,
    }
    impl Property for Shift {}

    #[test]
    fn set_grows_the_column() {
        let mut store = PropertyStore::<Shift>::new();
        store.set(PersonId(3), Shift::Night);
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(PersonId(0)), None);
        assert_eq!(store.get(PersonId(3)), Some(Shift::Night));
        assert_eq!(store.get(PersonId(9)), None);
    }

    #[test]
    fn property_map_routes_by_type() {
        let mut map = PropertyMap::new();
        map.push(Shift::Day);
        map.get_container_mut::<Shift>().set(PersonId(2), Shift::Night);
        let column = map.get_container_ref::<Shift>().unwrap();
        assert_eq!(column.get(PersonId(0)), Some(Shift::Day));
        assert_eq!(column.get(PersonId(2)), Some(Shift::Night));
    }
}
