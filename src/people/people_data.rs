use crate::{PersonId, property::Property, property_map::PropertyMap};

/// Stores all data associated to people and their properties.
pub struct PeopleData {
    pub(crate) current_population: usize,
    // Map from type `T: Property` to `PropertyStore`, a wrapper for `Vec<Option<T>>`
    pub(crate) properties_map: PropertyMap,
}

impl Default for PeopleData {
    fn default() -> Self {
        PeopleData {
            current_population: 0,
            properties_map: PropertyMap::new(),
        }
    }
}

crate::define_data_plugin!(PeopleData, PeopleData::default());

impl PeopleData {
    pub fn add_person(&mut self) -> PersonId {
        let person_id = PersonId(self.current_population);
        self.current_population += 1;
        person_id
    }

    pub fn get_person_property<T: Property>(&self, person_id: PersonId) -> Option<T> {
        self.properties_map
            .get_container_ref::<T>()
            .and_then(|store| store.get(person_id))
    }

    pub fn set_property<T: Property>(&mut self, person_id: PersonId, value: T) {
        self.properties_map
            .get_container_mut::<T>()
            .set(person_id, value);
    }

    /// Convenience function to iterate over the current population. It doesn't hold a
    /// reference to `PeopleData`, so people added while iterating are not visited.
    pub fn people_iterator(&self) -> PeopleIterator {
        PeopleIterator {
            population: self.current_population,
            person_id: 0,
        }
    }
}

/// Iterates over `PersonId`s in order, from a population count captured at creation.
pub struct PeopleIterator {
    population: usize,
    person_id: usize,
}

impl Iterator for PeopleIterator {
    type Item = PersonId;

    fn next(&mut self) -> Option<Self::Item> {
        let ret = if self.person_id < self.population {
            Some(PersonId(self.person_id))
        } else {
            None
        };
        self.person_id += 1;

        ret
    }
}
