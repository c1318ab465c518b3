use crate::{
    PersonId,
    context::Context,
    people::{PeopleData, PeopleIterator, Query},
    property::Property,
};

pub trait ContextPeopleExt {
    fn get_current_population(&self) -> usize;

    /// Adds a new person with no property values set.
    fn add_person(&mut self) -> PersonId;

    /// Gets a copy of the value of the property for the given person, or `None` if it was
    /// never set.
    fn get_person_property<T: Property>(&self, person_id: PersonId) -> Option<T>;

    fn set_person_property<T: Property>(&mut self, person_id: PersonId, value: T);

    /// Returns every person matching the query, in `PersonId` order.
    fn query_people<T: Query>(&self, q: T) -> Vec<PersonId>;

    /// Get the count of all people matching a given set of criteria without allocating a list.
    fn query_people_count<T: Query>(&self, q: T) -> usize;

    /// Iterates over every person currently in the population.
    fn people(&self) -> PeopleIterator;
}

impl ContextPeopleExt for Context {
    fn get_current_population(&self) -> usize {
        match self.get_data_container::<PeopleData>() {
            None => 0,
            Some(people_data) => people_data.current_population,
        }
    }

    fn add_person(&mut self) -> PersonId {
        self.get_data_container_mut::<PeopleData>().add_person()
    }

    fn get_person_property<T: Property>(&self, person_id: PersonId) -> Option<T> {
        self.get_data_container::<PeopleData>()
            .and_then(|people_data| people_data.get_person_property(person_id))
    }

    fn set_person_property<T: Property>(&mut self, person_id: PersonId, value: T) {
        self.get_data_container_mut::<PeopleData>()
            .set_property(person_id, value);
    }

    fn query_people<T: Query>(&self, q: T) -> Vec<PersonId> {
        let Some(people_data) = self.get_data_container::<PeopleData>() else {
            return Vec::new();
        };
        people_data
            .people_iterator()
            .filter(|person_id| q.matches(people_data, *person_id))
            .collect()
    }

    fn query_people_count<T: Query>(&self, q: T) -> usize {
        let Some(people_data) = self.get_data_container::<PeopleData>() else {
            return 0;
        };
        people_data
            .people_iterator()
            .filter(|person_id| q.matches(people_data, *person_id))
            .count()
    }

    fn people(&self) -> PeopleIterator {
        match self.get_data_container::<PeopleData>() {
            None => PeopleData::default().people_iterator(),
            Some(people_data) => people_data.people_iterator(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
    struct Bed(u16);
    impl Property for Bed {}

    #[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
    enum Shift {
        Day,
        Night,
    }
    impl Property for Shift {}

    #[test]
    fn add_and_read_people() {
        let mut context = Context::new();
        assert_eq!(context.get_current_population(), 0);
        assert!(context.query_people(Shift::Day).is_empty());

        let nurse = context.add_person();
        context.set_person_property(nurse, Bed(1));
        context.set_person_property(nurse, Shift::Night);
        let porter = context.add_person();
        assert_eq!(context.get_current_population(), 2);
        assert_eq!(context.get_person_property::<Bed>(nurse), Some(Bed(1)));
        assert_eq!(context.get_person_property::<Bed>(porter), None);

        context.set_person_property(porter, Shift::Day);
        assert_eq!(context.get_person_property::<Shift>(porter), Some(Shift::Day));
        assert_eq!(context.people().collect::<Vec<_>>(), vec![nurse, porter]);
    }

    #[test]
    fn query_by_one_and_many_properties() {
        let mut context = Context::new();
        let mut add = |bed: Bed, shift: Shift| {
            let person = context.add_person();
            context.set_person_property(person, bed);
            context.set_person_property(person, shift);
            person
        };
        let a = add(Bed(1), Shift::Night);
        let b = add(Bed(2), Shift::Night);
        let c = add(Bed(1), Shift::Day);

        assert_eq!(context.query_people(Shift::Night), vec![a, b]);
        assert_eq!(context.query_people((Bed(1), Shift::Night)), vec![a]);
        assert_eq!(context.query_people_count(Bed(1)), 2);
        assert_eq!(context.query_people_count(()), 3);
        assert_eq!(context.query_people((Shift::Day,)), vec![c]);
        assert!(context.query_people((Bed(2), Shift::Day)).is_empty());
    }
}
