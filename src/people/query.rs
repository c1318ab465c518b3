use seq_macro::seq;

use crate::{PersonId, people::PeopleData, property::Property};

/// Encapsulates a person query: a property value, or a tuple of property values that must all
/// match.
///
/// [`crate::ContextPeopleExt::query_people`] actually takes an instance of [`Query`], but
/// because we implement Query for tuples of up to size 8, that's invisible to the caller:
/// `context.query_people((Role::NonPatient, InfectionStatus::Infected))`.
pub trait Query {
    /// Reports whether `person_id` matches every value in the query. A person with no value
    /// for a queried property never matches.
    fn matches(&self, people_data: &PeopleData, person_id: PersonId) -> bool;
}

// The empty query matches everyone.
impl Query for () {
    fn matches(&self, _people_data: &PeopleData, _person_id: PersonId) -> bool {
        true
    }
}

// The query with one parameter
impl<T1: Property> Query for T1 {
    fn matches(&self, people_data: &PeopleData, person_id: PersonId) -> bool {
        people_data.get_person_property::<T1>(person_id) == Some(*self)
    }
}

// Implement the versions with 1..8 parameters.
macro_rules! impl_query {
    ($ct:expr) => {
        seq!(N in 0..$ct {
            impl<
                #(
                    T~N : Property,
                )*
            > Query for (
                #(
                    T~N,
                )*
            )
            {
                fn matches(&self, people_data: &PeopleData, person_id: PersonId) -> bool {
                    #(
                        if people_data.get_person_property::<T~N>(person_id) != Some(self.N) {
                            return false;
                        }
                    )*
                    true
                }
            }
        });
    }
}

seq!(Z in 1..8 {
    impl_query!(Z);
});
