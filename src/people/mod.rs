/*!

Per-person property storage. A person is created for every node of the contact graph, and each
module keeps its per-person state (role, infection status, immunity) here as a [`Property`].

[`Property`]: crate::property::Property

*/

mod context_ext;
mod people_data;
mod query;

// `ContextPeopleExt` is the public API to `PeopleData`.
pub(crate) use people_data::PeopleData;
pub use people_data::PeopleIterator;

pub use context_ext::ContextPeopleExt;
pub use query::Query;
