use std::{fmt::Debug, hash::Hash};

/// A value attached to every person, one column per implementing type. Implementors are small
/// `Copy` enums or newtypes such as [`crate::Role`], [`crate::InfectionStatus`] and
/// [`crate::Immune`].
pub trait Property: Copy + Debug + PartialEq + Eq + Hash + 'static {}
