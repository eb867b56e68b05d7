//! Internal implementation details.

pub(crate) mod guard;

pub(crate) use guard::with_construction_catch;
