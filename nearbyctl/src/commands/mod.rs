pub(crate) mod locations;
pub(crate) mod search;
