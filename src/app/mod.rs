//! Application runtime composition modules.

pub(crate) mod context;
pub(crate) mod dispatcher;
pub(crate) mod terminal;
