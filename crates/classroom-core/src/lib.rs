// Library root: the roster data model, the draw and grouping operations, and
// the session context that ties them together.

pub mod draw;
pub mod export;
pub mod groups;
pub mod participant;
pub mod roster;
pub mod session;
pub mod spin;
