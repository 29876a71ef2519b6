pub mod candidates;
pub mod roster;
