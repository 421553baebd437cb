pub mod handlers;
pub mod proficiency;
pub mod reconcile;
pub mod sheet;
