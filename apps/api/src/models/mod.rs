pub mod catalog;
pub mod learning;
pub mod user;
