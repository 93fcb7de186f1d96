pub mod config;
pub mod link;
pub mod list;
pub mod pick;
pub mod query;
