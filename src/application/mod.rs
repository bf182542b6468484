//! Application services layer.

pub mod broker;
pub mod cache;
pub mod error;
pub mod repos;
pub mod todos;
