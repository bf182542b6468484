//! Domain layer scaffolding.

pub mod entities;
pub mod error;
pub mod todos;
