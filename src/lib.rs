//! Todo CRUD service: Postgres-backed records, Redis key lookup, and change
//! notifications over pub/sub.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
