//! SYSOCIAL - school administration backend
//!
//! REST API over a relational database for students, guardians, courses,
//! classes, enrollments, attendance and an immutable audit trail.
//!
//! # Architecture
//! - `api`: JWT, middleware, HTTP handlers and routes
//! - `services`: domain logic per resource
//! - `storage`: SeaORM connection, migrations and retry
//! - `config`: TOML + environment configuration
//! - `runtime`: startup, server and shutdown
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
