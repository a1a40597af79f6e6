//! # IO Module
//!
//! The interface layer that exposes the engine over HTTP: axum handlers,
//! the router, and mappers between domain models and the DTOs in `shared`.

pub mod mappers;
pub mod rest;

pub use rest::{create_router, AppState};
