//! # Chore Tracker Backend
//!
//! Backend engine for the chore tracker: a recurring assignment generator,
//! per-child streak tracking with penalty tiers and holiday exemptions,
//! rivalry bidding between siblings, guardian completion approval, and a
//! wallet ledger with exactly-once crediting semantics.
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (Business logic, services)
//!     ↓
//! Storage Layer (repository traits, reference store)
//! ```
//!
//! The domain layer is written against the storage traits in
//! [`storage::traits`]; the in-memory reference store in [`storage::memory`]
//! honors the same atomicity contract a database-backed store would.

pub mod domain;
pub mod io;
pub mod storage;
