//! `taproll-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns)
//! plus the port-level storage error shared by all repository traits.

pub mod entity;
pub mod error;
pub mod id;
pub mod store;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EventId, FacultyId, StudentId};
pub use store::StoreError;
pub use value_object::ValueObject;
