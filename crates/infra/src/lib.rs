//! `taproll-infra` — storage adapters.
//!
//! Two implementations of the directory/attendance ports: in-memory maps for
//! tests and development, Postgres (sqlx) for production. The attendance
//! uniqueness invariant lives in the store in both cases: a keyed map for the
//! former, a unique index for the latter.

pub mod db;
pub mod memory;
pub mod postgres;

pub use db::Database;
pub use memory::{InMemoryAttendanceStore, InMemoryFacultyRepository, InMemoryStudentRepository};
pub use postgres::{PgAttendanceStore, PgFacultyRepository, PgStudentRepository};
