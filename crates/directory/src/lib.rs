//! `taproll-directory` — student and faculty records.
//!
//! The student directory is the read-only collaborator the attendance recorder
//! resolves NFC tags against. Faculty records are plain CRUD glue with no role
//! in the recording policy.

pub mod faculty;
pub mod repository;
pub mod student;

pub use faculty::Faculty;
pub use repository::{FacultyRepository, StudentDirectory, StudentRepository};
pub use student::{Student, StudentStatus, TagBinding, TagId};
