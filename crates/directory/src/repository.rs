//! Repository ports for the directory.
//!
//! Implementations live in `taproll-infra`. The traits make no storage
//! assumptions; in-memory maps (tests/dev) and Postgres (production) both fit.

use std::sync::Arc;

use async_trait::async_trait;

use taproll_core::{FacultyId, StoreError, StudentId};

use crate::faculty::Faculty;
use crate::student::{Student, TagId};

/// Read-only tag resolution, the recorder's view of the directory.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Resolve a tag to the student whose *active* binding matches it.
    async fn find_student_by_tag(&self, tag: &TagId) -> Result<Option<Student>, StoreError>;
}

#[async_trait]
impl<D> StudentDirectory for Arc<D>
where
    D: StudentDirectory + ?Sized,
{
    async fn find_student_by_tag(&self, tag: &TagId) -> Result<Option<Student>, StoreError> {
        (**self).find_student_by_tag(tag).await
    }
}

/// Full student storage, superset of [`StudentDirectory`].
///
/// `update` replaces the whole record (including tag bindings) and fails with
/// `StoreError::NotFound` if the student does not exist. Students are never
/// deleted; deactivation is a status change via `update`.
#[async_trait]
pub trait StudentRepository: StudentDirectory {
    async fn insert(&self, student: Student) -> Result<Student, StoreError>;

    async fn get(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    async fn update(&self, student: Student) -> Result<Student, StoreError>;
}

/// Faculty storage.
#[async_trait]
pub trait FacultyRepository: Send + Sync {
    async fn insert(&self, faculty: Faculty) -> Result<Faculty, StoreError>;

    async fn get(&self, id: FacultyId) -> Result<Option<Faculty>, StoreError>;

    async fn list(&self) -> Result<Vec<Faculty>, StoreError>;

    async fn update(&self, faculty: Faculty) -> Result<Faculty, StoreError>;

    async fn delete(&self, id: FacultyId) -> Result<(), StoreError>;
}
