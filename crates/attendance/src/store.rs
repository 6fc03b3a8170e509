//! Attendance persistence port.

use std::sync::Arc;

use async_trait::async_trait;

use taproll_core::{StoreError, StudentId};

use crate::event::AttendanceEvent;
use crate::session::SessionId;

/// Durable append/query interface for attendance events.
///
/// Implementations must enforce uniqueness of `(student_id, session_id)` at
/// insert time and report a violation as `StoreError::DuplicateKey`. That
/// constraint, not an in-process lock, is what keeps concurrent scans of the
/// same tag race-free: the store is the single source of truth across request
/// handlers and processes.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Look up the event for a `(student, session)` pair, if one exists.
    async fn find_event(
        &self,
        student_id: StudentId,
        session_id: &SessionId,
    ) -> Result<Option<AttendanceEvent>, StoreError>;

    /// Persist a new event atomically.
    ///
    /// Fails with `StoreError::DuplicateKey` if an event for the same
    /// `(student, session)` pair was inserted concurrently.
    async fn insert_event(&self, event: AttendanceEvent) -> Result<AttendanceEvent, StoreError>;

    /// All events recorded for a session.
    async fn list_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;

    /// All events recorded for a student, across sessions.
    async fn list_by_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;
}

#[async_trait]
impl<S> AttendanceStore for Arc<S>
where
    S: AttendanceStore + ?Sized,
{
    async fn find_event(
        &self,
        student_id: StudentId,
        session_id: &SessionId,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        (**self).find_event(student_id, session_id).await
    }

    async fn insert_event(&self, event: AttendanceEvent) -> Result<AttendanceEvent, StoreError> {
        (**self).insert_event(event).await
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        (**self).list_by_session(session_id).await
    }

    async fn list_by_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        (**self).list_by_student(student_id).await
    }
}
